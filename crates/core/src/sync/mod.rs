//! Periodic feed-to-channel synchronization.

mod runner;
mod types;

pub use runner::FeedSyncer;
pub use types::{FetchReport, SyncSettings, SyncStatus, TrackerReport};
