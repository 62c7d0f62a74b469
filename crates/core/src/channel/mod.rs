//! Content channel abstraction.
//!
//! This module provides a `ChannelClient` trait for pushing torrents into a
//! content channel and committing them, plus the Tribler implementation.

mod tribler;
mod types;

pub use tribler::TriblerClient;
pub use types::*;
