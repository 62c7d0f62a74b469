use super::{types::SyncConfig, ConfigError};
use crate::indexer::validate_categories;

/// Validate configuration
/// Currently validates:
/// - API key is present
/// - Hosts are non-empty and ports are not 0
/// - At least one tracker, none blank
/// - Intervals, timeouts and chunk size are positive
/// - Search categories are a comma separated list of numbers
pub fn validate_config(config: &SyncConfig) -> Result<(), ConfigError> {
    if config.jackett.api_key.trim().is_empty() {
        return Err(invalid("jackett api key cannot be empty"));
    }

    check_endpoint("jackett", &config.jackett.host, config.jackett.port)?;
    check_endpoint("tribler", &config.tribler.host, config.tribler.port)?;

    if config.trackers.is_empty() {
        return Err(invalid("at least one tracker is required"));
    }
    if config.trackers.iter().any(|t| t.trim().is_empty()) {
        return Err(invalid("tracker names cannot be blank"));
    }

    if config.intervals.query_interval_secs == 0 {
        return Err(invalid("query_interval must be greater than 0"));
    }
    if config.intervals.commit_interval_secs == 0 {
        return Err(invalid("commit_interval must be greater than 0"));
    }

    if config.jackett.timeout_secs == 0 || config.tribler.timeout_secs == 0 {
        return Err(invalid("http timeout must be greater than 0"));
    }
    if config.tribler.add_chunk_size == 0 {
        return Err(invalid("add_chunk_size must be greater than 0"));
    }

    if let Some(categories) = &config.search.categories {
        validate_categories(categories)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
    }

    Ok(())
}

fn check_endpoint(service: &str, host: &str, port: u16) -> Result<(), ConfigError> {
    if host.trim().is_empty() || host.chars().any(char::is_whitespace) {
        return Err(ConfigError::ValidationError(format!(
            "{service} host '{host}' is not a valid host name"
        )));
    }
    if port == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{service} port cannot be 0"
        )));
    }
    Ok(())
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::ValidationError(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JackettConfig, SyncIntervals, TriblerConfig};
    use crate::indexer::TorznabQuery;

    fn valid_config() -> SyncConfig {
        SyncConfig {
            jackett: JackettConfig::new("api-key"),
            tribler: TriblerConfig::default(),
            trackers: vec!["rarbg".to_string(), "1337x".to_string()],
            intervals: SyncIntervals::default(),
            search: TorznabQuery::default(),
        }
    }

    fn assert_invalid(config: &SyncConfig) {
        let result = validate_config(config);
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let mut config = valid_config();
        config.jackett.api_key = "  ".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.tribler.port = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_bad_host_fails() {
        let mut config = valid_config();
        config.jackett.host = "local host".to_string();
        assert_invalid(&config);

        let mut config = valid_config();
        config.tribler.host = String::new();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_no_trackers_fails() {
        let mut config = valid_config();
        config.trackers.clear();
        assert_invalid(&config);

        let mut config = valid_config();
        config.trackers.push(" ".to_string());
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_interval_fails() {
        let mut config = valid_config();
        config.intervals.query_interval_secs = 0;
        assert_invalid(&config);

        let mut config = valid_config();
        config.intervals.commit_interval_secs = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_chunk_size_fails() {
        let mut config = valid_config();
        config.tribler.add_chunk_size = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_categories() {
        let mut config = valid_config();
        config.search.categories = Some("2000,5000".to_string());
        assert!(validate_config(&config).is_ok());

        config.search.categories = Some("2000;5000".to_string());
        assert_invalid(&config);
    }
}
