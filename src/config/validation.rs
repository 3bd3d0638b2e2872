use crate::config::types::{Config, CrawlConfig, FetchConfig, SourceConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_source_config(&config.source)?;
    Ok(())
}

/// Validates fetch pacing and retry configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.retry_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "retry_attempts must be >= 1, got {}",
            config.retry_attempts
        )));
    }

    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms ({}) must be >= base_delay_ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    if config.backoff_factor < 1.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be >= 1.0, got {}",
            config.backoff_factor
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates listing-crawl configuration
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_items < 1 {
        return Err(ConfigError::Validation(format!(
            "max_items must be >= 1, got {}",
            config.max_items
        )));
    }

    if config.max_comments_per_item < 1 {
        return Err(ConfigError::Validation(format!(
            "max_comments_per_item must be >= 1, got {}",
            config.max_comments_per_item
        )));
    }

    if config.item_delay_cap_ms < config.item_delay_base_ms {
        return Err(ConfigError::Validation(format!(
            "item_delay_cap_ms ({}) must be >= item_delay_base_ms ({})",
            config.item_delay_cap_ms, config.item_delay_base_ms
        )));
    }

    Ok(())
}

/// Validates the source host configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_host(&config.canonical_host, "canonical-host")?;
    validate_host(&config.legacy_host, "legacy-host")?;

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a host value: an absolute http(s) URL with no trailing slash
fn validate_host(host: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(host)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            field,
            url.scheme()
        )));
    }

    if host.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "{} must not end with a slash, got '{}'",
            field, host
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_retry_attempts_rejected() {
        let mut config = Config::default();
        config.fetch.retry_attempts = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_max_delay_below_base_rejected() {
        let mut config = Config::default();
        config.fetch.base_delay_ms = 5_000;
        config.fetch.max_delay_ms = 1_000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_backoff_factor_below_one_rejected() {
        let mut config = Config::default();
        config.fetch.backoff_factor = 0.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_host_rejected() {
        let mut config = Config::default();
        config.source.canonical_host = "not a url".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_trailing_slash_host_rejected() {
        let mut config = Config::default();
        config.source.legacy_host = "https://old.reddit.com/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_http_host_allowed() {
        // Mock servers in tests are plain http
        let mut config = Config::default();
        config.source.canonical_host = "http://127.0.0.1:8080".to_string();
        config.source.legacy_host = "http://127.0.0.1:8080".to_string();
        assert!(validate(&config).is_ok());
    }
}
