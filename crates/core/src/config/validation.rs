//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_prefix` or `cache_version` is empty
    /// - `origin` is not an absolute http(s) URL
    /// - `shell_path` is not part of `core_assets`
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or `sync.tag` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_prefix.trim().is_empty() {
            return Err(invalid("cache_prefix", "must not be empty"));
        }
        if self.cache_version.trim().is_empty() {
            return Err(invalid("cache_version", "must not be empty"));
        }

        match url::Url::parse(&self.origin) {
            Ok(origin) if matches!(origin.scheme(), "http" | "https") => {}
            Ok(_) => return Err(invalid("origin", "scheme must be http or https")),
            Err(e) => return Err(invalid("origin", &e.to_string())),
        }

        if !self.core_assets.iter().any(|asset| asset == &self.shell_path) {
            return Err(invalid("shell_path", "must be listed in core_assets"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.sync.tag.is_empty() {
            return Err(invalid("sync.tag", "must not be empty"));
        }

        if self.router.streaming_extensions.is_empty() && self.router.streaming_path_segments.is_empty() {
            tracing::warn!("no streaming patterns configured; media requests will be cached like static assets");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invalid_field(config: &AppConfig) -> Option<String> {
        match config.validate() {
            Err(ConfigError::Invalid { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_version() {
        let config = AppConfig { cache_version: "  ".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("cache_version"));
    }

    #[test]
    fn test_validate_empty_prefix() {
        let config = AppConfig { cache_prefix: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("cache_prefix"));
    }

    #[test]
    fn test_validate_origin_not_url() {
        let config = AppConfig { origin: "localhost".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("origin"));
    }

    #[test]
    fn test_validate_origin_scheme() {
        let config = AppConfig { origin: "ftp://example.com".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("origin"));
    }

    #[test]
    fn test_validate_shell_not_precached() {
        let config = AppConfig { shell_path: "/offline.html".into(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("shell_path"));
    }

    #[test]
    fn test_validate_timeout_bounds() {
        let config = AppConfig { timeout_ms: 50, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("timeout_ms"));

        let config = AppConfig { timeout_ms: 301_000, ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("timeout_ms"));

        let config = AppConfig { timeout_ms: 100, ..Default::default() };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        assert_eq!(invalid_field(&config).as_deref(), Some("user_agent"));
    }
}
