// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Collects all errors rather than failing fast.

use crate::ConfigError;
use crate::model::BrandmeetConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)`
/// with every collected validation error.
pub fn validate_config(config: &BrandmeetConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let url = config.backend.url.trim();
    if url.is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.url must not be empty".to_string(),
        });
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ConfigError::Validation {
            message: format!("backend.url `{url}` must start with http:// or https://"),
        });
    }

    if config.backend.anon_key.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.anon_key must not be empty".to_string(),
        });
    }

    if config.backend.schema.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "backend.schema must not be empty".to_string(),
        });
    }

    if config.realtime.heartbeat_secs < 5 {
        errors.push(ConfigError::Validation {
            message: format!(
                "realtime.heartbeat_secs must be at least 5, got {}",
                config.realtime.heartbeat_secs
            ),
        });
    }

    const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LEVELS.contains(&config.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log_level must be one of {LEVELS:?}, got `{}`",
                config.log_level
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BackendConfig;

    fn valid_config() -> BrandmeetConfig {
        BrandmeetConfig {
            backend: BackendConfig {
                url: "https://project.example.co".into(),
                anon_key: "publishable-key".into(),
                schema: "public".into(),
            },
            ..Default::default()
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn empty_url_and_key_both_reported() {
        let config = BrandmeetConfig::default();
        let errors = validate_config(&config).unwrap_err();
        let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(messages.iter().any(|m| m.contains("backend.url")));
        assert!(messages.iter().any(|m| m.contains("backend.anon_key")));
    }

    #[test]
    fn non_http_url_rejected() {
        let mut config = valid_config();
        config.backend.url = "ftp://project.example.co".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("http"));
    }

    #[test]
    fn low_heartbeat_rejected() {
        let mut config = valid_config();
        config.realtime.heartbeat_secs = 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn bogus_log_level_rejected() {
        let mut config = valid_config();
        config.log_level = "loud".into();
        assert!(validate_config(&config).is_err());
    }
}
