// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Brandmeet app.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, and environment
//! variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! use brandmeet_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Backend: {}", config.backend.url);
//! ```

pub mod loader;
pub mod logging;
pub mod model;
pub mod validation;

use thiserror::Error;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use logging::init_tracing;
pub use model::BrandmeetConfig;
pub use validation::validate_config;

/// A configuration error, either from parsing/merging or from semantic
/// validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment failed to parse or merge the configuration sources.
    #[error("config parse error: {message}")]
    Parse { message: String },

    /// A semantic constraint was violated after deserialization.
    #[error("config validation error: {message}")]
    Validation { message: String },
}

/// Collapse a list of configuration errors into a single
/// [`brandmeet_core::BrandmeetError::Config`].
pub fn config_errors_to_brandmeet_error(
    errors: Vec<ConfigError>,
) -> brandmeet_core::BrandmeetError {
    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    brandmeet_core::BrandmeetError::Config(rendered.join("; "))
}

/// Load configuration from the XDG hierarchy and validate it.
///
/// Returns either a valid [`BrandmeetConfig`] or the full list of
/// configuration errors.
pub fn load_and_validate() -> Result<BrandmeetConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(figment_to_config_errors(err)),
    }
}

/// Load configuration from an inline TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<BrandmeetConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(figment_to_config_errors(err)),
    }
}

fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| ConfigError::Parse {
            message: e.to_string(),
        })
        .collect()
}
