// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./brandmeet.toml` > `~/.config/brandmeet/brandmeet.toml`
//! > `/etc/brandmeet/brandmeet.toml` with environment variable overrides via
//! the `BRANDMEET_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BrandmeetConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/brandmeet/brandmeet.toml` (system-wide)
/// 3. `~/.config/brandmeet/brandmeet.toml` (user XDG config)
/// 4. `./brandmeet.toml` (local directory)
/// 5. `BRANDMEET_*` environment variables
pub fn load_config() -> Result<BrandmeetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrandmeetConfig::default()))
        .merge(Toml::file("/etc/brandmeet/brandmeet.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("brandmeet/brandmeet.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("brandmeet.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from an inline TOML string only (no XDG lookup).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BrandmeetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrandmeetConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BrandmeetConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BrandmeetConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `BRANDMEET_BACKEND_ANON_KEY` must map to
/// `backend.anon_key`, not `backend.anon.key`.
fn env_provider() -> Env {
    Env::prefixed("BRANDMEET_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("backend_", "backend.", 1)
            .replacen("auth_", "auth.", 1)
            .replacen("realtime_", "realtime.", 1);
        mapped.into()
    })
}
