// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Brandmeet app.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The backend endpoint and publishable key are
//! configuration, never compiled in.

use serde::{Deserialize, Serialize};

/// Top-level Brandmeet configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides via the `BRANDMEET_` prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BrandmeetConfig {
    /// Hosted backend endpoint settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Auth behavior settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Realtime change-notification settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BrandmeetConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            auth: AuthConfig::default(),
            realtime: RealtimeConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Hosted backend endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the hosted backend, e.g. `https://project.example.co`.
    #[serde(default)]
    pub url: String,

    /// Publishable (anon) API key sent with every request.
    #[serde(default)]
    pub anon_key: String,

    /// Database schema exposed over the row API.
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            schema: default_schema(),
        }
    }
}

/// Auth behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether to refresh the access token before it expires.
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            auto_refresh: default_true(),
        }
    }
}

/// Realtime channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RealtimeConfig {
    /// Whether messaging views open a live subscription at all. When off,
    /// views refresh only on explicit refetch.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Websocket heartbeat interval in seconds.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_heartbeat_secs() -> u64 {
    30
}
