// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared across the Brandmeet workspace.

use thiserror::Error;

/// The primary error type used across all Brandmeet backend traits and
/// domain operations.
#[derive(Debug, Error)]
pub enum BrandmeetError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Auth subsystem errors (sign-in rejection, expired session, token refresh failure).
    #[error("auth error: {message}")]
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Table read/write errors against the hosted backend.
    #[error("backend error: {message}")]
    Backend {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Realtime channel errors (websocket connect, join rejection, decode failure).
    #[error("realtime error: {message}")]
    Realtime {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Object storage errors (avatar upload failure).
    #[error("object storage error: {message}")]
    Storage {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Client-side input rejection. Raised before any network call is made.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BrandmeetError {
    /// Shorthand for a backend error wrapping an underlying cause.
    pub fn backend(message: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a backend error with no underlying cause.
    pub fn backend_msg(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
            source: None,
        }
    }
}
