// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tracing subscriber setup for the embedding shell.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber with the configured level.
///
/// `RUST_LOG` takes precedence when set. Call once at startup; a second
/// call is a no-op rather than a panic.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("brandmeet={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
