// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Brandmeet integration tests.
//!
//! Provides [`MockBackend`], an in-memory implementation of all four
//! backend adapter traits, for fast, deterministic, CI-runnable tests
//! without the hosted service.

pub mod mock_backend;

pub use mock_backend::{CapturedUpload, MockBackend};
