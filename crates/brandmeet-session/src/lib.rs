// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session lifecycle and profile gate routing.
//!
//! The gate decides where a visitor lands: sign-in when no session exists,
//! onboarding when the session owns no profile row, and the brand or
//! creator dashboard otherwise. [`SessionContext`] is the one process-wide
//! holder of that state, with explicit init (on load) and teardown (on
//! sign-out).

pub mod context;
pub mod gate;

pub use context::SessionContext;
pub use gate::{GateState, Route, resolve_gate, resolve_role};
