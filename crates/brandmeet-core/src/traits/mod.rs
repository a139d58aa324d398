// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backend adapter traits.
//!
//! The domain crates depend on these traits, never on the concrete HTTP
//! client, so tests run against `brandmeet-test-utils::MockBackend` and the
//! hosted-backend wiring lives entirely in `brandmeet-backend`.

pub mod auth;
pub mod object_store;
pub mod realtime;
pub mod table;

pub use auth::AuthBackend;
pub use object_store::ObjectStore;
pub use realtime::{MessageSubscription, RealtimeBackend};
pub use table::{BrandPatch, CreatorPatch, NewMessage, TableBackend};
