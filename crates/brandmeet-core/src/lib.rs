// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Brandmeet app.
//!
//! This crate provides the error type, domain types, and backend adapter
//! traits used throughout the Brandmeet workspace. The concrete hosted
//! backend client lives in `brandmeet-backend`; everything above it depends
//! only on the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::BrandmeetError;
pub use traits::{
    AuthBackend, BrandPatch, CreatorPatch, MessageSubscription, NewMessage, ObjectStore,
    RealtimeBackend, TableBackend,
};
pub use types::{
    AuthEvent, BrandProfile, ChangeKind, Conversation, Counterpart, CreatorProfile, Message,
    MessageChangeEvent, Notice, NoticeLevel, Profile, ProfileId, Role, Session, UserId,
};
