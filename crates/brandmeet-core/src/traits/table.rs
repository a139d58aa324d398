// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-level access to the hosted backend's tables.
//!
//! The hosted interface is generic row CRUD with filter predicates; this
//! trait exposes only the typed queries the app actually performs, so the
//! mock backend and the REST client stay in lockstep.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BrandmeetError;
use crate::types::{BrandProfile, CreatorProfile, Message, Profile, ProfileId, Role, UserId};

/// A message row to be inserted. The backend assigns `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
}

/// Partial update for a `brands` row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BrandPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

/// Partial update for a `creators` row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreatorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_link: Option<String>,
}

/// Typed row access over the `brands`, `creators`, and `messages` tables.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// All rows where `user` is sender or receiver, ordered by
    /// `created_at` ascending.
    async fn messages_for(&self, user: UserId) -> Result<Vec<Message>, BrandmeetError>;

    /// Inserts a message row and returns the stored representation.
    async fn insert_message(&self, new: NewMessage) -> Result<Message, BrandmeetError>;

    /// The brand row owned by `user`, if any.
    async fn brand_by_user(&self, user: UserId) -> Result<Option<BrandProfile>, BrandmeetError>;

    /// The creator row owned by `user`, if any.
    async fn creator_by_user(&self, user: UserId)
    -> Result<Option<CreatorProfile>, BrandmeetError>;

    /// All brand rows owned by any of `users` (one `in`-list query).
    async fn brands_by_users(&self, users: &[UserId])
    -> Result<Vec<BrandProfile>, BrandmeetError>;

    /// All creator rows owned by any of `users` (one `in`-list query).
    async fn creators_by_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<CreatorProfile>, BrandmeetError>;

    /// Directory listing for `role`: optional case-insensitive substring
    /// match on `name`, ordered by `created_at` descending, limited.
    async fn search_profiles(
        &self,
        role: Role,
        name_contains: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Profile>, BrandmeetError>;

    /// One profile row of `role` by primary key.
    async fn profile_by_id(
        &self,
        role: Role,
        id: ProfileId,
    ) -> Result<Option<Profile>, BrandmeetError>;

    /// Creates the minimal profile row for a first-run user.
    async fn insert_profile(
        &self,
        role: Role,
        user: UserId,
        name: &str,
    ) -> Result<Profile, BrandmeetError>;

    /// Applies a partial update to the brand row keyed by `user_id`.
    async fn update_brand(&self, user: UserId, patch: BrandPatch) -> Result<(), BrandmeetError>;

    /// Applies a partial update to the creator row keyed by `user_id`.
    async fn update_creator(&self, user: UserId, patch: CreatorPatch)
    -> Result<(), BrandmeetError>;
}
