// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed table access over the row API.
//!
//! Maps each `TableBackend` operation onto the filter predicates the hosted
//! backend understands. Tables: `brands`, `creators`, `messages`.

use async_trait::async_trait;
use serde_json::json;

use brandmeet_core::traits::{BrandPatch, CreatorPatch, NewMessage, TableBackend};
use brandmeet_core::types::{
    BrandProfile, CreatorProfile, Message, Profile, ProfileId, Role, UserId,
};
use brandmeet_core::BrandmeetError;

use crate::rest::SortDir;
use crate::Backend;

fn role_table(role: Role) -> &'static str {
    match role {
        Role::Brand => "brands",
        Role::Creator => "creators",
    }
}

fn ids(users: &[UserId]) -> Vec<String> {
    users.iter().map(|u| u.to_string()).collect()
}

#[async_trait]
impl TableBackend for Backend {
    async fn messages_for(&self, user: UserId) -> Result<Vec<Message>, BrandmeetError> {
        self.rest()
            .from("messages")
            .or_eq2("sender_id", user, "receiver_id", user)
            .order("created_at", SortDir::Asc)
            .fetch()
            .await
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message, BrandmeetError> {
        self.rest().insert("messages", &new).await
    }

    async fn brand_by_user(&self, user: UserId) -> Result<Option<BrandProfile>, BrandmeetError> {
        self.rest()
            .from("brands")
            .eq("user_id", user)
            .maybe_single()
            .await
    }

    async fn creator_by_user(
        &self,
        user: UserId,
    ) -> Result<Option<CreatorProfile>, BrandmeetError> {
        self.rest()
            .from("creators")
            .eq("user_id", user)
            .maybe_single()
            .await
    }

    async fn brands_by_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<BrandProfile>, BrandmeetError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        self.rest()
            .from("brands")
            .in_list("user_id", &ids(users))
            .fetch()
            .await
    }

    async fn creators_by_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<CreatorProfile>, BrandmeetError> {
        if users.is_empty() {
            return Ok(Vec::new());
        }
        self.rest()
            .from("creators")
            .in_list("user_id", &ids(users))
            .fetch()
            .await
    }

    async fn search_profiles(
        &self,
        role: Role,
        name_contains: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Profile>, BrandmeetError> {
        let mut query = self.rest().from(role_table(role));
        if let Some(needle) = name_contains {
            query = query.ilike_contains("name", needle);
        }
        let query = query.order("created_at", SortDir::Desc).limit(limit);

        match role {
            Role::Brand => Ok(query
                .fetch::<BrandProfile>()
                .await?
                .into_iter()
                .map(Profile::Brand)
                .collect()),
            Role::Creator => Ok(query
                .fetch::<CreatorProfile>()
                .await?
                .into_iter()
                .map(Profile::Creator)
                .collect()),
        }
    }

    async fn profile_by_id(
        &self,
        role: Role,
        id: ProfileId,
    ) -> Result<Option<Profile>, BrandmeetError> {
        let query = self.rest().from(role_table(role)).eq("id", id);
        match role {
            Role::Brand => Ok(query.maybe_single::<BrandProfile>().await?.map(Profile::Brand)),
            Role::Creator => Ok(query
                .maybe_single::<CreatorProfile>()
                .await?
                .map(Profile::Creator)),
        }
    }

    async fn insert_profile(
        &self,
        role: Role,
        user: UserId,
        name: &str,
    ) -> Result<Profile, BrandmeetError> {
        let body = json!({ "user_id": user, "name": name });
        match role {
            Role::Brand => Ok(Profile::Brand(self.rest().insert("brands", &body).await?)),
            Role::Creator => Ok(Profile::Creator(self.rest().insert("creators", &body).await?)),
        }
    }

    async fn update_brand(&self, user: UserId, patch: BrandPatch) -> Result<(), BrandmeetError> {
        self.rest()
            .update("brands", "user_id", &user.to_string(), &patch)
            .await
    }

    async fn update_creator(
        &self,
        user: UserId,
        patch: CreatorPatch,
    ) -> Result<(), BrandmeetError> {
        self.rest()
            .update("creators", "user_id", &user.to_string(), &patch)
            .await
    }
}
