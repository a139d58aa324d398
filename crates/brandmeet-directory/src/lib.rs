// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Opposite-role profile directory.
//!
//! A brand browses creators and a creator browses brands; the viewer's own
//! role only decides which table to read. Listing failures degrade to an
//! empty result with a logged warning, since the dashboard treats the
//! directory as an optional panel and must keep rendering.

use std::sync::Arc;

use tracing::warn;

use brandmeet_core::BrandmeetError;
use brandmeet_core::traits::TableBackend;
use brandmeet_core::types::{Profile, ProfileId, Role};

/// Default number of profiles shown before the user narrows the search.
pub const DEFAULT_LIMIT: u32 = 10;

/// Search input for a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryQuery {
    search: Option<String>,
    limit: u32,
}

impl DirectoryQuery {
    /// The unfiltered listing, capped at [`DEFAULT_LIMIT`].
    pub fn new() -> Self {
        Self {
            search: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Narrows the listing to names containing `term`. Whitespace-only
    /// input is treated as no filter at all.
    pub fn with_search(mut self, term: &str) -> Self {
        let term = term.trim();
        self.search = (!term.is_empty()).then(|| term.to_owned());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for DirectoryQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only directory of profiles on the other side of the marketplace.
pub struct Directory {
    tables: Arc<dyn TableBackend>,
    viewer_role: Role,
}

impl Directory {
    pub fn new(tables: Arc<dyn TableBackend>, viewer_role: Role) -> Self {
        Self {
            tables,
            viewer_role,
        }
    }

    /// The role this directory lists.
    pub fn target_role(&self) -> Role {
        self.viewer_role.opposite()
    }

    /// Runs a listing query. Results are newest-first.
    pub async fn browse(&self, query: &DirectoryQuery) -> Result<Vec<Profile>, BrandmeetError> {
        self.tables
            .search_profiles(self.target_role(), query.search.as_deref(), query.limit)
            .await
    }

    /// Listing for the dashboard panel: read failures are logged and come
    /// back empty instead of propagating.
    pub async fn browse_or_empty(&self, query: &DirectoryQuery) -> Vec<Profile> {
        match self.browse(query).await {
            Ok(profiles) => profiles,
            Err(err) => {
                warn!(error = %err, role = %self.target_role(), "directory listing failed");
                Vec::new()
            }
        }
    }

    /// Full profile for the detail dialog.
    pub async fn open_profile(&self, id: ProfileId) -> Result<Option<Profile>, BrandmeetError> {
        self.tables.profile_by_id(self.target_role(), id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandmeet_core::types::UserId;
    use brandmeet_test_utils::MockBackend;
    use uuid::Uuid;

    fn user() -> UserId {
        UserId(Uuid::new_v4())
    }

    fn directory(backend: MockBackend, viewer_role: Role) -> (Arc<MockBackend>, Directory) {
        let backend = Arc::new(backend);
        let dir = Directory::new(backend.clone(), viewer_role);
        (backend, dir)
    }

    #[test]
    fn blank_search_means_no_filter() {
        let query = DirectoryQuery::new().with_search("   ");
        assert_eq!(query, DirectoryQuery::new());
    }

    #[tokio::test]
    async fn brand_viewer_sees_creators_only() {
        let backend = MockBackend::new();
        backend.add_creator(user(), "Ava Streams").await;
        backend.add_brand(user(), "Acme").await;
        let (_, dir) = directory(backend, Role::Brand);

        let listing = dir.browse(&DirectoryQuery::new()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].role(), Role::Creator);
        assert_eq!(listing[0].name(), "Ava Streams");
    }

    #[tokio::test]
    async fn creator_viewer_sees_brands() {
        let backend = MockBackend::new();
        backend.add_brand(user(), "Acme").await;
        let (_, dir) = directory(backend, Role::Creator);

        let listing = dir.browse(&DirectoryQuery::new()).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].role(), Role::Brand);
    }

    #[tokio::test]
    async fn search_narrows_by_name_substring() {
        let backend = MockBackend::new();
        backend.add_creator(user(), "Ava Streams").await;
        backend.add_creator(user(), "Bruno Films").await;
        let (_, dir) = directory(backend, Role::Brand);

        let listing = dir
            .browse(&DirectoryQuery::new().with_search("streams"))
            .await
            .unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].name(), "Ava Streams");
    }

    #[tokio::test]
    async fn read_failure_degrades_to_empty_listing() {
        let backend = MockBackend::new();
        backend.add_creator(user(), "Ava Streams").await;
        backend.fail_reads(true).await;
        let (_, dir) = directory(backend, Role::Brand);

        assert!(dir.browse_or_empty(&DirectoryQuery::new()).await.is_empty());
    }

    #[tokio::test]
    async fn open_profile_fetches_by_id() {
        let backend = MockBackend::new();
        let creator = backend.add_creator(user(), "Ava Streams").await;
        let (_, dir) = directory(backend, Role::Brand);

        let profile = dir.open_profile(creator.id).await.unwrap();
        assert_eq!(
            profile.map(|p| p.name().to_owned()).as_deref(),
            Some("Ava Streams")
        );
    }

    #[tokio::test]
    async fn open_profile_misses_cleanly() {
        let (_, dir) = directory(MockBackend::new(), Role::Brand);
        let profile = dir.open_profile(ProfileId(Uuid::new_v4())).await.unwrap();
        assert!(profile.is_none());
    }
}
