// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage trait for avatar blobs.

use async_trait::async_trait;

use crate::error::BrandmeetError;

/// Upload and public-URL retrieval against the hosted object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads `bytes` to `bucket` at `path`, overwriting is a backend
    /// policy decision and not assumed here.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BrandmeetError>;

    /// The publicly reachable URL for an object in a public bucket.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
