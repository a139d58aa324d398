// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Object storage client for avatar blobs.

use async_trait::async_trait;
use tracing::debug;

use brandmeet_core::traits::ObjectStore;
use brandmeet_core::BrandmeetError;

use crate::Backend;

#[async_trait]
impl ObjectStore for Backend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BrandmeetError> {
        let url = format!("{}/storage/v1/object/{bucket}/{path}", self.shared.base_url);
        let size = bytes.len();

        let response = self
            .shared
            .authed(self.shared.http.post(&url))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| BrandmeetError::Storage {
                message: format!("upload to {bucket}/{path} failed"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BrandmeetError::Storage {
                message: format!("upload to {bucket}/{path} returned {status}: {body}"),
                source: None,
            });
        }

        debug!(bucket, path, size, "object uploaded");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{path}",
            self.shared.base_url
        )
    }
}
