// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile editing.
//!
//! Saving a draft is a two-step write: the avatar (if one was picked)
//! goes to object storage first, then the profile row is patched with the
//! resulting public URL alongside the text fields. The row is keyed by the
//! signed-in user, never by a caller-supplied id.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use brandmeet_core::BrandmeetError;
use brandmeet_core::traits::{AuthBackend, BrandPatch, CreatorPatch, ObjectStore, TableBackend};
use brandmeet_core::types::UserId;

/// Bucket holding every profile avatar, brand and creator alike.
pub const AVATAR_BUCKET: &str = "creator-avatars";

/// A picked avatar image, not yet uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    pub bytes: Vec<u8>,
    /// File extension without the dot, e.g. `png`.
    pub extension: String,
    pub content_type: String,
}

/// Editable fields of a brand profile. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

/// Editable fields of a creator profile. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatorDraft {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub instagram_link: Option<String>,
    pub twitter_link: Option<String>,
    pub youtube_link: Option<String>,
    pub avatar: Option<AvatarUpload>,
}

/// A profile edit awaiting save, tagged by the role it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileDraft {
    Brand(BrandDraft),
    Creator(CreatorDraft),
}

/// Applies profile drafts for the signed-in user.
pub struct ProfileEditor {
    auth: Arc<dyn AuthBackend>,
    tables: Arc<dyn TableBackend>,
    store: Arc<dyn ObjectStore>,
}

impl ProfileEditor {
    pub fn new(
        auth: Arc<dyn AuthBackend>,
        tables: Arc<dyn TableBackend>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            auth,
            tables,
            store,
        }
    }

    /// Saves `draft` against the current session's profile row.
    ///
    /// Requires a signed-in session. When the draft carries an avatar it is
    /// uploaded under a fresh collision-free name before the row is
    /// patched; a failed upload aborts the save with the row untouched.
    pub async fn save(&self, draft: ProfileDraft) -> Result<(), BrandmeetError> {
        let Some(session) = self.auth.current_session().await? else {
            return Err(BrandmeetError::Auth {
                message: "cannot edit a profile while signed out".into(),
                source: None,
            });
        };
        let user = session.user_id;

        match draft {
            ProfileDraft::Brand(draft) => {
                let image_url = self.upload_avatar(user, draft.avatar).await?;
                let patch = BrandPatch {
                    name: draft.name,
                    description: draft.description,
                    image_url,
                    website_url: draft.website_url,
                };
                self.tables.update_brand(user, patch).await?;
            }
            ProfileDraft::Creator(draft) => {
                let image_url = self.upload_avatar(user, draft.avatar).await?;
                let patch = CreatorPatch {
                    name: draft.name,
                    bio: draft.bio,
                    image_url,
                    instagram_link: draft.instagram_link,
                    twitter_link: draft.twitter_link,
                    youtube_link: draft.youtube_link,
                };
                self.tables.update_creator(user, patch).await?;
            }
        }
        info!(%user, "profile saved");
        Ok(())
    }

    /// Uploads the picked avatar, returning its public URL for the row
    /// patch. The object name embeds the owning user and a fresh UUID so
    /// repeated uploads never overwrite each other.
    async fn upload_avatar(
        &self,
        user: UserId,
        avatar: Option<AvatarUpload>,
    ) -> Result<Option<String>, BrandmeetError> {
        let Some(avatar) = avatar else {
            return Ok(None);
        };
        let path = format!("{user}-{}.{}", Uuid::new_v4(), avatar.extension);
        if let Err(err) = self
            .store
            .upload(AVATAR_BUCKET, &path, avatar.bytes, &avatar.content_type)
            .await
        {
            warn!(error = %err, %path, "avatar upload failed");
            return Err(err);
        }
        Ok(Some(self.store.public_url(AVATAR_BUCKET, &path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandmeet_test_utils::MockBackend;
    use uuid::Uuid;

    fn user() -> UserId {
        UserId(Uuid::new_v4())
    }

    fn editor(backend: &Arc<MockBackend>) -> ProfileEditor {
        ProfileEditor::new(backend.clone(), backend.clone(), backend.clone())
    }

    fn png_avatar() -> AvatarUpload {
        AvatarUpload {
            bytes: vec![0x89, b'P', b'N', b'G'],
            extension: "png".into(),
            content_type: "image/png".into(),
        }
    }

    #[tokio::test]
    async fn saves_text_fields_without_touching_storage() {
        let u = user();
        let backend = Arc::new(MockBackend::new().with_session(u).await);
        backend.add_creator(u, "Ava").await;

        editor(&backend)
            .save(ProfileDraft::Creator(CreatorDraft {
                bio: Some("filmmaker".into()),
                youtube_link: Some("https://youtube.com/@ava".into()),
                ..Default::default()
            }))
            .await
            .unwrap();

        let row = backend.stored_creator(u).await.unwrap();
        assert_eq!(row.name, "Ava");
        assert_eq!(row.bio.as_deref(), Some("filmmaker"));
        assert_eq!(row.youtube_link.as_deref(), Some("https://youtube.com/@ava"));
        assert!(row.image_url.is_none());
        assert!(backend.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn avatar_upload_lands_in_bucket_and_row_gets_public_url() {
        let u = user();
        let backend = Arc::new(MockBackend::new().with_session(u).await);
        backend.add_creator(u, "Ava").await;

        editor(&backend)
            .save(ProfileDraft::Creator(CreatorDraft {
                avatar: Some(png_avatar()),
                ..Default::default()
            }))
            .await
            .unwrap();

        let uploads = backend.uploads().await;
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].bucket, AVATAR_BUCKET);
        assert!(uploads[0].path.starts_with(&format!("{u}-")));
        assert!(uploads[0].path.ends_with(".png"));
        assert_eq!(uploads[0].content_type, "image/png");

        let row = backend.stored_creator(u).await.unwrap();
        let url = row.image_url.unwrap();
        assert!(url.contains(AVATAR_BUCKET));
        assert!(url.ends_with(&uploads[0].path));
    }

    #[tokio::test]
    async fn brand_draft_patches_the_brand_row() {
        let u = user();
        let backend = Arc::new(MockBackend::new().with_session(u).await);
        backend.add_brand(u, "Acme").await;

        editor(&backend)
            .save(ProfileDraft::Brand(BrandDraft {
                name: Some("Acme Inc".into()),
                website_url: Some("https://acme.example".into()),
                ..Default::default()
            }))
            .await
            .unwrap();

        let row = backend.stored_brand(u).await.unwrap();
        assert_eq!(row.name, "Acme Inc");
        assert_eq!(row.website_url.as_deref(), Some("https://acme.example"));
    }

    #[tokio::test]
    async fn repeated_uploads_get_distinct_object_names() {
        let u = user();
        let backend = Arc::new(MockBackend::new().with_session(u).await);
        backend.add_creator(u, "Ava").await;
        let editor = editor(&backend);

        for _ in 0..2 {
            editor
                .save(ProfileDraft::Creator(CreatorDraft {
                    avatar: Some(png_avatar()),
                    ..Default::default()
                }))
                .await
                .unwrap();
        }

        let uploads = backend.uploads().await;
        assert_eq!(uploads.len(), 2);
        assert_ne!(uploads[0].path, uploads[1].path);
    }

    #[tokio::test]
    async fn signed_out_save_is_an_auth_error_with_no_writes() {
        let backend = Arc::new(MockBackend::new());

        let err = editor(&backend)
            .save(ProfileDraft::Creator(CreatorDraft {
                avatar: Some(png_avatar()),
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, BrandmeetError::Auth { .. }));
        assert!(backend.uploads().await.is_empty());
    }

    #[tokio::test]
    async fn failed_upload_aborts_before_the_row_patch() {
        let u = user();
        let backend = Arc::new(MockBackend::new().with_session(u).await);
        backend.add_creator(u, "Ava").await;
        backend.fail_writes(true).await;

        let err = editor(&backend)
            .save(ProfileDraft::Creator(CreatorDraft {
                name: Some("Renamed".into()),
                avatar: Some(png_avatar()),
                ..Default::default()
            }))
            .await
            .unwrap_err();

        assert!(matches!(err, BrandmeetError::Backend { .. }));
        assert_eq!(backend.stored_creator(u).await.unwrap().name, "Ava");
    }
}
