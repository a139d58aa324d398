// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory mock backend for deterministic testing.
//!
//! Tables are plain vectors behind a mutex. Inserted messages are assigned
//! ids and strictly increasing timestamps, and (like the hosted backend)
//! fan out as realtime insert events to open subscriptions. `fail_writes`
//! and `fail_reads` flip every matching operation into an error so failure
//! paths can be exercised.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::{Mutex, broadcast, mpsc};
use uuid::Uuid;

use brandmeet_core::error::BrandmeetError;
use brandmeet_core::traits::{
    AuthBackend, BrandPatch, CreatorPatch, MessageSubscription, NewMessage, ObjectStore,
    RealtimeBackend, TableBackend,
};
use brandmeet_core::types::{
    AuthEvent, BrandProfile, ChangeKind, CreatorProfile, Message, MessageChangeEvent, Profile,
    ProfileId, Role, Session, UserId,
};

/// A captured object-store upload.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedUpload {
    pub bucket: String,
    pub path: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct State {
    session: Option<Session>,
    brands: Vec<BrandProfile>,
    creators: Vec<CreatorProfile>,
    messages: Vec<Message>,
    uploads: Vec<CapturedUpload>,
    subscribers: Vec<mpsc::Sender<MessageChangeEvent>>,
    fail_reads: bool,
    fail_writes: bool,
    next_seq: i64,
}

/// In-memory backend implementing all four adapter traits.
pub struct MockBackend {
    state: Arc<Mutex<State>>,
    auth_tx: broadcast::Sender<AuthEvent>,
    subscribes: Arc<AtomicUsize>,
    unsubscribes: Arc<AtomicUsize>,
}

impl MockBackend {
    pub fn new() -> Self {
        let (auth_tx, _) = broadcast::channel(16);
        Self {
            state: Arc::new(Mutex::new(State::default())),
            auth_tx,
            subscribes: Arc::new(AtomicUsize::new(0)),
            unsubscribes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Deterministic timestamps: epoch-anchored, one second apart.
    fn timestamp(seq: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(seq)
    }

    /// Seeds a signed-in session for `user`.
    pub async fn with_session(self, user: UserId) -> Self {
        self.state.lock().await.session = Some(Session {
            user_id: user,
            access_token: format!("mock-token-{user}"),
            expires_at: None,
        });
        self
    }

    /// Inserts a brand row and returns it.
    pub async fn add_brand(&self, user: UserId, name: &str) -> BrandProfile {
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let row = BrandProfile {
            id: ProfileId(Uuid::new_v4()),
            user_id: user,
            name: name.into(),
            description: None,
            image_url: None,
            website_url: None,
            created_at: Self::timestamp(state.next_seq),
        };
        state.brands.push(row.clone());
        row
    }

    /// Inserts a creator row and returns it.
    pub async fn add_creator(&self, user: UserId, name: &str) -> CreatorProfile {
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let row = CreatorProfile {
            id: ProfileId(Uuid::new_v4()),
            user_id: user,
            name: name.into(),
            bio: None,
            image_url: None,
            instagram_link: None,
            twitter_link: None,
            youtube_link: None,
            created_at: Self::timestamp(state.next_seq),
        };
        state.creators.push(row.clone());
        row
    }

    /// Inserts a message row directly (no realtime fan-out), returning it.
    pub async fn add_message(&self, sender: UserId, receiver: UserId, content: &str) -> Message {
        let mut state = self.state.lock().await;
        state.next_seq += 1;
        let row = Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            receiver_id: receiver,
            content: content.into(),
            created_at: Self::timestamp(state.next_seq),
        };
        state.messages.push(row.clone());
        row
    }

    /// Pushes a change event to every open subscription.
    pub async fn inject_change(&self, event: MessageChangeEvent) {
        let state = self.state.lock().await;
        for tx in &state.subscribers {
            let _ = tx.try_send(event.clone());
        }
    }

    /// All message rows currently stored, in insertion order.
    pub async fn stored_messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    /// All captured uploads.
    pub async fn uploads(&self) -> Vec<CapturedUpload> {
        self.state.lock().await.uploads.clone()
    }

    /// The brand row owned by `user`, if any (test assertion helper).
    pub async fn stored_brand(&self, user: UserId) -> Option<BrandProfile> {
        self.state
            .lock()
            .await
            .brands
            .iter()
            .find(|b| b.user_id == user)
            .cloned()
    }

    /// The creator row owned by `user`, if any (test assertion helper).
    pub async fn stored_creator(&self, user: UserId) -> Option<CreatorProfile> {
        self.state
            .lock()
            .await
            .creators
            .iter()
            .find(|c| c.user_id == user)
            .cloned()
    }

    /// Makes every read operation fail until cleared.
    pub async fn fail_reads(&self, fail: bool) {
        self.state.lock().await.fail_reads = fail;
    }

    /// Makes every write operation fail until cleared.
    pub async fn fail_writes(&self, fail: bool) {
        self.state.lock().await.fail_writes = fail;
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.load(Ordering::SeqCst)
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.unsubscribes.load(Ordering::SeqCst)
    }

    async fn check_read(&self) -> Result<(), BrandmeetError> {
        if self.state.lock().await.fail_reads {
            Err(BrandmeetError::backend_msg("mock read failure"))
        } else {
            Ok(())
        }
    }

    async fn check_write(&self) -> Result<(), BrandmeetError> {
        if self.state.lock().await.fail_writes {
            Err(BrandmeetError::backend_msg("mock write failure"))
        } else {
            Ok(())
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthBackend for MockBackend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Session, BrandmeetError> {
        let mut state = self.state.lock().await;
        // Reuse a seeded identity so tests can prepare rows up front.
        let user_id = state
            .session
            .as_ref()
            .map(|s| s.user_id)
            .unwrap_or_else(|| UserId(Uuid::new_v4()));
        let session = Session {
            user_id,
            access_token: format!("mock-token-{email}"),
            expires_at: None,
        };
        state.session = Some(session.clone());
        drop(state);
        let _ = self.auth_tx.send(AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<Session>, BrandmeetError> {
        Ok(self.state.lock().await.session.clone())
    }

    async fn sign_out(&self) -> Result<(), BrandmeetError> {
        self.state.lock().await.session = None;
        let _ = self.auth_tx.send(AuthEvent::SignedOut);
        Ok(())
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.auth_tx.subscribe()
    }
}

#[async_trait]
impl TableBackend for MockBackend {
    async fn messages_for(&self, user: UserId) -> Result<Vec<Message>, BrandmeetError> {
        self.check_read().await?;
        let mut rows: Vec<Message> = self
            .state
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| m.sender_id == user || m.receiver_id == user)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.created_at);
        Ok(rows)
    }

    async fn insert_message(&self, new: NewMessage) -> Result<Message, BrandmeetError> {
        self.check_write().await?;
        let row = {
            let mut state = self.state.lock().await;
            state.next_seq += 1;
            let row = Message {
                id: Uuid::new_v4(),
                sender_id: new.sender_id,
                receiver_id: new.receiver_id,
                content: new.content,
                created_at: Self::timestamp(state.next_seq),
            };
            state.messages.push(row.clone());
            row
        };
        // The hosted backend notifies subscribers of committed inserts.
        self.inject_change(MessageChangeEvent {
            kind: ChangeKind::Insert,
            row: Some(row.clone()),
        })
        .await;
        Ok(row)
    }

    async fn brand_by_user(&self, user: UserId) -> Result<Option<BrandProfile>, BrandmeetError> {
        self.check_read().await?;
        Ok(self.stored_brand(user).await)
    }

    async fn creator_by_user(
        &self,
        user: UserId,
    ) -> Result<Option<CreatorProfile>, BrandmeetError> {
        self.check_read().await?;
        Ok(self.stored_creator(user).await)
    }

    async fn brands_by_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<BrandProfile>, BrandmeetError> {
        self.check_read().await?;
        Ok(self
            .state
            .lock()
            .await
            .brands
            .iter()
            .filter(|b| users.contains(&b.user_id))
            .cloned()
            .collect())
    }

    async fn creators_by_users(
        &self,
        users: &[UserId],
    ) -> Result<Vec<CreatorProfile>, BrandmeetError> {
        self.check_read().await?;
        Ok(self
            .state
            .lock()
            .await
            .creators
            .iter()
            .filter(|c| users.contains(&c.user_id))
            .cloned()
            .collect())
    }

    async fn search_profiles(
        &self,
        role: Role,
        name_contains: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Profile>, BrandmeetError> {
        self.check_read().await?;
        let needle = name_contains.map(|n| n.to_lowercase());
        let matches = |name: &str| match &needle {
            Some(needle) => name.to_lowercase().contains(needle),
            None => true,
        };

        let state = self.state.lock().await;
        let mut profiles: Vec<Profile> = match role {
            Role::Brand => state
                .brands
                .iter()
                .filter(|b| matches(&b.name))
                .cloned()
                .map(Profile::Brand)
                .collect(),
            Role::Creator => state
                .creators
                .iter()
                .filter(|c| matches(&c.name))
                .cloned()
                .map(Profile::Creator)
                .collect(),
        };
        profiles.sort_by(|a, b| {
            let at = match a {
                Profile::Brand(p) => p.created_at,
                Profile::Creator(p) => p.created_at,
            };
            let bt = match b {
                Profile::Brand(p) => p.created_at,
                Profile::Creator(p) => p.created_at,
            };
            bt.cmp(&at)
        });
        profiles.truncate(limit as usize);
        Ok(profiles)
    }

    async fn profile_by_id(
        &self,
        role: Role,
        id: ProfileId,
    ) -> Result<Option<Profile>, BrandmeetError> {
        self.check_read().await?;
        let state = self.state.lock().await;
        Ok(match role {
            Role::Brand => state
                .brands
                .iter()
                .find(|b| b.id == id)
                .cloned()
                .map(Profile::Brand),
            Role::Creator => state
                .creators
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .map(Profile::Creator),
        })
    }

    async fn insert_profile(
        &self,
        role: Role,
        user: UserId,
        name: &str,
    ) -> Result<Profile, BrandmeetError> {
        self.check_write().await?;
        Ok(match role {
            Role::Brand => Profile::Brand(self.add_brand(user, name).await),
            Role::Creator => Profile::Creator(self.add_creator(user, name).await),
        })
    }

    async fn update_brand(&self, user: UserId, patch: BrandPatch) -> Result<(), BrandmeetError> {
        self.check_write().await?;
        let mut state = self.state.lock().await;
        let Some(row) = state.brands.iter_mut().find(|b| b.user_id == user) else {
            return Err(BrandmeetError::backend_msg("no brand row for user"));
        };
        if let Some(name) = patch.name {
            row.name = name;
        }
        if patch.description.is_some() {
            row.description = patch.description;
        }
        if patch.image_url.is_some() {
            row.image_url = patch.image_url;
        }
        if patch.website_url.is_some() {
            row.website_url = patch.website_url;
        }
        Ok(())
    }

    async fn update_creator(
        &self,
        user: UserId,
        patch: CreatorPatch,
    ) -> Result<(), BrandmeetError> {
        self.check_write().await?;
        let mut state = self.state.lock().await;
        let Some(row) = state.creators.iter_mut().find(|c| c.user_id == user) else {
            return Err(BrandmeetError::backend_msg("no creator row for user"));
        };
        if let Some(name) = patch.name {
            row.name = name;
        }
        if patch.bio.is_some() {
            row.bio = patch.bio;
        }
        if patch.image_url.is_some() {
            row.image_url = patch.image_url;
        }
        if patch.instagram_link.is_some() {
            row.instagram_link = patch.instagram_link;
        }
        if patch.twitter_link.is_some() {
            row.twitter_link = patch.twitter_link;
        }
        if patch.youtube_link.is_some() {
            row.youtube_link = patch.youtube_link;
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MockBackend {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BrandmeetError> {
        self.check_write().await?;
        self.state.lock().await.uploads.push(CapturedUpload {
            bucket: bucket.into(),
            path: path.into(),
            bytes,
            content_type: content_type.into(),
        });
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("mock://storage/{bucket}/{path}")
    }
}

#[async_trait]
impl RealtimeBackend for MockBackend {
    async fn subscribe_messages(
        &self,
        _user: UserId,
    ) -> Result<MessageSubscription, BrandmeetError> {
        let (tx, rx) = mpsc::channel(32);
        self.state.lock().await.subscribers.push(tx);
        self.subscribes.fetch_add(1, Ordering::SeqCst);
        let unsubscribes = self.unsubscribes.clone();
        Ok(MessageSubscription::new(rx, move || {
            unsubscribes.fetch_add(1, Ordering::SeqCst);
        }))
    }
}
