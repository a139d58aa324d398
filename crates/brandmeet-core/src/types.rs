// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Brandmeet workspace.
//!
//! Profile rows mirror the hosted backend's `brands` and `creators` tables
//! column-for-column. Conversations are derived at read time and never
//! stored; see `brandmeet-messaging` for the aggregation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Opaque identity issued by the hosted auth provider. Not owned or
/// persisted by this app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Primary key of a profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl std::fmt::Display for ProfileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Which side of the marketplace a profile row belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Brand,
    Creator,
}

impl Role {
    /// The party this role searches for and messages with.
    pub fn opposite(self) -> Role {
        match self {
            Role::Brand => Role::Creator,
            Role::Creator => Role::Brand,
        }
    }
}

/// A row in the `brands` table. 1:1 with a [`UserId`] via `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub website_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row in the `creators` table. 1:1 with a [`UserId`] via `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorProfile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub name: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub instagram_link: Option<String>,
    pub twitter_link: Option<String>,
    pub youtube_link: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Either kind of profile row, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Profile {
    Brand(BrandProfile),
    Creator(CreatorProfile),
}

impl Profile {
    pub fn id(&self) -> ProfileId {
        match self {
            Profile::Brand(b) => b.id,
            Profile::Creator(c) => c.id,
        }
    }

    pub fn user_id(&self) -> UserId {
        match self {
            Profile::Brand(b) => b.user_id,
            Profile::Creator(c) => c.user_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Profile::Brand(b) => &b.name,
            Profile::Creator(c) => &c.name,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        match self {
            Profile::Brand(b) => b.image_url.as_deref(),
            Profile::Creator(c) => c.image_url.as_deref(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Profile::Brand(_) => Role::Brand,
            Profile::Creator(_) => Role::Creator,
        }
    }
}

/// A row in the `messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The participant that is not `current`.
    ///
    /// Assumes `current` is one of the two participants; if it is neither,
    /// the sender is returned, which keeps the row visible rather than
    /// panicking on corrupt data.
    pub fn counterpart_of(&self, current: UserId) -> UserId {
        if self.sender_id == current {
            self.receiver_id
        } else {
            self.sender_id
        }
    }
}

/// The other participant in a conversation, as resolved against the
/// opposite-role profile table.
///
/// A message whose counterpart has no profile row in either table is kept
/// under [`Counterpart::Unknown`] rather than silently dropped, so no row
/// ever becomes unreachable from the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Counterpart {
    Known(Profile),
    Unknown { user_id: UserId },
}

impl Counterpart {
    pub fn user_id(&self) -> UserId {
        match self {
            Counterpart::Known(p) => p.user_id(),
            Counterpart::Unknown { user_id } => *user_id,
        }
    }

    /// Display name, with a placeholder for unresolved participants.
    pub fn display_name(&self) -> &str {
        match self {
            Counterpart::Known(p) => p.name(),
            Counterpart::Unknown { .. } => "Unknown participant",
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Counterpart::Known(_))
    }
}

/// A derived, non-persisted grouping of message rows by counterpart.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub counterpart: Counterpart,
    /// All rows exchanged with the counterpart, in `created_at` ascending order.
    pub messages: Vec<Message>,
    /// The row with the maximum `created_at` among `messages`.
    pub last_message: Option<Message>,
}

impl Conversation {
    pub fn new(counterpart: Counterpart) -> Self {
        Self {
            counterpart,
            messages: Vec::new(),
            last_message: None,
        }
    }

    /// Appends a row and advances the last-message pointer when the new
    /// row's timestamp is strictly greater than the stored one.
    pub fn push(&mut self, message: Message) {
        let newer = match &self.last_message {
            Some(last) => message.created_at > last.created_at,
            None => true,
        };
        if newer {
            self.last_message = Some(message.clone());
        }
        self.messages.push(message);
    }

    /// Timestamp used for most-recently-active-first ordering.
    pub fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_message.as_ref().map(|m| m.created_at)
    }
}

/// An authenticated session as issued by the hosted auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Auth state transitions pushed by the auth subsystem.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
    TokenRefreshed(Session),
}

/// Kind of a realtime change event on the messages table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A change event on the messages table touching the subscribed identity.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageChangeEvent {
    pub kind: ChangeKind,
    /// The new row for inserts and updates; `None` for deletes.
    pub row: Option<Message>,
}

/// Severity of a transient user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient user-facing notification (toast). Failures on reads and
/// writes surface as these; they never abort the consuming view.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
