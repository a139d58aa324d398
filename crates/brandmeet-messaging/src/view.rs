// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! State for the messages screen.
//!
//! The view owns its realtime subscription: opening the screen subscribes
//! once, dropping the view unsubscribes once. Send and refresh failures
//! surface as transient notices; the view itself never aborts.

use std::sync::Arc;

use tracing::{debug, warn};

use brandmeet_core::BrandmeetError;
use brandmeet_core::traits::{MessageSubscription, NewMessage, RealtimeBackend, TableBackend};
use brandmeet_core::types::{Conversation, Message, Notice, ProfileId, Role, UserId};

use crate::conversations::fetch_conversations;

/// Validates and inserts a message row.
///
/// Whitespace-only content is rejected before any network traffic; the
/// composer disables the send button on the same condition, so hitting
/// this path means the caller skipped that check.
pub async fn send_message(
    tables: &dyn TableBackend,
    sender: UserId,
    receiver: UserId,
    content: &str,
) -> Result<Message, BrandmeetError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(BrandmeetError::Validation(
            "message content must not be empty".into(),
        ));
    }
    tables
        .insert_message(NewMessage {
            sender_id: sender,
            receiver_id: receiver,
            content: content.to_owned(),
        })
        .await
}

/// Sends to a recipient known only by profile row, as from the directory's
/// detail dialog. Resolves the row to its owning user first; content
/// validation still happens before any lookup.
pub async fn send_message_to_profile(
    tables: &dyn TableBackend,
    sender: UserId,
    role: Role,
    profile: ProfileId,
    content: &str,
) -> Result<Message, BrandmeetError> {
    if content.trim().is_empty() {
        return Err(BrandmeetError::Validation(
            "message content must not be empty".into(),
        ));
    }
    let target = tables
        .profile_by_id(role, profile)
        .await?
        .ok_or_else(|| BrandmeetError::backend_msg("recipient profile no longer exists"))?;
    send_message(tables, sender, target.user_id(), content).await
}

/// The messages screen: conversation list, active thread, composer draft.
pub struct MessagesView {
    tables: Arc<dyn TableBackend>,
    current: Option<UserId>,
    conversations: Vec<Conversation>,
    selected: Option<UserId>,
    draft: String,
    is_sending: bool,
    notice: Option<Notice>,
    subscription: Option<MessageSubscription>,
}

impl MessagesView {
    /// Opens the screen: loads conversations and subscribes to live
    /// changes for the signed-in identity.
    ///
    /// `realtime` is `None` when live updates are configured off
    /// (`realtime.enabled = false`); the view then refreshes only on
    /// explicit refetch. A load failure leaves the list empty behind an
    /// error notice. A subscribe failure is logged and the screen runs
    /// without live updates; manual refresh still works.
    pub async fn open(
        tables: Arc<dyn TableBackend>,
        realtime: Option<Arc<dyn RealtimeBackend>>,
        current: Option<UserId>,
    ) -> Self {
        let mut view = Self {
            tables,
            current,
            conversations: Vec::new(),
            selected: None,
            draft: String::new(),
            is_sending: false,
            notice: None,
            subscription: None,
        };
        view.refresh().await;

        if let (Some(user), Some(realtime)) = (current, realtime) {
            match realtime.subscribe_messages(user).await {
                Ok(sub) => view.subscription = Some(sub),
                Err(err) => {
                    warn!(error = %err, "realtime subscribe failed, running without live updates");
                }
            }
        }
        view
    }

    /// Conversations, most recently active first.
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    /// The thread currently open in the right-hand pane.
    pub fn selected_conversation(&self) -> Option<&Conversation> {
        let selected = self.selected?;
        self.conversations
            .iter()
            .find(|c| c.counterpart.user_id() == selected)
    }

    /// Opens the thread with `counterpart`. Selecting a counterpart with
    /// no conversation yet is allowed; the thread starts empty.
    pub fn select(&mut self, counterpart: UserId) {
        self.selected = Some(counterpart);
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether the composer should accept a send right now.
    pub fn can_send(&self) -> bool {
        !self.is_sending
            && self.current.is_some()
            && self.selected.is_some()
            && !self.draft.trim().is_empty()
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    /// Takes the pending notice, if any, for the toast surface.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Sends the composer draft to the selected counterpart.
    ///
    /// On success the draft clears and the list refreshes; on failure the
    /// draft is kept so the user can retry.
    pub async fn send_draft(&mut self) {
        let (Some(current), Some(receiver)) = (self.current, self.selected) else {
            self.notice = Some(Notice::error("select a conversation first"));
            return;
        };

        self.is_sending = true;
        let result = send_message(self.tables.as_ref(), current, receiver, &self.draft).await;
        self.is_sending = false;

        match result {
            Ok(row) => {
                debug!(message_id = %row.id, "message sent");
                self.draft.clear();
                self.notice = Some(Notice::success("message sent"));
                self.refresh().await;
            }
            Err(err) => {
                warn!(error = %err, "send failed");
                self.notice = Some(Notice::error("could not send message"));
            }
        }
    }

    /// Reloads the conversation list. Failures keep the previous list and
    /// raise an error notice.
    pub async fn refresh(&mut self) {
        match fetch_conversations(self.tables.as_ref(), self.current).await {
            Ok(conversations) => self.conversations = conversations,
            Err(err) => {
                warn!(error = %err, "conversation refresh failed");
                self.notice = Some(Notice::error("could not load messages"));
            }
        }
    }

    /// Drains queued realtime events and refreshes once if any arrived.
    ///
    /// Events carry no trusted payload beyond "something changed"; the
    /// refetch is the source of truth.
    pub async fn pump_changes(&mut self) {
        let mut dirty = false;
        if let Some(sub) = self.subscription.as_mut() {
            while let Some(event) = sub.try_recv() {
                debug!(kind = ?event.kind, "message change event");
                dirty = true;
            }
        }
        if dirty {
            self.refresh().await;
        }
    }

    /// Whether the view holds a live subscription.
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }
}
