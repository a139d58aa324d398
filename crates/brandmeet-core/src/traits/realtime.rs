// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime change-notification trait.
//!
//! Lifetime invariant: every subscribe has exactly one matching
//! unsubscribe, tied to the consuming view's lifetime. The guard inside
//! [`MessageSubscription`] enforces this by firing on drop.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BrandmeetError;
use crate::types::{MessageChangeEvent, UserId};

/// A live stream of change events on the messages table, scoped to one
/// identity. Dropping the subscription releases the underlying channel.
pub struct MessageSubscription {
    receiver: mpsc::Receiver<MessageChangeEvent>,
    _guard: UnsubscribeGuard,
}

impl MessageSubscription {
    /// Builds a subscription from an event receiver and the teardown hook
    /// to run exactly once when the subscription is dropped.
    pub fn new(
        receiver: mpsc::Receiver<MessageChangeEvent>,
        on_drop: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            receiver,
            _guard: UnsubscribeGuard {
                on_drop: Some(Box::new(on_drop)),
            },
        }
    }

    /// Receives the next change event; `None` once the backend side closed.
    pub async fn recv(&mut self) -> Option<MessageChangeEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking poll used by event-loop consumers.
    pub fn try_recv(&mut self) -> Option<MessageChangeEvent> {
        self.receiver.try_recv().ok()
    }
}

impl std::fmt::Debug for MessageSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageSubscription").finish_non_exhaustive()
    }
}

struct UnsubscribeGuard {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl Drop for UnsubscribeGuard {
    fn drop(&mut self) {
        if let Some(hook) = self.on_drop.take() {
            hook();
        }
    }
}

/// Push-notification channel over the messages table.
#[async_trait]
pub trait RealtimeBackend: Send + Sync {
    /// Subscribes to insert/update/delete events on message rows where
    /// `user` is sender or receiver.
    async fn subscribe_messages(
        &self,
        user: UserId,
    ) -> Result<MessageSubscription, BrandmeetError>;
}
