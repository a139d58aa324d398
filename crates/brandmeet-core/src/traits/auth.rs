// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth subsystem trait. The protocol itself is the hosted provider's;
//! this seam only exposes the operations the app consumes.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::BrandmeetError;
use crate::types::{AuthEvent, Session};

/// Password sign-in, session retrieval, sign-out, and auth-state
/// change notifications.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Signs in with email and password, returning the new session.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BrandmeetError>;

    /// Returns the current session, or `None` when signed out.
    ///
    /// Absence of a session is a routing concern, never an error.
    async fn current_session(&self) -> Result<Option<Session>, BrandmeetError>;

    /// Signs out and invalidates the current session.
    async fn sign_out(&self) -> Result<(), BrandmeetError>;

    /// Subscribes to auth-state changes (sign-in, sign-out, token refresh).
    fn auth_events(&self) -> broadcast::Receiver<AuthEvent>;
}
