// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide session context.
//!
//! One context per app, initialized on load and torn down on sign-out, and
//! handed to views by injection. Views never run their own session checks.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use brandmeet_core::traits::{AuthBackend, TableBackend};
use brandmeet_core::types::{AuthEvent, Role, Session};
use brandmeet_core::BrandmeetError;

use crate::gate::{self, GateState, Route};

/// Holds the current gate state and drives its transitions.
pub struct SessionContext {
    auth: Arc<dyn AuthBackend>,
    tables: Arc<dyn TableBackend>,
    state: RwLock<GateState>,
}

impl SessionContext {
    /// Creates a context in the [`GateState::Unknown`] state. Call
    /// [`init`](Self::init) once the app loads.
    pub fn new(auth: Arc<dyn AuthBackend>, tables: Arc<dyn TableBackend>) -> Self {
        Self {
            auth,
            tables,
            state: RwLock::new(GateState::Unknown),
        }
    }

    /// Runs the initial session check and role resolution.
    ///
    /// Lookup failures fall back to the sign-in route: auth absence is a
    /// redirect, never an error surfaced to the user.
    pub async fn init(&self) -> GateState {
        let state = match gate::resolve_gate(self.auth.as_ref(), self.tables.as_ref()).await {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "gate resolution failed, routing to sign-in");
                GateState::Unauthenticated
            }
        };
        *self.state.write().await = state;
        info!(%state, "session context initialized");
        state
    }

    /// The last resolved gate state.
    pub async fn state(&self) -> GateState {
        *self.state.read().await
    }

    /// The current session, if signed in.
    pub async fn session(&self) -> Result<Option<Session>, BrandmeetError> {
        self.auth.current_session().await
    }

    /// Password sign-in followed by gate resolution.
    ///
    /// Returns the route to navigate to. Sign-in rejection is an error for
    /// the caller to surface as a transient notice.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Route, BrandmeetError> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        let state = gate::resolve_role(self.tables.as_ref(), session.user_id).await?;
        *self.state.write().await = state;
        // A freshly signed-in state always has a concrete route.
        Ok(state.route().unwrap_or(Route::Login))
    }

    /// Signs out and tears the context down to the unauthenticated state.
    pub async fn sign_out(&self) -> Result<(), BrandmeetError> {
        self.auth.sign_out().await?;
        *self.state.write().await = GateState::Unauthenticated;
        info!("session context torn down");
        Ok(())
    }

    /// First-run role selection: creates the matching profile row and moves
    /// straight to the dashboard.
    ///
    /// If a profile row already exists the existing role wins and no row is
    /// created.
    pub async fn choose_role(
        &self,
        role: Role,
        display_name: &str,
    ) -> Result<GateState, BrandmeetError> {
        let Some(session) = self.auth.current_session().await? else {
            return Err(BrandmeetError::Auth {
                message: "cannot choose a role while signed out".into(),
                source: None,
            });
        };

        let resolved = gate::resolve_role(self.tables.as_ref(), session.user_id).await?;
        if let GateState::Dashboard(_, existing) = resolved {
            warn!(%existing, "role already chosen, keeping existing profile");
            *self.state.write().await = resolved;
            return Ok(resolved);
        }

        self.tables
            .insert_profile(role, session.user_id, display_name)
            .await?;
        let state = GateState::Dashboard(session.user_id, role);
        *self.state.write().await = state;
        info!(user_id = %session.user_id, %role, "profile created on first run");
        Ok(state)
    }

    /// Re-resolves the gate after an auth-state change notification.
    pub async fn on_auth_event(&self, event: &AuthEvent) -> GateState {
        let state = match event {
            AuthEvent::SignedOut => GateState::Unauthenticated,
            AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                match gate::resolve_role(self.tables.as_ref(), session.user_id).await {
                    Ok(state) => state,
                    Err(err) => {
                        warn!(error = %err, "role resolution failed on auth event");
                        GateState::Unauthenticated
                    }
                }
            }
        };
        *self.state.write().await = state;
        state
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

    async fn context_with(backend: MockBackend) -> SessionContext {
        let backend = Arc::new(backend);
        SessionContext::new(backend.clone(), backend)
    }

    #[tokio::test]
    async fn no_session_resolves_to_unauthenticated() {
        let ctx = context_with(MockBackend::new()).await;
        assert_eq!(ctx.init().await, GateState::Unauthenticated);
        assert_eq!(ctx.state().await.route(), Some(Route::Login));
    }

    #[tokio::test]
    async fn brand_row_resolves_to_brand_dashboard_never_creator() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.add_brand(u, "Acme").await;
        let ctx = context_with(backend).await;

        let state = ctx.init().await;
        assert_eq!(state, GateState::Dashboard(u, Role::Brand));
        assert_eq!(state.route(), Some(Route::BrandDashboard));
    }

    #[tokio::test]
    async fn session_without_profile_rows_resolves_to_onboarding() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        let ctx = context_with(backend).await;

        let state = ctx.init().await;
        assert_eq!(state, GateState::Onboarding(u));
        assert_eq!(state.route(), Some(Route::GetStarted));
    }

    #[tokio::test]
    async fn user_with_both_rows_lands_on_brand_dashboard() {
        // Brand table is checked first; a double-profiled user is a brand.
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.add_brand(u, "Acme").await;
        backend.add_creator(u, "Acme's alt").await;
        let ctx = context_with(backend).await;

        assert_eq!(ctx.init().await, GateState::Dashboard(u, Role::Brand));
    }

    #[tokio::test]
    async fn gate_lookup_failure_falls_back_to_sign_in() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.fail_reads(true).await;
        let ctx = context_with(backend).await;

        assert_eq!(ctx.init().await, GateState::Unauthenticated);
    }

    #[tokio::test]
    async fn sign_in_routes_creator_to_creator_dashboard() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.add_creator(u, "Ava").await;
        let backend = Arc::new(backend);
        let ctx = SessionContext::new(backend.clone(), backend.clone());

        let route = ctx.sign_in("c@example.com", "pw").await.unwrap();
        assert_eq!(route, Route::CreatorDashboard);
        assert_eq!(ctx.state().await, GateState::Dashboard(u, Role::Creator));
    }

    #[tokio::test]
    async fn choose_role_creates_row_and_routes_to_dashboard() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        let backend = Arc::new(backend);
        let ctx = SessionContext::new(backend.clone(), backend.clone());

        let state = ctx.choose_role(Role::Creator, "Ava").await.unwrap();
        assert_eq!(state, GateState::Dashboard(u, Role::Creator));
        assert_eq!(backend.stored_creator(u).await.unwrap().name, "Ava");
    }

    #[tokio::test]
    async fn choose_role_keeps_existing_profile() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.add_brand(u, "Acme").await;
        let backend = Arc::new(backend);
        let ctx = SessionContext::new(backend.clone(), backend.clone());

        let state = ctx.choose_role(Role::Creator, "Ava").await.unwrap();
        assert_eq!(state, GateState::Dashboard(u, Role::Brand));
        assert!(backend.stored_creator(u).await.is_none());
    }

    #[tokio::test]
    async fn choose_role_while_signed_out_is_an_auth_error() {
        let ctx = context_with(MockBackend::new()).await;
        let err = ctx.choose_role(Role::Brand, "Acme").await.unwrap_err();
        assert!(matches!(err, BrandmeetError::Auth { .. }));
    }

    #[tokio::test]
    async fn sign_out_tears_down_to_unauthenticated() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.add_brand(u, "Acme").await;
        let ctx = context_with(backend).await;

        ctx.init().await;
        ctx.sign_out().await.unwrap();
        assert_eq!(ctx.state().await, GateState::Unauthenticated);
    }

    #[tokio::test]
    async fn signed_out_event_drops_to_unauthenticated() {
        let u = user();
        let backend = MockBackend::new().with_session(u).await;
        backend.add_brand(u, "Acme").await;
        let ctx = context_with(backend).await;
        ctx.init().await;

        let state = ctx.on_auth_event(&AuthEvent::SignedOut).await;
        assert_eq!(state, GateState::Unauthenticated);
    }
}
