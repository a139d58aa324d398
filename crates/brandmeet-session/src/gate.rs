// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile gate: maps session + profile-row existence to a route.
//!
//! There is no persisted role field independent of row existence, so role
//! determination costs two lookups per navigation decision: the `brands`
//! table first, then `creators`.

use tracing::debug;

use brandmeet_core::traits::{AuthBackend, TableBackend};
use brandmeet_core::types::{Role, UserId};
use brandmeet_core::BrandmeetError;

/// States of the gate machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Session check in flight; no routing decision yet.
    Unknown,
    /// No session: route to the sign-in entry point.
    Unauthenticated,
    /// Session exists but neither profile table has a row: onboarding.
    Onboarding(UserId),
    /// Session plus a profile row: the matching dashboard.
    Dashboard(UserId, Role),
}

impl GateState {
    /// The client-side route this state redirects to, if decided.
    pub fn route(&self) -> Option<Route> {
        match self {
            GateState::Unknown => None,
            GateState::Unauthenticated => Some(Route::Login),
            GateState::Onboarding(_) => Some(Route::GetStarted),
            GateState::Dashboard(_, Role::Brand) => Some(Route::BrandDashboard),
            GateState::Dashboard(_, Role::Creator) => Some(Route::CreatorDashboard),
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        match self {
            GateState::Onboarding(user) | GateState::Dashboard(user, _) => Some(*user),
            _ => None,
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateState::Unknown => write!(f, "unknown"),
            GateState::Unauthenticated => write!(f, "unauthenticated"),
            GateState::Onboarding(_) => write!(f, "onboarding"),
            GateState::Dashboard(_, role) => write!(f, "dashboard:{role}"),
        }
    }
}

/// The client-side routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    GetStarted,
    BrandDashboard,
    CreatorDashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Login => "/login",
            Route::GetStarted => "/get-started",
            Route::BrandDashboard => "/dashboard/brand",
            Route::CreatorDashboard => "/dashboard/creator",
        }
    }
}

/// Resolves the gate from the current session and the profile tables.
pub async fn resolve_gate(
    auth: &dyn AuthBackend,
    tables: &dyn TableBackend,
) -> Result<GateState, BrandmeetError> {
    let Some(session) = auth.current_session().await? else {
        return Ok(GateState::Unauthenticated);
    };
    resolve_role(tables, session.user_id).await
}

/// Role resolution for a known identity: brands first, then creators.
pub async fn resolve_role(
    tables: &dyn TableBackend,
    user: UserId,
) -> Result<GateState, BrandmeetError> {
    if tables.brand_by_user(user).await?.is_some() {
        debug!(%user, "brand profile found");
        return Ok(GateState::Dashboard(user, Role::Brand));
    }
    if tables.creator_by_user(user).await?.is_some() {
        debug!(%user, "creator profile found");
        return Ok(GateState::Dashboard(user, Role::Creator));
    }
    debug!(%user, "no profile row in either table");
    Ok(GateState::Onboarding(user))
}
