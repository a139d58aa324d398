// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Auth subsystem client: password grant, session retrieval, sign-out.
//!
//! The token lives in a shared slot consulted by the row client for its
//! `Authorization` header, so a sign-in immediately upgrades every
//! subsequent request. State changes are broadcast as [`AuthEvent`]s.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use brandmeet_core::traits::AuthBackend;
use brandmeet_core::types::{AuthEvent, Session, UserId};
use brandmeet_core::BrandmeetError;

use crate::{ApiErrorBody, Backend};

/// Refresh this close to expiry rather than racing the deadline.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// The session plus the refresh token, which never leaves this crate.
pub(crate) struct StoredSession {
    pub session: Session,
    pub refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: UserId,
}

impl TokenResponse {
    fn into_stored(self, now: DateTime<Utc>) -> StoredSession {
        StoredSession {
            session: Session {
                user_id: self.user.id,
                access_token: self.access_token,
                expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            },
            refresh_token: self.refresh_token,
        }
    }
}

impl Backend {
    fn auth_url(&self, route: &str) -> String {
        format!("{}/auth/v1/{route}", self.shared.base_url)
    }

    async fn token_request(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<StoredSession, BrandmeetError> {
        let response = self
            .shared
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", grant_type)])
            .bearer_auth(&self.shared.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrandmeetError::Auth {
                message: format!("{grant_type} grant request failed"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.render())
                .unwrap_or(body);
            return Err(BrandmeetError::Auth {
                message: format!("{grant_type} grant rejected ({status}): {detail}"),
                source: None,
            });
        }

        let token: TokenResponse = response.json().await.map_err(|e| BrandmeetError::Auth {
            message: "decoding token response".into(),
            source: Some(Box::new(e)),
        })?;
        Ok(token.into_stored(Utc::now()))
    }

    /// Refreshes an expiring session in place. On a rejected refresh the
    /// slot is cleared and the caller sees a signed-out state.
    async fn refresh_session(
        &self,
        refresh_token: &str,
    ) -> Result<Option<Session>, BrandmeetError> {
        match self
            .token_request(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await
        {
            Ok(stored) => {
                let session = stored.session.clone();
                self.shared.session.store(Some(Arc::new(stored)));
                let _ = self
                    .shared
                    .auth_tx
                    .send(AuthEvent::TokenRefreshed(session.clone()));
                debug!(user_id = %session.user_id, "session token refreshed");
                Ok(Some(session))
            }
            Err(err) => {
                warn!(error = %err, "session refresh rejected, signing out locally");
                self.shared.session.store(None);
                let _ = self.shared.auth_tx.send(AuthEvent::SignedOut);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AuthBackend for Backend {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BrandmeetError> {
        let stored = self
            .token_request(
                "password",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;
        let session = stored.session.clone();
        self.shared.session.store(Some(Arc::new(stored)));
        let _ = self.shared.auth_tx.send(AuthEvent::SignedIn(session.clone()));
        info!(user_id = %session.user_id, "signed in");
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<Session>, BrandmeetError> {
        let Some(stored) = self.shared.session.load_full() else {
            return Ok(None);
        };

        let expiring = stored
            .session
            .expires_at
            .is_some_and(|at| at - Duration::seconds(EXPIRY_MARGIN_SECS) <= Utc::now());
        if !expiring {
            return Ok(Some(stored.session.clone()));
        }

        if self.shared.auto_refresh
            && let Some(refresh_token) = stored.refresh_token.clone()
        {
            return self.refresh_session(&refresh_token).await;
        }

        // Expired with no way to refresh: treat as signed out.
        self.shared.session.store(None);
        let _ = self.shared.auth_tx.send(AuthEvent::SignedOut);
        Ok(None)
    }

    async fn sign_out(&self) -> Result<(), BrandmeetError> {
        let stored = self.shared.session.swap(None);
        let _ = self.shared.auth_tx.send(AuthEvent::SignedOut);

        // Best-effort server-side revocation; local teardown already done.
        if let Some(stored) = stored {
            let result = self
                .shared
                .http
                .post(self.auth_url("logout"))
                .bearer_auth(&stored.session.access_token)
                .send()
                .await;
            match result {
                Ok(response) if !response.status().is_success() => {
                    warn!(status = %response.status(), "server-side sign-out returned an error");
                }
                Err(err) => warn!(error = %err, "server-side sign-out request failed"),
                _ => info!(user_id = %stored.session.user_id, "signed out"),
            }
        }
        Ok(())
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.shared.auth_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brandmeet_config::BrandmeetConfig;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> Backend {
        let mut config = BrandmeetConfig::default();
        config.backend.url = server.uri();
        config.backend.anon_key = "anon-key".into();
        Backend::new(&config).unwrap()
    }

    fn token_body(user_id: Uuid, token: &str, expires_in: i64) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
            "expires_in": expires_in,
            "refresh_token": "refresh-1",
            "user": { "id": user_id }
        })
    }

    #[tokio::test]
    async fn sign_in_stores_session_and_broadcasts() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_body(user_id, "jwt-1", 3600)),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let mut events = backend.auth_events();

        let session = backend
            .sign_in_with_password("a@example.com", "pw")
            .await
            .unwrap();
        assert_eq!(session.user_id.0, user_id);
        assert_eq!(session.access_token, "jwt-1");

        let current = backend.current_session().await.unwrap().unwrap();
        assert_eq!(current.access_token, "jwt-1");

        match events.recv().await.unwrap() {
            AuthEvent::SignedIn(s) => assert_eq!(s.user_id.0, user_id),
            other => panic!("expected SignedIn, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_sign_in_surfaces_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let err = backend_for(&server)
            .sign_in_with_password("a@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, BrandmeetError::Auth { .. }));
        assert!(err.to_string().contains("Invalid login credentials"));
    }

    #[tokio::test]
    async fn current_session_is_none_when_signed_out() {
        let server = MockServer::start().await;
        let backend = backend_for(&server);
        assert!(backend.current_session().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_session_refreshes_through_refresh_grant() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body(user_id, "jwt-old", 0)))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_body(user_id, "jwt-new", 3600)),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        backend
            .sign_in_with_password("a@example.com", "pw")
            .await
            .unwrap();

        // expires_in of 0 puts the session inside the refresh margin.
        let refreshed = backend.current_session().await.unwrap().unwrap();
        assert_eq!(refreshed.access_token, "jwt-new");
    }

    #[tokio::test]
    async fn sign_out_clears_session_even_if_server_errors() {
        let server = MockServer::start().await;
        let user_id = Uuid::new_v4();
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_body(user_id, "jwt-1", 3600)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        backend
            .sign_in_with_password("a@example.com", "pw")
            .await
            .unwrap();

        backend.sign_out().await.unwrap();
        assert!(backend.current_session().await.unwrap().is_none());
    }
}
