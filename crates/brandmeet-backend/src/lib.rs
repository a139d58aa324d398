// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hosted backend client for Brandmeet.
//!
//! The app is a pure consumer of a hosted backend-as-a-service exposing an
//! auth subsystem, row-level CRUD with filter predicates, an object store,
//! and a realtime change-event channel. That interface's shape is fixed
//! externally; this crate wraps it behind the adapter traits from
//! `brandmeet-core` so the domain crates never touch HTTP directly.
//!
//! One [`Backend`] instance implements all four traits:
//! [`AuthBackend`](brandmeet_core::AuthBackend),
//! [`TableBackend`](brandmeet_core::TableBackend),
//! [`ObjectStore`](brandmeet_core::ObjectStore), and
//! [`RealtimeBackend`](brandmeet_core::RealtimeBackend).

pub mod auth;
pub mod realtime;
pub mod rest;
pub mod storage;
pub mod tables;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tokio::sync::broadcast;

use brandmeet_config::BrandmeetConfig;
use brandmeet_core::types::AuthEvent;
use brandmeet_core::BrandmeetError;

use crate::auth::StoredSession;
pub use crate::rest::{QueryBuilder, RestClient, SortDir};

/// Capacity of the auth-event broadcast channel.
const AUTH_EVENT_CAPACITY: usize = 16;

/// Request timeout for row and auth calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// State shared by every sub-client: the pooled HTTP client, endpoint
/// settings, the current session slot, and the auth-event channel.
pub(crate) struct Shared {
    pub http: reqwest::Client,
    pub base_url: String,
    pub anon_key: String,
    pub session: ArcSwapOption<StoredSession>,
    pub auth_tx: broadcast::Sender<AuthEvent>,
    pub auto_refresh: bool,
    pub heartbeat_secs: u64,
}

impl Shared {
    fn new(
        base_url: String,
        anon_key: String,
        schema: String,
        auto_refresh: bool,
        heartbeat_secs: u64,
    ) -> Result<Self, BrandmeetError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&anon_key)
                .map_err(|e| BrandmeetError::Config(format!("invalid anon key value: {e}")))?,
        );
        // Schema selection headers for the row API; harmless on auth routes.
        let schema_value = HeaderValue::from_str(&schema)
            .map_err(|e| BrandmeetError::Config(format!("invalid schema value: {e}")))?;
        headers.insert("Accept-Profile", schema_value.clone());
        headers.insert("Content-Profile", schema_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BrandmeetError::Config(format!("failed to build HTTP client: {e}")))?;

        let (auth_tx, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            session: ArcSwapOption::empty(),
            auth_tx,
            auto_refresh,
            heartbeat_secs,
        })
    }

    /// Test constructor with defaults suitable for wiremock servers.
    #[cfg(test)]
    pub(crate) fn for_tests(base_url: String, anon_key: String) -> Self {
        Self::new(base_url, anon_key, "public".into(), true, 30)
            .expect("test shared state must build")
    }

    /// Attaches the bearer token: the session's access token when signed
    /// in, the publishable key otherwise.
    pub(crate) fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.load().as_ref() {
            Some(stored) => builder.bearer_auth(&stored.session.access_token),
            None => builder.bearer_auth(&self.anon_key),
        }
    }

    /// Builds a [`BrandmeetError::Backend`] from a non-success response,
    /// folding in the backend's JSON error body when one is present.
    pub(crate) async fn error_from_response(
        &self,
        op: &str,
        subject: &str,
        response: reqwest::Response,
    ) -> BrandmeetError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
            Ok(err) => err.render(),
            Err(_) => body,
        };
        BrandmeetError::backend_msg(format!("{op} on {subject} returned {status}: {detail}"))
    }
}

/// Error body shapes the hosted backend produces. The row API uses
/// `message`/`code`; the auth routes use `msg` or `error_description`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn render(&self) -> String {
        let text = self
            .message
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.error_description.as_deref())
            .unwrap_or("no error detail");
        match &self.code {
            Some(code) => format!("{text} (code {code})"),
            None => text.to_string(),
        }
    }
}

/// The hosted backend client. Cheap to clone; all clones share the HTTP
/// pool, the session slot, and the auth-event channel.
#[derive(Clone)]
pub struct Backend {
    pub(crate) shared: Arc<Shared>,
    rest: RestClient,
}

impl Backend {
    /// Builds a client from validated configuration.
    pub fn new(config: &BrandmeetConfig) -> Result<Self, BrandmeetError> {
        let shared = Arc::new(Shared::new(
            config.backend.url.clone(),
            config.backend.anon_key.clone(),
            config.backend.schema.clone(),
            config.auth.auto_refresh,
            config.realtime.heartbeat_secs,
        )?);
        Ok(Self {
            rest: RestClient::new(shared.clone()),
            shared,
        })
    }

    /// Direct access to the row API client.
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("base_url", &self.shared.base_url)
            .finish_non_exhaustive()
    }
}
