// SPDX-FileCopyrightText: 2026 Brandmeet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-level REST client for the hosted backend.
//!
//! Speaks the PostgREST-style query syntax: filter predicates as query
//! parameters (`col=eq.v`, `or=(a.eq.x,b.eq.y)`, `col=ilike.*v*`,
//! `col=in.(a,b)`), `order`, and `limit`. Reads retry once on transient
//! statuses; writes are never retried automatically.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use brandmeet_core::BrandmeetError;

use crate::Shared;

/// Statuses worth one retry on reads.
fn is_transient(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 429 | 500 | 503)
}

/// Delay before the single read retry. Fixed, no jitter.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Sort direction for `order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn suffix(self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Thin client over the `/rest/v1` row API.
#[derive(Clone)]
pub struct RestClient {
    shared: std::sync::Arc<Shared>,
}

impl RestClient {
    pub(crate) fn new(shared: std::sync::Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Starts a read query against `table`.
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder {
            client: self.clone(),
            table: table.to_string(),
            params: vec![("select".into(), "*".into())],
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.shared.base_url, table)
    }

    /// Inserts one row and returns the stored representation.
    ///
    /// Uses `Prefer: return=representation`; the backend answers with an
    /// array holding the inserted row.
    pub async fn insert<B, R>(&self, table: &str, body: &B) -> Result<R, BrandmeetError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let response = self
            .shared
            .authed(self.shared.http.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .map_err(|e| BrandmeetError::backend(format!("insert into {table} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.shared.error_from_response("insert", table, response).await);
        }

        let mut rows: Vec<R> = response
            .json()
            .await
            .map_err(|e| BrandmeetError::backend(format!("decoding {table} insert response"), e))?;
        rows.pop()
            .ok_or_else(|| BrandmeetError::backend_msg(format!("{table} insert returned no row")))
    }

    /// Applies a partial update to all rows matching `filter_col = filter_val`.
    pub async fn update<B>(
        &self,
        table: &str,
        filter_col: &str,
        filter_val: &str,
        patch: &B,
    ) -> Result<(), BrandmeetError>
    where
        B: Serialize + Sync,
    {
        let response = self
            .shared
            .authed(self.shared.http.patch(self.table_url(table)))
            .query(&[(filter_col, format!("eq.{filter_val}"))])
            .json(patch)
            .send()
            .await
            .map_err(|e| BrandmeetError::backend(format!("update of {table} failed"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.shared.error_from_response("update", table, response).await);
        }
        Ok(())
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.shared.base_url)
            .finish_non_exhaustive()
    }
}

/// Accumulates filter predicates for one read query.
#[derive(Debug)]
pub struct QueryBuilder {
    client: RestClient,
    table: String,
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// `col = value`.
    pub fn eq(mut self, col: &str, value: impl ToString) -> Self {
        self.params.push((col.into(), format!("eq.{}", value.to_string())));
        self
    }

    /// `col_a = value OR col_b = value` (the sender-or-receiver predicate).
    pub fn or_eq2(
        mut self,
        col_a: &str,
        value_a: impl ToString,
        col_b: &str,
        value_b: impl ToString,
    ) -> Self {
        self.params.push((
            "or".into(),
            format!(
                "({col_a}.eq.{},{col_b}.eq.{})",
                value_a.to_string(),
                value_b.to_string()
            ),
        ));
        self
    }

    /// Case-insensitive substring match on `col`.
    ///
    /// The needle is treated as a literal: characters with pattern or
    /// list meaning in the filter grammar (`*`, `%`, `,`, parentheses)
    /// are stripped rather than interpolated.
    pub fn ilike_contains(mut self, col: &str, needle: &str) -> Self {
        let needle: String = needle
            .chars()
            .filter(|c| !matches!(c, '*' | '%' | ',' | '(' | ')'))
            .collect();
        self.params.push((col.into(), format!("ilike.*{needle}*")));
        self
    }

    /// `col` in the given list. Callers must not pass an empty list; the
    /// trait layer short-circuits that case without a network call.
    pub fn in_list(mut self, col: &str, values: &[String]) -> Self {
        self.params.push((col.into(), format!("in.({})", values.join(","))));
        self
    }

    pub fn order(mut self, col: &str, dir: SortDir) -> Self {
        self.params.push(("order".into(), format!("{col}.{}", dir.suffix())));
        self
    }

    pub fn limit(mut self, n: u32) -> Self {
        self.params.push(("limit".into(), n.to_string()));
        self
    }

    /// Executes the query, retrying once on a transient status.
    pub async fn fetch<R: DeserializeOwned>(self) -> Result<Vec<R>, BrandmeetError> {
        let url = self.client.table_url(&self.table);
        let shared = &self.client.shared;

        for attempt in 0..=1u32 {
            if attempt > 0 {
                warn!(table = %self.table, "retrying read after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = shared
                .authed(shared.http.get(&url))
                .query(&self.params)
                .send()
                .await
                .map_err(|e| {
                    BrandmeetError::backend(format!("read from {} failed", self.table), e)
                })?;

            let status = response.status();
            debug!(table = %self.table, status = %status, attempt, "read response");

            if status.is_success() {
                return response.json().await.map_err(|e| {
                    BrandmeetError::backend(format!("decoding {} rows", self.table), e)
                });
            }

            if is_transient(status) && attempt == 0 {
                continue;
            }

            return Err(shared.error_from_response("read", &self.table, response).await);
        }

        unreachable!("read loop always returns");
    }

    /// Executes the query expecting at most one row.
    pub async fn maybe_single<R: DeserializeOwned>(self) -> Result<Option<R>, BrandmeetError> {
        let mut rows: Vec<R> = self.limit(1).fetch().await?;
        Ok(rows.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde::Deserialize;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Row {
        id: u32,
        name: String,
    }

    fn client_for(server: &MockServer) -> RestClient {
        RestClient::new(Arc::new(Shared::for_tests(server.uri(), "anon-key".into())))
    }

    #[tokio::test]
    async fn fetch_builds_filter_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/creators"))
            .and(query_param("select", "*"))
            .and(query_param("name", "ilike.*ava*"))
            .and(query_param("order", "created_at.desc"))
            .and(query_param("limit", "10"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Ava"}
            ])))
            .mount(&server)
            .await;

        let rows: Vec<Row> = client_for(&server)
            .from("creators")
            .ilike_contains("name", "ava")
            .order("created_at", SortDir::Desc)
            .limit(10)
            .fetch()
            .await
            .unwrap();

        assert_eq!(rows, vec![Row { id: 1, name: "Ava".into() }]);
    }

    #[tokio::test]
    async fn ilike_needle_is_treated_as_a_literal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/creators"))
            .and(query_param("name", "ilike.*ava*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        // Pattern and list characters in the search term must not reach
        // the filter expression.
        let rows: Vec<Row> = client_for(&server)
            .from("creators")
            .ilike_contains("name", "a%v,(a)*")
            .fetch()
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn fetch_builds_or_predicate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/messages"))
            .and(query_param("or", "(sender_id.eq.u1,receiver_id.eq.u1)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let rows: Vec<Row> = client_for(&server)
            .from("messages")
            .or_eq2("sender_id", "u1", "receiver_id", "u1")
            .fetch()
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn fetch_retries_once_on_500() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/brands"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/brands"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "name": "Acme"}
            ])))
            .mount(&server)
            .await;

        let rows: Vec<Row> = client_for(&server).from("brands").fetch().await.unwrap();
        assert_eq!(rows[0].id, 7);
    }

    #[tokio::test]
    async fn fetch_surfaces_error_body_on_400() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/brands"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "message": "column brands.nme does not exist",
                "code": "42703"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .from("brands")
            .fetch::<Row>()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("42703") || err.to_string().contains("does not exist"));
    }

    #[tokio::test]
    async fn insert_returns_representation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!([
                {"id": 3, "name": "stored"}
            ])))
            .mount(&server)
            .await;

        let row: Row = client_for(&server)
            .insert("messages", &serde_json::json!({"name": "draft"}))
            .await
            .unwrap();
        assert_eq!(row, Row { id: 3, name: "stored".into() });
    }

    #[tokio::test]
    async fn insert_does_not_retry_transient_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/messages"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let result: Result<Row, _> = client_for(&server)
            .insert("messages", &serde_json::json!({"name": "draft"}))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_targets_filtered_rows() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/creators"))
            .and(query_param("user_id", "eq.u9"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        client_for(&server)
            .update("creators", "user_id", "u9", &serde_json::json!({"bio": "new"}))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn maybe_single_returns_none_for_empty_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/brands"))
            .and(query_param("user_id", "eq.missing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let row: Option<Row> = client_for(&server)
            .from("brands")
            .eq("user_id", "missing")
            .maybe_single()
            .await
            .unwrap();
        assert!(row.is_none());
    }
}
