//! Data API Client
//!
//! Thin typed access to the backend's auto-generated REST API (PostgREST
//! dialect). Filtering, ordering, pagination and counting are expressed as
//! query parameters and executed server-side.

use std::fmt::Display;
use std::sync::Arc;

use reqwest::header::{HeaderMap, CONTENT_RANGE};
use reqwest::{Client as HttpClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error};
use url::Url;

use crate::error::{ClientError, ClientResult};
use crate::SessionState;

/// Filter, ordering and range parameters for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the returned columns.
    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.set("select", columns.to_string())
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("eq.{value}"))
    }

    /// Case-insensitive substring match. `%`, `_` and `*` in `needle` match
    /// literally.
    #[must_use]
    pub fn ilike(self, column: &str, needle: &str) -> Self {
        self.push(column, format!("ilike.*{}*", escape_like(needle)))
    }

    /// Case-insensitive whole-value match.
    #[must_use]
    pub fn ilike_exact(self, column: &str, value: &str) -> Self {
        self.push(column, format!("ilike.{}", escape_like(value)))
    }

    /// Case-insensitive substring match on any of `columns`.
    #[must_use]
    pub fn any_ilike(self, columns: &[&str], needle: &str) -> Self {
        let pattern = quote(&format!("*{}*", escape_like(needle)));
        let terms: Vec<String> = columns
            .iter()
            .map(|column| format!("{column}.ilike.{pattern}"))
            .collect();
        self.push("or", format!("({})", terms.join(",")))
    }

    /// `column >= value`.
    #[must_use]
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("gte.{value}"))
    }

    /// `column <= value`.
    #[must_use]
    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("lte.{value}"))
    }

    /// Append an ordering term. Repeated calls sort by each column in turn.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let term = format!("{column}.{}", if ascending { "asc" } else { "desc" });
        if let Some((_, existing)) = self.params.iter_mut().find(|(k, _)| k == "order") {
            existing.push(',');
            existing.push_str(&term);
            return self;
        }
        self.push("order", term)
    }

    /// Inclusive row range, zero-based.
    #[must_use]
    pub fn range(self, from: usize, to: usize) -> Self {
        let limit = to.saturating_sub(from).saturating_add(1);
        self.set("offset", from.to_string())
            .set("limit", limit.to_string())
    }

    /// One-based page of `per_page` rows.
    #[must_use]
    pub fn page(self, page: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let from = page.saturating_sub(1).saturating_mul(per_page);
        self.range(from, from.saturating_add(per_page - 1))
    }

    /// The encoded parameters, in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }

    fn set(mut self, key: &str, value: String) -> Self {
        self.params.retain(|(k, _)| k != key);
        self.push(key, value)
    }

    fn apply(&self, url: &mut Url) {
        if self.params.is_empty() {
            return;
        }
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &self.params {
            pairs.append_pair(key, value);
        }
    }
}

/// Escape LIKE wildcards; `*` is the backend's own wildcard and is dropped.
fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => {}
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Double-quote a value inside a logical filter so `,.:()` are literal.
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// One page of rows plus the backend's exact count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total rows matching the filter, across all pages.
    pub total: u64,
    /// Zero-based offset of the first item.
    pub offset: u64,
}

impl<T> Page<T> {
    /// Number of pages of `per_page` rows needed for `total`.
    #[must_use]
    pub const fn page_count(&self, per_page: u64) -> u64 {
        if per_page == 0 {
            return 0;
        }
        self.total.div_ceil(per_page)
    }
}

/// Insert body with the creator stamped next to the payload's own fields.
#[derive(Debug, Serialize)]
pub struct Stamped<'a, T> {
    #[serde(flatten)]
    pub payload: &'a T,
    pub created_by: &'a str,
}

/// Parse a `Content-Range` value such as `0-19/57` or `*/0`.
///
/// Returns `(offset, total)`; `total` is `None` when the backend did not count.
#[must_use]
pub fn parse_content_range(value: &str) -> Option<(u64, Option<u64>)> {
    let (range, total) = value.trim().split_once('/')?;
    let offset = if range == "*" {
        0
    } else {
        range.split_once('-')?.0.parse().ok()?
    };
    let total = if total == "*" {
        None
    } else {
        Some(total.parse().ok()?)
    };
    Some((offset, total))
}

/// Client for the backend's REST data API.
#[derive(Clone)]
pub struct DataApiClient {
    http: HttpClient,
    rest_url: Url,
    api_key: String,
    session: Arc<RwLock<SessionState>>,
}

impl DataApiClient {
    /// Create a client rooted at `{base_url}/rest/v1/`.
    pub fn new(
        http: HttpClient,
        base_url: &str,
        api_key: impl Into<String>,
        session: Arc<RwLock<SessionState>>,
    ) -> ClientResult<Self> {
        let rest_url = Url::parse(&format!("{}/rest/v1/", base_url.trim_end_matches('/')))?;
        Ok(Self {
            http,
            rest_url,
            api_key: api_key.into(),
            session,
        })
    }

    /// Fetch every row matching `query`.
    pub async fn select<T: DeserializeOwned>(&self, table: &str, query: &Query) -> ClientResult<Vec<T>> {
        debug!(table, ?query, "Selecting rows");
        let request = self.request(reqwest::Method::GET, table, query).await?;
        let response = Self::send(request, table, "select").await?;
        Self::decode(response).await
    }

    /// Fetch one page of rows together with the exact match count.
    pub async fn select_page<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &Query,
    ) -> ClientResult<Page<T>> {
        debug!(table, ?query, "Selecting page");
        let request = self
            .request(reqwest::Method::GET, table, query)
            .await?
            .header("Prefer", "count=exact");
        let response = Self::send(request, table, "select").await?;
        let range = content_range(response.headers());
        let items: Vec<T> = Self::decode(response).await?;

        let (offset, total) = range.unwrap_or((0, None));
        let total = total.unwrap_or(offset + items.len() as u64);
        debug!(table, count = items.len(), total, "Fetched page");
        Ok(Page { items, total, offset })
    }

    /// Insert one row and return it as stored.
    pub async fn insert<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        body: &B,
    ) -> ClientResult<T> {
        debug!(table, "Inserting row");
        let request = self
            .request(reqwest::Method::POST, table, &Query::new())
            .await?
            .header("Prefer", "return=representation")
            .json(body);
        let response = Self::send(request, table, "insert").await?;
        let mut rows: Vec<T> = Self::decode(response).await?;
        if rows.is_empty() {
            return Err(ClientError::Decode(format!("insert into {table} returned no rows")));
        }
        Ok(rows.swap_remove(0))
    }

    /// Patch every row matching `filter` and return the updated rows.
    pub async fn update<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        table: &str,
        filter: &Query,
        body: &B,
    ) -> ClientResult<Vec<T>> {
        debug!(table, ?filter, "Updating rows");
        let request = self
            .request(reqwest::Method::PATCH, table, filter)
            .await?
            .header("Prefer", "return=representation")
            .json(body);
        let response = Self::send(request, table, "update").await?;
        Self::decode(response).await
    }

    /// Delete every row matching `filter`.
    pub async fn delete(&self, table: &str, filter: &Query) -> ClientResult<()> {
        debug!(table, ?filter, "Deleting rows");
        let request = self.request(reqwest::Method::DELETE, table, filter).await?;
        Self::send(request, table, "delete").await?;
        Ok(())
    }

    async fn request(
        &self,
        method: reqwest::Method,
        table: &str,
        query: &Query,
    ) -> ClientResult<RequestBuilder> {
        let mut url = self.rest_url.join(table)?;
        query.apply(&mut url);

        // Signed-in requests carry the user's token; otherwise the anon key.
        let token = self
            .session
            .read()
            .await
            .access_token
            .clone()
            .unwrap_or_else(|| self.api_key.clone());

        Ok(self
            .http
            .request(method, url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {token}")))
    }

    async fn send(request: RequestBuilder, table: &str, action: &str) -> ClientResult<Response> {
        let response = request.send().await.map_err(|e| {
            error!("Failed to {} {}: {}", action, table, e);
            ClientError::Http(e)
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Failed to {} {}: {} - {}", action, table, status, body);
            return Err(ClientError::Status { status, body });
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn content_range(headers: &HeaderMap) -> Option<(u64, Option<u64>)> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
}
