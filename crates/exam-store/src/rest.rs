//! `DataStore` backed by a hosted PostgREST endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::store::DataStore;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for [`RestStore`].
#[derive(Debug, Clone)]
pub struct RestConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl RestConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// Error body returned by the store on non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl ErrorResponse {
    fn describe(self, fallback: String) -> String {
        let mut text = self.message.unwrap_or(fallback);
        if let Some(code) = self.code {
            text = format!("{text} ({code})");
        }
        if let Some(details) = self.details {
            text.push_str(&format!(": {details}"));
        }
        if let Some(hint) = self.hint {
            text.push_str(&format!(" [hint: {hint}]"));
        }
        text
    }
}

/// HTTP client for `{url}/rest/v1/{table}`.
#[derive(Debug, Clone)]
pub struct RestStore {
    http: reqwest::Client,
    base_url: Url,
}

impl RestStore {
    pub fn new(config: RestConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(StoreError::InvalidConfig("store api_key is empty".into()));
        }
        let base_url = parse_base_url(&config.url)?;

        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| StoreError::InvalidConfig("api_key is not a valid header".into()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| StoreError::InvalidConfig("api_key is not a valid header".into()))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::InvalidConfig(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<Value>> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = %status, "store responded");

        if !status.is_success() {
            let fallback = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
            let body = response.text().await.unwrap_or_default();
            let err: ErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: err.describe(fallback),
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&body)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        let url = self.table_url(query.table_name())?;
        debug!(table = query.table_name(), query = ?query.to_pairs(), "select");
        self.send(self.http.get(url).query(&query.to_pairs())).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        let url = self.table_url(table)?;
        debug!(table, rows = rows.len(), "insert");
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send(request).await
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>> {
        query.require_filters("update")?;
        let url = self.table_url(query.table_name())?;
        debug!(table = query.table_name(), filters = ?query.filter_pairs(), "update");
        let request = self
            .http
            .patch(url)
            .query(&query.filter_pairs())
            .header(CONTENT_TYPE, "application/json")
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(request).await
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>> {
        query.require_filters("delete")?;
        let url = self.table_url(query.table_name())?;
        debug!(table = query.table_name(), filters = ?query.filter_pairs(), "delete");
        let request = self
            .http
            .delete(url)
            .query(&query.filter_pairs())
            .header("Prefer", "return=representation");
        self.send(request).await
    }
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidConfig("store url is empty".into()));
    }
    let url = Url::parse(trimmed)
        .map_err(|e| StoreError::InvalidConfig(format!("store url {trimmed:?}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(StoreError::InvalidConfig(format!(
            "store url {trimmed:?} cannot be a base"
        )));
    }
    Ok(url)
}
