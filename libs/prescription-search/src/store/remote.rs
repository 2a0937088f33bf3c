//! PostgREST backend client
//!
//! Talks to the hosted data API (`{base_url}/rest/v1/prescriptions`) with the
//! `medications` relation embedded. Total counts come from the `Content-Range`
//! header that PostgREST sends when asked for `Prefer: count=exact`.

use super::{PrescriptionStore, StorePage};
use crate::error::{Error, Result};
use crate::models::Prescription;
use crate::query_builder::postgrest::{self, SELECT_WITH_MEDICATIONS};
use crate::query_builder::SearchPlan;
use crate::suggest::{merge_suggestions, PER_SOURCE_LIMIT};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const REST_PATH: &str = "rest/v1";
const TABLE: &str = "prescriptions";

/// Connection settings for a [`RemoteStore`]
#[derive(Debug, Clone)]
pub struct RemoteStoreOptions {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Key sent as `apikey`
    pub api_key: String,
    /// Token sent as `Authorization: Bearer`; defaults to `api_key`
    pub bearer_token: Option<String>,
    pub timeout: Duration,
}

impl RemoteStoreOptions {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            bearer_token: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Prescription store backed by a PostgREST API.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    table_url: String,
    label: &'static str,
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
}

impl RemoteStore {
    /// Create a store using the public (anon) key.
    pub fn new(options: RemoteStoreOptions) -> Result<Self> {
        Self::build(options, "remote")
    }

    /// Create a store using an elevated (service role) key.
    pub fn elevated(options: RemoteStoreOptions) -> Result<Self> {
        Self::build(options, "remote-admin")
    }

    fn build(options: RemoteStoreOptions, label: &'static str) -> Result<Self> {
        let bearer = options
            .bearer_token
            .as_deref()
            .unwrap_or(options.api_key.as_str());

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&options.api_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {bearer}"))?);

        let client = Client::builder()
            .timeout(options.timeout)
            .default_headers(headers)
            .build()?;

        let table_url = format!(
            "{}/{}/{}",
            options.base_url.trim_end_matches('/'),
            REST_PATH,
            TABLE
        );

        Ok(Self {
            client,
            table_url,
            label,
        })
    }

    pub fn table_url(&self) -> &str {
        &self.table_url
    }

    async fn send(&self, pairs: &[(String, String)], prefer_count: bool) -> Result<Response> {
        let mut request = self.client.get(&self.table_url).query(pairs);
        if prefer_count {
            request = request.header("Prefer", "count=exact");
        }
        Ok(request.send().await?)
    }

    async fn get(&self, pairs: &[(String, String)], prefer_count: bool) -> Result<Response> {
        ensure_success(self.send(pairs, prefer_count).await?).await
    }

    async fn lookup(&self, column: &str, query: &str) -> Result<Vec<String>> {
        let pairs = postgrest::lookup_pairs(column, query, PER_SOURCE_LIMIT);
        let rows: Vec<serde_json::Value> = self.get(&pairs, false).await?.json().await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(column).and_then(|v| v.as_str()))
            .map(|v| v.to_string())
            .collect())
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("Invalid backend credential header: {e}")))
}

async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiError>(&body) {
        Ok(ApiError {
            message: Some(message),
            code,
            details,
        }) => {
            let mut out = message;
            if let Some(code) = code {
                out = format!("{out} [{code}]");
            }
            if let Some(details) = details {
                out = format!("{out}: {details}");
            }
            out
        }
        _ if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        _ => body,
    };

    Err(Error::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Total from a `Content-Range` value (`0-9/42`, `*/0`, `0-9/*`).
///
/// Returns `None` when the server did not compute a total.
pub(crate) fn parse_content_range(value: &str) -> Result<Option<u64>> {
    let (_, total) = value
        .rsplit_once('/')
        .ok_or_else(|| Error::InvalidContentRange(value.to_string()))?;
    if total == "*" {
        return Ok(None);
    }
    total
        .trim()
        .parse::<u64>()
        .map(Some)
        .map_err(|_| Error::InvalidContentRange(value.to_string()))
}

fn content_range_total(response: &Response) -> Result<Option<u64>> {
    match response.headers().get(CONTENT_RANGE) {
        Some(value) => {
            let value = value
                .to_str()
                .map_err(|_| Error::InvalidContentRange(format!("{value:?}")))?;
            parse_content_range(value)
        }
        None => Ok(None),
    }
}

#[async_trait]
impl PrescriptionStore for RemoteStore {
    fn name(&self) -> &'static str {
        self.label
    }

    #[tracing::instrument(
        skip(self, plan),
        fields(page = plan.window.page, page_size = plan.window.page_size)
    )]
    async fn search(&self, plan: &SearchPlan) -> Result<StorePage> {
        let pairs = postgrest::search_query_pairs(plan);
        let response = self.send(&pairs, true).await?;

        // An offset past the last row is answered with 416 (PGRST103) while
        // the total stays in `Content-Range: */N`.
        if response.status() == StatusCode::RANGE_NOT_SATISFIABLE {
            let count = content_range_total(&response)?.unwrap_or(0);
            tracing::debug!(count, "remote search page past the end");
            return Ok(StorePage {
                rows: Vec::new(),
                count,
            });
        }

        let response = ensure_success(response).await?;
        let total = content_range_total(&response)?;

        let rows: Vec<Prescription> = response.json().await?;
        let count = total.unwrap_or(rows.len() as u64);
        tracing::debug!(rows = rows.len(), count, "remote search completed");

        Ok(StorePage { rows, count })
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> Result<Option<Prescription>> {
        let pairs = vec![
            ("select".to_string(), SELECT_WITH_MEDICATIONS.to_string()),
            ("id".to_string(), format!("eq.{id}")),
            ("limit".to_string(), "1".to_string()),
        ];
        let rows: Vec<Prescription> = self.get(&pairs, false).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    #[tracing::instrument(skip(self))]
    async fn suggest(&self, query: &str) -> Result<Vec<String>> {
        let (ids, patients, doctors) = tokio::try_join!(
            self.lookup("id", query),
            self.lookup("patient_name", query),
            self.lookup("doctor_name", query),
        )?;
        Ok(merge_suggestions([ids, patients, doctors]))
    }

    #[tracing::instrument(skip(self))]
    async fn recent(&self, limit: usize) -> Result<Vec<Prescription>> {
        let pairs = vec![
            ("select".to_string(), SELECT_WITH_MEDICATIONS.to_string()),
            ("order".to_string(), "created_at.desc".to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        Ok(self.get(&pairs, false).await?.json().await?)
    }
}
