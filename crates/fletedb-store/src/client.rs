//! Shared HTTP plumbing: authentication headers, table URLs, row selection,
//! and inserts that read the generated id back.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::MESSAGES_TABLE;

/// Client for the hosted data store.
pub struct StoreClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl StoreClient {
    /// Creates a client for the project at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the `reqwest::Client` cannot be
    /// constructed, or [`StoreError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(
        base_url: &str,
        api_key: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| StoreError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Checks connectivity by counting rows of the `messages` table.
    ///
    /// Returns the row count when the store reports one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Api`] on a non-2xx status or
    /// [`StoreError::Http`] on network failure.
    pub async fn ping(&self) -> Result<Option<u64>, StoreError> {
        let url = self.table_url(MESSAGES_TABLE, &[("select", "id".to_string())])?;
        let response = self
            .authed(self.client.head(url))
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = check_status(response, MESSAGES_TABLE).await?;
        Ok(parse_count(response.headers()))
    }

    /// Builds `{base}/rest/v1/{table}` with percent-encoded query parameters.
    pub(crate) fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, StoreError> {
        let mut url = self
            .base_url
            .join(&format!("rest/v1/{table}"))
            .map_err(|e| StoreError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    /// Selects rows from `table` with the given `PostgREST` query parameters.
    pub(crate) async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StoreError> {
        let url = self.table_url(table, params)?;
        let response = self.authed(self.client.get(url)).send().await?;
        let response = check_status(response, table).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
            context: format!("select from {table}"),
            source: e,
        })
    }

    /// Inserts one row and returns its generated `id`.
    pub(crate) async fn insert_returning_id<B, Id>(&self, table: &str, row: &B) -> Result<Id, StoreError>
    where
        B: Serialize + ?Sized,
        Id: DeserializeOwned,
    {
        let url = self.table_url(table, &[("select", "id".to_string())])?;
        let response = self
            .authed(self.client.post(url))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;
        let response = check_status(response, table).await?;
        let body = response.text().await?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
                context: format!("insert into {table}"),
                source: e,
            })?;
        extract_id(value, table)
    }
}

async fn check_status(response: Response, table: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Api {
        status: status.as_u16(),
        table: table.to_string(),
        body,
    })
}

/// The insert representation is an array of rows, or a single object when
/// the store was asked for one.
fn extract_id<Id: DeserializeOwned>(value: serde_json::Value, table: &str) -> Result<Id, StoreError> {
    let row = match value {
        serde_json::Value::Array(rows) => rows.into_iter().next(),
        other @ serde_json::Value::Object(_) => Some(other),
        _ => None,
    };
    let id = row
        .and_then(|mut r| r.get_mut("id").map(serde_json::Value::take))
        .filter(|id| !id.is_null())
        .ok_or_else(|| StoreError::MissingId {
            table: table.to_string(),
        })?;
    serde_json::from_value(id).map_err(|e| StoreError::Deserialize {
        context: format!("id returned from {table}"),
        source: e,
    })
}

/// Reads the total from a `Content-Range: 0-9/42` or `*/42` header.
fn parse_count(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_RANGE)
        .and_then(|v: &HeaderValue| v.to_str().ok())
        .and_then(|range| range.rsplit_once('/'))
        .and_then(|(_, total)| total.parse().ok())
}
