use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Debug, Error)]
pub enum DbError {
    /// A unique constraint rejected the write. The partial unique indexes
    /// on appointments make this the authoritative slot/email-per-day
    /// duplicate signal, independent of any pre-check.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Data API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode row: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        DbError::Transport(err.to_string())
    }
}

/// Thin client over the PostgREST data API. Every table in `db/schema.sql`
/// is reachable under `/rest/v1/<table>` with PostgREST filter syntax.
pub struct PostgrestClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.postgrest_url.clone(),
            api_key: config.postgrest_api_key.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    pub async fn request<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        self.request_with_headers(method, path, body, None).await
    }

    /// Variant accepting extra headers, used for inserts that need
    /// `Prefer: return=representation` to get the created row back.
    pub async fn request_with_headers<T>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        extra_headers: Option<HeaderMap>,
    ) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!("Data API request: {} {}", method, url);

        let mut headers = self.headers();
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url).headers(headers);
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Data API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                // PostgREST reports unique-violation (23505) and similar
                // constraint failures as 409.
                409 => DbError::Conflict(error_text),
                404 => DbError::NotFound(error_text),
                code => DbError::Api {
                    status: code,
                    message: error_text,
                },
            });
        }

        // DELETE and minimal-return writes come back with an empty body.
        let text = response.text().await?;
        let raw = if text.is_empty() { "null".to_string() } else { text };
        serde_json::from_str(&raw).map_err(|e| DbError::Decode(e.to_string()))
    }

    /// Insert a row and return its representation.
    pub async fn insert_returning<T>(&self, table: &str, row: Value) -> Result<T, DbError>
    where
        T: DeserializeOwned,
    {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("return=representation"),
        );

        let path = format!("/rest/v1/{}", table);
        let mut rows: Vec<T> = self
            .request_with_headers(Method::POST, &path, Some(row), Some(headers))
            .await?;

        match rows.pop() {
            Some(created) => Ok(created),
            None => Err(DbError::Decode(format!(
                "insert into {} returned no representation",
                table
            ))),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
