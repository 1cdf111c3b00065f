//! HTTP client for the backend data API

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Failure talking to the backend data API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The backend answered with a non-success status
    #[error("Backend error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Backend request timed out")]
    Timeout,

    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error("Invalid backend response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_decode() {
            UpstreamError::Decode(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}

/// Client for the remote clinics/doctors/specialties API
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base}{path}` with the given query pairs and decode the JSON body
    pub async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<JsonValue, UpstreamError> {
        self.get_json_within(path, query, self.timeout).await
    }

    /// Same as [`get_json`](Self::get_json) with an explicit timeout
    pub async fn get_json_within(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<JsonValue, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, params = query.len(), "Upstream GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, "Upstream returned an error");
            return Err(UpstreamError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}
