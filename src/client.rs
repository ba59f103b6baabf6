//! HTTP client for the CCCC.AI backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::session::{Message, EMPTY_REPLY};

/// Base URL used when the configured one is empty (same-origin in the
/// browser, the backend's default bind here).
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("could not parse response: {0}")]
    Parse(String),
    #[error("request timed out")]
    Timeout,
    #[error("invalid backend URL {0:?}")]
    InvalidBaseUrl(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

/// Anything that can turn a conversation into a reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, ClientError>;
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [Message],
}

/// `GET /health` payload.
#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub ok: bool,
    #[serde(default)]
    pub schema: Value,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub sports_indexed: Vec<String>,
}

/// `POST /v1/reload` payload.
#[derive(Debug, Deserialize)]
pub struct ReloadStatus {
    pub ok: bool,
    #[serde(default)]
    pub sports_indexed: Vec<String>,
}

/// Pull the reply out of a completion body: top-level `content`, then
/// `choices[0].message.content`, then the fixed empty notice.
pub fn extract_reply(body: &Value) -> String {
    let direct = body.get("content").and_then(Value::as_str);
    let nested = || {
        body.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
    };

    direct
        .filter(|s| !s.is_empty())
        .or_else(|| nested().filter(|s| !s.is_empty()))
        .map(String::from)
        .unwrap_or_else(|| EMPTY_REPLY.to_string())
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let base = base_url.trim().trim_end_matches('/');
        let base_url = if base.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            base.to_string()
        };
        match reqwest::Url::parse(&base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ClientError::InvalidBaseUrl(base_url)),
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    pub async fn reload(&self) -> Result<ReloadStatus, ClientError> {
        let url = format!("{}/v1/reload", self.base_url);
        let response = self.client.post(&url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, ClientError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        debug!(url = %url, turns = messages.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&CompletionRequest { messages })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let text = response.text().await?;
        let body: Value =
            serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(extract_reply(&body))
    }
}
