use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{QueryRequest, QueryResponse};
use crate::core::error::TransportError;
use crate::utils::url::construct_api_url;

const MAX_ERROR_SUMMARY_CHARS: usize = 200;

/// The settled answer for one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub answer: String,
    pub sources: Vec<String>,
    pub session_id: Option<String>,
}

impl From<QueryResponse> for TurnReply {
    fn from(response: QueryResponse) -> Self {
        Self {
            answer: response.answer,
            sources: response.sources,
            session_id: response.session_id.filter(|id| !id.is_empty()),
        }
    }
}

/// Something that can answer a question.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn ask(&self, request: &QueryRequest) -> Result<TurnReply, TransportError>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn ask(&self, request: &QueryRequest) -> Result<TurnReply, TransportError> {
        (**self).ask(request).await
    }
}

/// Run one request under a timeout and an abort handle.
///
/// Returns `None` when the turn was cancelled; the caller must not touch the
/// transcript in that case. Expiry of `timeout` is reported as
/// [`TransportError::Timeout`].
pub async fn dispatch<T: ChatTransport + ?Sized>(
    transport: &T,
    request: &QueryRequest,
    timeout: Option<Duration>,
    cancel: &CancellationToken,
) -> Option<Result<TurnReply, TransportError>> {
    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, transport.ask(request))
                .await
                .unwrap_or(Err(TransportError::Timeout(limit))),
            None => transport.ask(request).await,
        }
    };

    tokio::select! {
        result = bounded => Some(result),
        _ = cancel.cancelled() => {
            debug!("turn cancelled before the answer arrived");
            None
        }
    }
}

/// HTTP client shared by the query and course endpoints.
pub fn build_client() -> Result<reqwest::Client, TransportError> {
    reqwest::Client::builder()
        .user_agent(concat!("coursebot/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(TransportError::from)
}

/// Talks to the answering service over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn ask(&self, request: &QueryRequest) -> Result<TurnReply, TransportError> {
        let query_url = construct_api_url(&self.base_url, "api/query");
        debug!(url = %query_url, history = request.history.len(), "sending question");

        let response = self
            .client
            .post(query_url)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            warn!(status = status.as_u16(), "answering service returned an error");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: format_api_error(&error_text),
            });
        }

        let body = response.text().await?;
        let parsed: QueryResponse = serde_json::from_str(&body)
            .map_err(|err| TransportError::Malformed(err.to_string()))?;
        Ok(parsed.into())
    }
}

fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .get("detail")
        .and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.to_string()),
            // Validation failures carry a list of {msg, loc} objects.
            serde_json::Value::Array(items) => items
                .iter()
                .find_map(|item| item.get("msg").and_then(|msg| msg.as_str()))
                .map(str::to_owned),
            _ => None,
        })
        .or_else(|| {
            value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(str::to_owned)
        })
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary.map(|text| collapse_whitespace(&text))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reduce an error body to one short line suitable for the transcript.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&json_value) {
            if !summary.is_empty() {
                return truncate_chars(&summary, MAX_ERROR_SUMMARY_CHARS);
            }
        }
    }

    // HTML error pages from proxies are noise in a chat bubble.
    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        return String::new();
    }

    truncate_chars(&collapse_whitespace(trimmed), MAX_ERROR_SUMMARY_CHARS)
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
