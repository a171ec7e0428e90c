//! `claude-client` — minimal blocking HTTP client for the Anthropic
//! Messages API.
//!
//! The analyzer pipeline makes one model call per message batch, strictly
//! sequentially, so the transport is blocking and unstreamed.
//!
//! ```text
//! ClaudeClient
//!     │
//!     ▼
//! POST {base}/v1/messages      ← x-api-key + anthropic-version headers
//!     │
//!     ▼
//! MessagesResponse             ← typed content blocks; text() joins them
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use claude_client::ClaudeClient;
//!
//! let client = ClaudeClient::new("sk-ant-...".into(), None)?;
//! let text = client.complete("Summarize this standup note: ...", 2000)?;
//! println!("{text}");
//! ```

pub mod error;
pub mod types;

pub use error::ClaudeClientError;
pub use types::{ContentBlock, MessagesRequest, MessagesResponse, Usage};

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, ClaudeClientError>;

/// Default model when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// API version header value required by the Messages endpoint.
const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking client for the Anthropic Messages API.
///
/// Construct once and pass by reference; holds the API key, the model
/// identifier, and a reusable HTTP connection pool.
pub struct ClaudeClient {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl ClaudeClient {
    /// Build a client for `model` (or [`DEFAULT_MODEL`] when `None`).
    pub fn new(api_key: String, model: Option<String>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: DEFAULT_BASE_URL.to_string(),
            http,
        })
    }

    /// Point the client at a different endpoint. Used by tests to target a
    /// local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send `prompt` as a single user turn and return the response text.
    ///
    /// All text blocks in the response are concatenated in order. Non-2xx
    /// statuses map to [`ClaudeClientError::Api`]; a response with no text
    /// content maps to [`ClaudeClientError::EmptyResponse`].
    pub fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(self.api_key.trim())
                .map_err(|e| ClaudeClientError::InvalidApiKey(e.to_string()))?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = MessagesRequest::user_text(&self.model, max_tokens, prompt);
        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ClaudeClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = resp.json()?;
        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "messages call completed"
            );
        }
        let text = parsed.text();
        if text.is_empty() {
            return Err(ClaudeClientError::EmptyResponse);
        }
        Ok(text)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> ClaudeClient {
        ClaudeClient::new("sk-ant-test".into(), None)
            .unwrap()
            .with_base_url(server.url())
    }

    #[test]
    fn complete_returns_response_text() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"analysis text"}]}"#)
            .create();

        let client = client_for(&server);
        let text = client.complete("analyze", 2000).unwrap();
        assert_eq!(text, "analysis text");
        mock.assert();
    }

    #[test]
    fn complete_sends_model_and_max_tokens() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 1234,
            })))
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"ok"}]}"#)
            .create();

        let client = client_for(&server);
        client.complete("p", 1234).unwrap();
        mock.assert();
    }

    #[test]
    fn non_success_status_maps_to_api_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/messages")
            .with_status(429)
            .with_body("rate limited")
            .create();

        let client = client_for(&server);
        let err = client.complete("p", 100).unwrap_err();
        match err {
            ClaudeClientError::Api { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn empty_content_maps_to_empty_response() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(r#"{"content":[]}"#)
            .create();

        let client = client_for(&server);
        let err = client.complete("p", 100).unwrap_err();
        assert!(matches!(err, ClaudeClientError::EmptyResponse));
    }

    #[test]
    fn custom_model_is_used() {
        let client = ClaudeClient::new("k".into(), Some("claude-opus-4-6".into())).unwrap();
        assert_eq!(client.model(), "claude-opus-4-6");
    }
}
