use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClaudeClientError {
    #[error("invalid API key: {0}")]
    InvalidApiKey(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Claude API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Claude response contained no text content")]
    EmptyResponse,
}
