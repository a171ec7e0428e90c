use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error("missing required configuration: {0}")]
    MissingConfig(&'static str),

    #[error("record store returned {status}: {body}")]
    StoreApi { status: u16, body: String },

    #[error("invalid health status: {0}")]
    InvalidHealthStatus(String),

    #[error(transparent)]
    Model(#[from] claude_client::ClaudeClientError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PulseError>;
