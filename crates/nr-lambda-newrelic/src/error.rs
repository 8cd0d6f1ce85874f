//! NerdGraph client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewRelicError {
    #[error("NerdGraph request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("NerdGraph rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    #[error("NerdGraph error: {0}")]
    Api(String),

    #[error("unexpected NerdGraph response shape: {0}")]
    MalformedResponse(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NewRelicError>;
