//! Custom error types for context-db-mcp

use thiserror::Error;

/// Main error type for context-db-mcp operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Remote service error: {0}")]
    Remote(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Stable kind label surfaced to tool callers alongside the message
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::Config(_) => "configuration_error",
            Error::NotFound(_) => "not_found_error",
            Error::Remote(_) => "remote_service_error",
            Error::Timeout(_) => "timeout_error",
            Error::Io(_) => "io_error",
            Error::UrlParse(_) => "configuration_error",
            Error::Json(_) => "remote_service_error",
        }
    }
}

/// Result type alias for context-db-mcp
pub type Result<T> = std::result::Result<T, Error>;

/// Convert reqwest errors, keeping timeouts distinct
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else {
            Error::Remote(err.to_string())
        }
    }
}
