pub mod analytics;
pub mod auth;
pub mod categories;
pub mod client;
pub mod events;
pub mod normalize;
pub mod services;
pub mod users;

use thiserror::Error;

/// Closed set of failures surfaced by the API layer. Callers branch on the
/// variant, never on message contents.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("response shape mismatch: {0}")]
    Shape(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ApiError::Network(format!("request timed out: {error}"))
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// Re-export common types and functions
pub use client::ApiClient;
