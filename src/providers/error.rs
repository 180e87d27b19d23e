//! Fetch-boundary error taxonomy
//!
//! Every upstream failure maps to exactly one variant; nothing escapes the
//! fetch boundary unwrapped. Expected upstream conditions (4xx/5xx) are
//! values, not panics.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("wallet not found")]
    NotFound,
    #[error("service unavailable")]
    ServiceUnavailable,
    #[error("network failure: {0}")]
    Network(String),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("unexpected failure: {0}")]
    Unknown(String),
}

impl FetchError {
    /// User-facing message for the consuming layer.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::NotFound => "Wallet not found. Please check the address.",
            FetchError::ServiceUnavailable => "Server is currently unavailable. Try again later.",
            FetchError::Network(_) => "Network error. Please check your internet connection.",
            FetchError::Decode(_) => "Data error. Unable to process response.",
            FetchError::Unknown(_) => "Unexpected error. Try again.",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            if status.is_client_error() {
                return FetchError::NotFound;
            }
            if status.is_server_error() {
                return FetchError::ServiceUnavailable;
            }
        }

        if err.is_timeout() || err.is_connect() {
            FetchError::Network(err.to_string())
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            log::error!("unclassified transport failure: {}", err);
            FetchError::Unknown(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}
