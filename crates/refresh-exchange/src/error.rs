//! Exchange client error types.

use thiserror::Error;

/// Every way an exchange call can fail, collapsed into one channel.
///
/// Transport failures, non-200 responses and `success: false` payloads all
/// end up here, so callers only ever check a single `Result`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Exchange rejected request: {0}")]
    Rejected(String),

    #[error("Response for {0} carried no result")]
    MissingResult(&'static str),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Client configuration error: {0}")]
    Config(String),
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
