//! Error types for refresh-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Order {uuid} has type {order_type}, only LIMIT_BUY and LIMIT_SELL can be replaced")]
    NotALimitOrder { uuid: uuid::Uuid, order_type: String },

    #[error("Malformed order field {field}: {reason}")]
    MalformedOrder { field: &'static str, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
