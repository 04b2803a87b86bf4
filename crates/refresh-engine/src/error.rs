//! Engine error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// A non-limit order was handed to an action that creates orders.
    #[error("Unsupported order type: {0}")]
    UnsupportedOrderType(refresh_core::CoreError),

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;
