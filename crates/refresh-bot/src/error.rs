//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command line error: {0}")]
    Cli(String),

    #[error("Failed to get open orders: {0}")]
    OpenOrders(#[source] refresh_exchange::ExchangeError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] refresh_exchange::ExchangeError),

    #[error("Engine error: {0}")]
    Engine(#[from] refresh_engine::EngineError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] refresh_persistence::PersistenceError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] refresh_telemetry::TelemetryError),
}

impl From<refresh_core::CoreError> for AppError {
    fn from(e: refresh_core::CoreError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
