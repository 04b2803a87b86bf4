//! Structured logging initialization.

use crate::error::{TelemetryError, TelemetryResult};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,refresh=debug,order_refresher=debug";

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// `Json` when `rust_env` is `production`, `Pretty` otherwise.
    pub fn for_environment(rust_env: Option<&str>) -> Self {
        match rust_env {
            Some("production") => Self::Json,
            _ => Self::Pretty,
        }
    }

    /// Format selected by the `RUST_ENV` environment variable.
    pub fn from_env() -> Self {
        Self::for_environment(std::env::var("RUST_ENV").ok().as_deref())
    }
}

/// Build the event filter from `RUST_LOG`, falling back to `DEFAULT_FILTER`.
pub fn build_filter(rust_log: Option<&str>) -> TelemetryResult<EnvFilter> {
    match rust_log {
        Some(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| TelemetryError::InvalidFilter {
                filter: directives.to_string(),
                reason: e.to_string(),
            })
        }
        _ => Ok(EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Initialize structured logging.
///
/// Pretty output for development, JSON when `RUST_ENV=production`.
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> TelemetryResult<()> {
    let env_filter = build_filter(std::env::var("RUST_LOG").ok().as_deref())?;

    let result = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(true))
            .try_init(),
    };

    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}
