//! Structured logging for the order refresher.
//!
//! Every crate logs through `tracing`; this crate installs the subscriber
//! once at startup.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{build_filter, init_logging, LogFormat, DEFAULT_FILTER};
