//! Order replacement engine.
//!
//! Takes a batch of orders and drives each one through cancel, confirm
//! closed, and create, with a bounded number of orders in flight.
//!
//! # Key Components
//!
//! - [`ReplacementEngine`]: per-order workflows and batch execution
//! - [`BatchAction`]: replace, cancel-only (purge), or create-only (restore)
//! - [`BatchReport`]: per-order outcomes and counts for a finished batch
//! - [`InflightTracker`]: in-flight gauge used to enforce the concurrency cap

pub mod engine;
pub mod error;
pub mod inflight;
pub mod outcome;

pub use engine::{EngineConfig, ReplacementEngine};
pub use error::{EngineError, EngineResult};
pub use inflight::{InflightGuard, InflightTracker};
pub use outcome::{BatchAction, BatchReport, CancelOutcome, OrderOutcome, OrderPhase};
