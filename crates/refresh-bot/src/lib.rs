//! Stale limit-order refresher.
//!
//! Keeps long-lived limit orders fresh by cancelling the stale ones and
//! placing identical replacements:
//! - Open-order snapshot and backup before any cancel
//! - Stale-order selection with optional per-run sampling
//! - Cancel/confirm/recreate through the replacement engine
//! - Recovery modes: purge all limit orders, restore from a backup
//! - Sell ladder for a single coin

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod ladder;

pub use app::{Application, RunSummary};
pub use cli::{Args, RunMode};
pub use config::{AppConfig, LadderConfig};
pub use error::{AppError, AppResult};
pub use ladder::{ladder_rungs, place_ladder, LadderReport, LadderRung};
