//! Core domain types for the order refresher.
//!
//! This crate provides the types shared by every other crate in the workspace:
//! - `Order`: an open order as reported by the exchange
//! - `ReplacementSpec`: the limit order that replaces a cancelled one
//! - `Rate`, `Quantity`: precision-safe numeric types
//! - `selector`: limit-order filtering, staleness and per-run sampling

pub mod account;
pub mod decimal;
pub mod error;
pub mod order;
pub mod selector;
pub mod time;

pub use account::Balance;
pub use decimal::{Quantity, Rate};
pub use error::{CoreError, Result};
pub use order::{LimitSide, Order, OrderRecord, OrderType, ReplacementSpec};
pub use selector::{limit_orders, sample_count, StalePolicy, StaleSelector};
