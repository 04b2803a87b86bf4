//! Per-order phases, outcomes, and the batch report.

use std::fmt;

use refresh_exchange::ExchangeError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a batch does with each order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    /// Cancel and confirm closure; never create (purge).
    CancelOnly,
    /// Create from the order's spec; never cancel (restore).
    CreateOnly,
    /// Cancel, confirm closure, then create the replacement.
    Replace,
}

impl fmt::Display for BatchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CancelOnly => write!(f, "cancel"),
            Self::CreateOnly => write!(f, "create"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

/// Workflow phase of a single order.
///
/// Replace runs `PendingCancel -> CancelRequested -> CancelConfirmed ->
/// CreateRequested -> Created`, or `CancelRequested -> CancelRejected ->
/// Skipped` when the exchange refuses the cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    PendingCancel,
    CancelRequested,
    CancelConfirmed,
    CancelRejected,
    CreateRequested,
    Created,
    Skipped,
}

/// Result of `cancel_order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The exchange confirmed the order is closed.
    Confirmed { status_checks: u32 },
    /// The cancel request itself was refused.
    Rejected(ExchangeError),
}

/// Terminal outcome of one order in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    Replaced { original: Uuid, replacement: Uuid },
    Cancelled { original: Uuid },
    Created { source: Uuid, created: Uuid },
    Skipped { original: Uuid, reason: String },
}

impl OrderOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Summary of a finished batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub action: BatchAction,
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    /// Most workflows observed in flight at once.
    pub peak_in_flight: usize,
    /// Outcomes in completion order.
    pub outcomes: Vec<OrderOutcome>,
}

impl BatchReport {
    pub fn new(action: BatchAction, outcomes: Vec<OrderOutcome>, peak_in_flight: usize) -> Self {
        let skipped = outcomes.iter().filter(|o| o.is_skipped()).count();
        Self {
            action,
            total: outcomes.len(),
            succeeded: outcomes.len() - skipped,
            skipped,
            peak_in_flight,
            outcomes,
        }
    }

    pub fn empty(action: BatchAction) -> Self {
        Self::new(action, Vec::new(), 0)
    }
}
