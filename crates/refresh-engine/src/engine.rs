//! Order replacement engine.
//!
//! Drives each order of a batch through cancel -> confirm closed -> create,
//! with at most `concurrent_tasks` orders in flight.
//!
//! Retry policy:
//! - A refused cancel request is not retried; the order is skipped and stays
//!   live on the exchange.
//! - Once a cancel is accepted, the order status is polled every
//!   `retry_period` until the exchange reports it closed. No cap.
//! - Creating a replacement is retried every `retry_period` until it
//!   succeeds. No cap.

use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use refresh_core::{LimitSide, Order, ReplacementSpec};
use refresh_exchange::{DynExchangeClient, LimitOrderRequest};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::inflight::InflightTracker;
use crate::outcome::{BatchAction, BatchReport, CancelOutcome, OrderOutcome, OrderPhase};

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Delay between status checks and between create retries.
    pub retry_period: Duration,
    /// Maximum orders in flight at once.
    pub concurrent_tasks: usize,
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.concurrent_tasks == 0 {
            return Err(EngineError::InvalidConfig(
                "concurrent_tasks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry_period: Duration::from_millis(2000),
            concurrent_tasks: 4,
        }
    }
}

/// One order's work item, validated before the batch starts.
#[derive(Debug)]
enum Job {
    Cancel(Uuid),
    Create(Uuid, ReplacementSpec),
    Replace(Uuid, ReplacementSpec),
}

impl Job {
    fn prepare(order: &Order, action: BatchAction) -> EngineResult<Self> {
        let uuid = order.uuid();
        let spec = || order.replacement().map_err(EngineError::UnsupportedOrderType);
        Ok(match action {
            BatchAction::CancelOnly => Self::Cancel(uuid),
            BatchAction::CreateOnly => Self::Create(uuid, spec()?),
            BatchAction::Replace => Self::Replace(uuid, spec()?),
        })
    }
}

/// Cancel/confirm/recreate engine.
pub struct ReplacementEngine {
    client: DynExchangeClient,
    config: EngineConfig,
}

impl ReplacementEngine {
    pub fn new(client: DynExchangeClient, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cancel `uuid` and wait until the exchange reports it closed.
    ///
    /// Returns `Rejected` if the cancel request itself fails. Otherwise
    /// polls the order every `retry_period` until it is closed.
    pub async fn cancel_order(&self, uuid: Uuid) -> CancelOutcome {
        debug!(%uuid, phase = ?OrderPhase::CancelRequested, "Requesting cancel");

        if let Err(error) = self.client.cancel(uuid).await {
            warn!(%uuid, %error, phase = ?OrderPhase::CancelRejected, "Failed to cancel order; skipping");
            return CancelOutcome::Rejected(error);
        }

        let mut status_checks = 0u32;
        loop {
            sleep(self.config.retry_period).await;
            status_checks += 1;

            match self.client.order(uuid).await {
                Ok(order) => match order.is_open() {
                    Some(false) => {
                        debug!(%uuid, status_checks, phase = ?OrderPhase::CancelConfirmed, "Cancel confirmed");
                        return CancelOutcome::Confirmed { status_checks };
                    }
                    Some(true) => {
                        debug!(%uuid, status_checks, "Cancellation still pending; will retry");
                    }
                    None => {
                        warn!(%uuid, status_checks, "Order status has no open flag; will retry");
                    }
                },
                Err(error) => {
                    warn!(%uuid, status_checks, %error, "Checking order failed; will retry");
                }
            }
        }
    }

    /// Place `spec` as a new limit order, retrying until the exchange accepts it.
    pub async fn create_order(&self, spec: &ReplacementSpec) -> Uuid {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            debug!(
                market = %spec.market,
                side = %spec.side,
                quantity = %spec.quantity,
                rate = %spec.rate,
                attempt,
                phase = ?OrderPhase::CreateRequested,
                "Creating limit order"
            );

            let request = LimitOrderRequest::from(spec);
            let result = match spec.side {
                LimitSide::Buy => self.client.buy_limit(request).await,
                LimitSide::Sell => self.client.sell_limit(request).await,
            };

            match result {
                Ok(uuid) => {
                    debug!(%uuid, attempt, phase = ?OrderPhase::Created, "Limit order created");
                    return uuid;
                }
                Err(error) => {
                    warn!(
                        market = %spec.market,
                        order_type = %spec.order_type(),
                        attempt,
                        %error,
                        "Failed to create order; will retry"
                    );
                    sleep(self.config.retry_period).await;
                }
            }
        }
    }

    /// Run `action` over `orders` with bounded concurrency.
    ///
    /// For actions that create orders, every order is converted to a
    /// `ReplacementSpec` up front; a non-limit order fails the whole batch
    /// before any exchange call is made.
    pub async fn run_batch(
        &self,
        orders: Vec<Order>,
        action: BatchAction,
    ) -> EngineResult<BatchReport> {
        let jobs = orders
            .iter()
            .map(|order| Job::prepare(order, action))
            .collect::<EngineResult<Vec<_>>>()?;

        if jobs.is_empty() {
            return Ok(BatchReport::empty(action));
        }

        info!(
            %action,
            orders = jobs.len(),
            concurrent_tasks = self.config.concurrent_tasks,
            "Starting batch"
        );

        let tracker = InflightTracker::new(self.config.concurrent_tasks);
        let outcomes: Vec<OrderOutcome> = stream::iter(jobs)
            .map(|job| self.run_job(job, &tracker))
            .buffer_unordered(self.config.concurrent_tasks)
            .collect()
            .await;

        let report = BatchReport::new(action, outcomes, tracker.peak());
        info!(
            %action,
            succeeded = report.succeeded,
            skipped = report.skipped,
            total = report.total,
            "Batch complete: {}/{} orders",
            report.succeeded,
            report.total
        );
        Ok(report)
    }

    async fn run_job(&self, job: Job, tracker: &InflightTracker) -> OrderOutcome {
        let _slot = tracker.enter();

        match job {
            Job::Cancel(uuid) => match self.cancel_order(uuid).await {
                CancelOutcome::Confirmed { .. } => {
                    debug!(%uuid, "Order cancelled");
                    OrderOutcome::Cancelled { original: uuid }
                }
                CancelOutcome::Rejected(error) => skipped(uuid, error.to_string()),
            },
            Job::Create(uuid, spec) => {
                let created = self.create_order(&spec).await;
                debug!(source = %uuid, %created, "Order restored");
                OrderOutcome::Created {
                    source: uuid,
                    created,
                }
            }
            Job::Replace(uuid, spec) => {
                debug!(%uuid, phase = ?OrderPhase::PendingCancel, "Replacing order");
                match self.cancel_order(uuid).await {
                    CancelOutcome::Confirmed { .. } => {
                        let replacement = self.create_order(&spec).await;
                        debug!(%uuid, %replacement, "Order replaced");
                        OrderOutcome::Replaced {
                            original: uuid,
                            replacement,
                        }
                    }
                    CancelOutcome::Rejected(error) => skipped(uuid, error.to_string()),
                }
            }
        }
    }
}

fn skipped(uuid: Uuid, reason: String) -> OrderOutcome {
    debug!(%uuid, %reason, phase = ?OrderPhase::Skipped, "Order skipped this run");
    OrderOutcome::Skipped {
        original: uuid,
        reason,
    }
}
