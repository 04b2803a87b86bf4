//! Stale-order selection.
//!
//! Decides which open orders a normal run acts on:
//! 1. Only `LIMIT_BUY`/`LIMIT_SELL` orders are considered, unless
//!    `replace_all_orders` is set, in which case every open order is taken
//!    and age is ignored.
//! 2. An order is stale when its age in fractional days is strictly greater
//!    than `max_order_age_days`.
//! 3. With `percent_to_replace_each_run`, only a random sample of the stale
//!    set is returned, keeping the input order.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::order::Order;
use crate::time::age_days;

/// Returns the limit orders among `orders`, in input order.
pub fn limit_orders(orders: &[Order]) -> Vec<Order> {
    orders.iter().filter(|o| o.is_limit()).cloned().collect()
}

/// Number of orders to act on when sampling `pct` percent of `n`.
///
/// `floor(n * pct / 100) + 1`, capped at `n`. Zero when `n` is zero.
pub fn sample_count(n: usize, pct: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let scaled = (n as f64 * pct / 100.0).floor() as usize;
    scaled.saturating_add(1).min(n)
}

/// Staleness policy, taken from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StalePolicy {
    pub max_order_age_days: f64,
    pub replace_all_orders: bool,
    pub percent_to_replace_each_run: Option<f64>,
}

impl StalePolicy {
    pub fn validate(&self) -> Result<()> {
        if !self.max_order_age_days.is_finite() || self.max_order_age_days < 0.0 {
            return Err(CoreError::InvalidConfig(format!(
                "max_order_age_days must be a non-negative number, got {}",
                self.max_order_age_days
            )));
        }
        if let Some(pct) = self.percent_to_replace_each_run {
            if !(pct > 0.0 && pct <= 100.0) {
                return Err(CoreError::InvalidConfig(format!(
                    "percent_to_replace_each_run must be in (0, 100], got {pct}"
                )));
            }
        }
        Ok(())
    }
}

/// Applies a `StalePolicy` to a snapshot of open orders.
#[derive(Debug, Clone)]
pub struct StaleSelector {
    policy: StalePolicy,
}

impl StaleSelector {
    pub fn new(policy: StalePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StalePolicy {
        &self.policy
    }

    /// Whether a single order is stale at `now`.
    pub fn is_stale(&self, order: &Order, now: DateTime<Utc>) -> bool {
        age_days(order.opened(), now) > self.policy.max_order_age_days
    }

    /// Candidate set before sampling.
    pub fn candidates(&self, orders: &[Order], now: DateTime<Utc>) -> Vec<Order> {
        if self.policy.replace_all_orders {
            return orders.to_vec();
        }
        orders
            .iter()
            .filter(|o| o.is_limit() && self.is_stale(o, now))
            .cloned()
            .collect()
    }

    /// Random sample of `candidates` according to the policy, in input order.
    pub fn sample<R: Rng + ?Sized>(&self, candidates: Vec<Order>, rng: &mut R) -> Vec<Order> {
        let Some(pct) = self.policy.percent_to_replace_each_run else {
            return candidates;
        };
        if candidates.is_empty() {
            return candidates;
        }

        let amount = sample_count(candidates.len(), pct);
        let mut picked = rand::seq::index::sample(rng, candidates.len(), amount).into_vec();
        picked.sort_unstable();

        let mut slots: Vec<Option<Order>> = candidates.into_iter().map(Some).collect();
        picked
            .into_iter()
            .filter_map(|idx| slots[idx].take())
            .collect()
    }
}
