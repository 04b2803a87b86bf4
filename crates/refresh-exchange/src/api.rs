//! Exchange client trait and wire envelope.
//!
//! The trait is the seam between the replacement engine and the network:
//! the engine only sees `ExchangeResult<T>`, whether the failure came from
//! the transport or from a `success: false` payload.

use std::pin::Pin;
use std::sync::Arc;

use refresh_core::{Balance, Order, Quantity, Rate, ReplacementSpec};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ExchangeError, ExchangeResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Parameters of a buy-limit or sell-limit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrderRequest {
    pub market: String,
    pub quantity: Quantity,
    pub rate: Rate,
}

impl From<&ReplacementSpec> for LimitOrderRequest {
    fn from(spec: &ReplacementSpec) -> Self {
        Self {
            market: spec.market.clone(),
            quantity: spec.quantity,
            rate: spec.rate,
        }
    }
}

/// The exchange calls the refresher depends on.
pub trait ExchangeClient: Send + Sync {
    /// List all open orders on the account.
    fn open_orders(&self) -> BoxFuture<'_, ExchangeResult<Vec<Order>>>;

    /// Request cancellation. Success means the request was accepted, not
    /// that the order is closed yet.
    fn cancel(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<()>>;

    /// Look up a single order, including its `IsOpen` flag.
    fn order(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<Order>>;

    /// Place a buy-limit order, returning the new order's uuid.
    fn buy_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>>;

    /// Place a sell-limit order, returning the new order's uuid.
    fn sell_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>>;

    /// Balance of one currency.
    fn balance(&self, currency: String) -> BoxFuture<'_, ExchangeResult<Balance>>;
}

/// Arc wrapper for ExchangeClient trait objects.
pub type DynExchangeClient = Arc<dyn ExchangeClient>;

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Collapse `success: false` into an error; the result may still be absent.
    pub fn into_result(self) -> ExchangeResult<Option<T>> {
        if !self.success {
            let message = if self.message.is_empty() {
                "no message".to_string()
            } else {
                self.message
            };
            return Err(ExchangeError::Rejected(message));
        }
        Ok(self.result)
    }

    /// Like `into_result`, but a missing result is an error too.
    pub fn require_result(self, call: &'static str) -> ExchangeResult<T> {
        self.into_result()?.ok_or(ExchangeError::MissingResult(call))
    }
}

/// Result payload of buy-limit and sell-limit.
#[derive(Debug, Deserialize)]
pub struct PlacedOrder {
    pub uuid: Uuid,
}
