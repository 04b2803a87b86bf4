//! Scripted in-memory exchange for tests.
//!
//! Records every call and answers from per-uuid scripts, so engine and
//! run-mode tests can drive cancel/status/create sequences deterministically.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use parking_lot::Mutex;
use refresh_core::{Balance, Order, Quantity, Rate};
use uuid::Uuid;

use crate::api::{BoxFuture, ExchangeClient, LimitOrderRequest};
use crate::error::{ExchangeError, ExchangeResult};

/// A call received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeCall {
    OpenOrders,
    Cancel(Uuid),
    GetOrder(Uuid),
    BuyLimit(LimitOrderRequest),
    SellLimit(LimitOrderRequest),
    Balance(String),
}

impl ExchangeCall {
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel(_))
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Self::BuyLimit(_) | Self::SellLimit(_))
    }
}

/// Scripted answer to a single-order lookup.
#[derive(Debug, Clone)]
pub enum StatusReply {
    /// Order still open.
    Open,
    /// Order closed.
    Closed,
    /// Lookup succeeded but the open flag is missing.
    Malformed,
    /// Lookup failed.
    Fail(ExchangeError),
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<ExchangeCall>,
    open_orders: Vec<Order>,
    open_orders_error: Option<ExchangeError>,
    rejected_cancels: HashSet<Uuid>,
    status_scripts: HashMap<Uuid, VecDeque<StatusReply>>,
    create_failures: u32,
    balances: HashMap<String, Balance>,
    rejected_sells: HashSet<String>,
}

/// Mock exchange client.
#[derive(Debug, Default)]
pub struct MockExchange {
    state: Mutex<MockState>,
    latency: Option<Duration>,
}

impl MockExchange {
    /// Create an empty mock: no open orders, every call succeeds, every
    /// cancelled order reports closed on the first lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_open_orders(&self, orders: Vec<Order>) {
        self.state.lock().open_orders = orders;
    }

    pub fn fail_open_orders(&self, error: ExchangeError) {
        self.state.lock().open_orders_error = Some(error);
    }

    /// Make `cancel(uuid)` fail.
    pub fn reject_cancel(&self, uuid: Uuid) {
        self.state.lock().rejected_cancels.insert(uuid);
    }

    /// Queue lookup replies for `uuid`. Once the script runs out the order
    /// reports closed.
    pub fn script_status(&self, uuid: Uuid, replies: impl IntoIterator<Item = StatusReply>) {
        self.state
            .lock()
            .status_scripts
            .entry(uuid)
            .or_default()
            .extend(replies);
    }

    /// Make the next `count` buy/sell-limit calls fail.
    pub fn fail_next_creates(&self, count: u32) {
        self.state.lock().create_failures = count;
    }

    pub fn set_balance(&self, balance: Balance) {
        self.state
            .lock()
            .balances
            .insert(balance.currency.clone(), balance);
    }

    /// Make every sell-limit on `market` fail.
    pub fn reject_sells_on(&self, market: impl Into<String>) {
        self.state.lock().rejected_sells.insert(market.into());
    }

    /// Recorded calls, in arrival order.
    pub fn calls(&self) -> Vec<ExchangeCall> {
        self.state.lock().calls.clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&ExchangeCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn creates(&self) -> Vec<LimitOrderRequest> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                ExchangeCall::BuyLimit(r) | ExchangeCall::SellLimit(r) => Some(r.clone()),
                _ => None,
            })
            .collect()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn record(&self, call: ExchangeCall) {
        self.state.lock().calls.push(call);
    }

    fn lookup(&self, uuid: Uuid) -> ExchangeResult<Order> {
        let mut state = self.state.lock();
        let reply = state
            .status_scripts
            .get_mut(&uuid)
            .and_then(VecDeque::pop_front)
            .unwrap_or(StatusReply::Closed);

        let is_open = match reply {
            StatusReply::Open => Some(true),
            StatusReply::Closed => Some(false),
            StatusReply::Malformed => None,
            StatusReply::Fail(e) => return Err(e),
        };

        let order = match state.open_orders.iter().find(|o| o.uuid() == uuid) {
            Some(order) => order.clone(),
            None => placeholder_order(uuid)?,
        };
        order
            .with_field("IsOpen", serde_json::json!(is_open))
            .map_err(|e| ExchangeError::Decode(e.to_string()))
    }

    fn create(&self, call: ExchangeCall) -> ExchangeResult<Uuid> {
        let mut state = self.state.lock();
        let market = match &call {
            ExchangeCall::BuyLimit(r) | ExchangeCall::SellLimit(r) => r.market.clone(),
            _ => String::new(),
        };
        let is_sell = matches!(call, ExchangeCall::SellLimit(_));
        state.calls.push(call);

        if state.create_failures > 0 {
            state.create_failures -= 1;
            return Err(ExchangeError::Rejected("MOCK_CREATE_FAILURE".to_string()));
        }
        if is_sell && state.rejected_sells.contains(&market) {
            return Err(ExchangeError::Rejected("INSUFFICIENT_FUNDS".to_string()));
        }
        Ok(Uuid::new_v4())
    }
}

fn placeholder_order(uuid: Uuid) -> ExchangeResult<Order> {
    Order::new(
        uuid,
        "BTC-UNKNOWN",
        refresh_core::OrderType::LimitBuy,
        Quantity::ZERO,
        Rate::ZERO,
        chrono::Utc::now(),
    )
    .map_err(|e| ExchangeError::Decode(e.to_string()))
}

impl ExchangeClient for MockExchange {
    fn open_orders(&self) -> BoxFuture<'_, ExchangeResult<Vec<Order>>> {
        Box::pin(async move {
            self.delay().await;
            self.record(ExchangeCall::OpenOrders);
            let state = self.state.lock();
            match &state.open_orders_error {
                Some(e) => Err(e.clone()),
                None => Ok(state.open_orders.clone()),
            }
        })
    }

    fn cancel(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<()>> {
        Box::pin(async move {
            self.delay().await;
            self.record(ExchangeCall::Cancel(uuid));
            if self.state.lock().rejected_cancels.contains(&uuid) {
                return Err(ExchangeError::Rejected("ORDER_NOT_OPEN".to_string()));
            }
            Ok(())
        })
    }

    fn order(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<Order>> {
        Box::pin(async move {
            self.delay().await;
            self.record(ExchangeCall::GetOrder(uuid));
            self.lookup(uuid)
        })
    }

    fn buy_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>> {
        Box::pin(async move {
            self.delay().await;
            self.create(ExchangeCall::BuyLimit(request))
        })
    }

    fn sell_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>> {
        Box::pin(async move {
            self.delay().await;
            self.create(ExchangeCall::SellLimit(request))
        })
    }

    fn balance(&self, currency: String) -> BoxFuture<'_, ExchangeResult<Balance>> {
        Box::pin(async move {
            self.delay().await;
            self.record(ExchangeCall::Balance(currency.clone()));
            self.state
                .lock()
                .balances
                .get(&currency)
                .cloned()
                .ok_or_else(|| ExchangeError::Rejected("INVALID_CURRENCY".to_string()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_mock_records_calls() {
        let mock = MockExchange::new();
        let uuid = Uuid::new_v4();

        mock.cancel(uuid).await.unwrap();
        mock.order(uuid).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![ExchangeCall::Cancel(uuid), ExchangeCall::GetOrder(uuid)]
        );
    }

    #[tokio::test]
    async fn test_status_script_then_closed() {
        let mock = MockExchange::new();
        let uuid = Uuid::new_v4();
        mock.script_status(uuid, [StatusReply::Open, StatusReply::Malformed]);

        assert_eq!(mock.order(uuid).await.unwrap().is_open(), Some(true));
        assert_eq!(mock.order(uuid).await.unwrap().is_open(), None);
        assert_eq!(mock.order(uuid).await.unwrap().is_open(), Some(false));
    }

    #[tokio::test]
    async fn test_create_failures_are_consumed() {
        let mock = MockExchange::new();
        mock.fail_next_creates(1);
        let request = LimitOrderRequest {
            market: "BTC-LTC".to_string(),
            quantity: Quantity::new(dec!(1)),
            rate: Rate::new(dec!(0.01)),
        };

        assert!(mock.buy_limit(request.clone()).await.is_err());
        assert!(mock.buy_limit(request).await.is_ok());
        assert_eq!(mock.count_calls(ExchangeCall::is_create), 2);
    }

    #[tokio::test]
    async fn test_rejected_cancel() {
        let mock = MockExchange::new();
        let uuid = Uuid::new_v4();
        mock.reject_cancel(uuid);

        assert!(matches!(
            mock.cancel(uuid).await,
            Err(ExchangeError::Rejected(_))
        ));
    }
}
