//! Exchange wrapper that checks the backup directory on every cancel.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use refresh_core::{Balance, Order};
use refresh_exchange::{
    BoxFuture, ExchangeClient, ExchangeResult, LimitOrderRequest, MockExchange,
};
use uuid::Uuid;

use super::fixtures::backup_files;

/// Delegates to a `MockExchange` and records, for each cancel, whether a
/// backup file already existed.
pub struct BackupWatch {
    pub inner: Arc<MockExchange>,
    dir: PathBuf,
    seen: Mutex<Vec<bool>>,
}

impl BackupWatch {
    pub fn new(inner: Arc<MockExchange>, dir: PathBuf) -> Self {
        Self {
            inner,
            dir,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// One entry per cancel: whether a backup existed at that moment.
    pub fn backup_seen_at_cancel(&self) -> Vec<bool> {
        self.seen.lock().clone()
    }
}

impl ExchangeClient for BackupWatch {
    fn open_orders(&self) -> BoxFuture<'_, ExchangeResult<Vec<Order>>> {
        self.inner.open_orders()
    }

    fn cancel(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<()>> {
        let exists = !backup_files(&self.dir).is_empty();
        self.seen.lock().push(exists);
        self.inner.cancel(uuid)
    }

    fn order(&self, uuid: Uuid) -> BoxFuture<'_, ExchangeResult<Order>> {
        self.inner.order(uuid)
    }

    fn buy_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>> {
        self.inner.buy_limit(request)
    }

    fn sell_limit(&self, request: LimitOrderRequest) -> BoxFuture<'_, ExchangeResult<Uuid>> {
        self.inner.sell_limit(request)
    }

    fn balance(&self, currency: String) -> BoxFuture<'_, ExchangeResult<Balance>> {
        self.inner.balance(currency)
    }
}
