//! Orders, configuration and application builders.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use refresh_bot::{AppConfig, Application};
use refresh_core::{Order, OrderType, Quantity, Rate};
use refresh_exchange::DynExchangeClient;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Fixed run time.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 8, 30, 0).unwrap()
}

/// An open order opened `age_days` before `now()`.
pub fn open_order(order_type: OrderType, market: &str, age_days: i64) -> Order {
    order_with(order_type, market, age_days, Decimal::new(125, 1), Decimal::new(42, 4))
}

pub fn order_with(
    order_type: OrderType,
    market: &str,
    age_days: i64,
    quantity: Decimal,
    rate: Decimal,
) -> Order {
    Order::new(
        Uuid::new_v4(),
        market,
        order_type,
        Quantity::new(quantity),
        Rate::new(rate),
        now() - Duration::days(age_days),
    )
    .and_then(|order| order.with_field("Quantity", serde_json::json!(20.0)))
    .and_then(|order| order.with_field("Closed", serde_json::Value::Null))
    .unwrap()
}

/// Configuration with a 1 ms retry period and backups under `dir`.
pub fn config(dir: &Path) -> AppConfig {
    let mut config = AppConfig::from_toml_str(
        "retry_period_ms = 1\nconcurrent_tasks = 2\n[credentials]\nkey = \"test-key\"\nsecret = \"test-secret\"\n",
    )
    .unwrap();
    config.backup_file = dir
        .join("open-orders-{timestamp}.json")
        .display()
        .to_string();
    config
}

pub fn app_over<C>(config: AppConfig, client: &Arc<C>) -> Application
where
    C: refresh_exchange::ExchangeClient + 'static,
{
    let client: DynExchangeClient = client.clone();
    Application::new(config, client).unwrap()
}

/// JSON files in `dir`.
pub fn backup_files(dir: &Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect()
        })
        .unwrap_or_default()
}
