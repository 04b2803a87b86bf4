//! Sell ladder.
//!
//! Splits the available balance of a coin into a series of sell orders at
//! rising rates. Starting from the full available quantity and the given
//! rate, each rung first removes `rake` of the running quantity and
//! multiplies the rate by `cycle_multiplier`, then sells the running
//! quantity (rounded down to 7 decimals) at the new rate.

use refresh_core::{Quantity, Rate};
use refresh_exchange::{DynExchangeClient, LimitOrderRequest};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LadderConfig;
use crate::error::AppResult;

/// Decimal places kept on rung quantities.
pub const QUANTITY_DECIMALS: u32 = 7;

/// One sell order of the ladder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderRung {
    /// 1-based position in the ladder.
    pub cycle: u32,
    pub quantity: Quantity,
    pub rate: Rate,
}

/// Outcome of placing a ladder.
#[derive(Debug, Clone, Default)]
pub struct LadderReport {
    pub market: String,
    pub placed: Vec<(LadderRung, Uuid)>,
    pub failed: Vec<LadderRung>,
}

/// Rungs for `available` starting at `start_rate`.
pub fn ladder_rungs(available: Quantity, start_rate: Rate, config: &LadderConfig) -> Vec<LadderRung> {
    let mut quantity = available;
    let mut rate = start_rate;

    (1..=config.number_of_cycles)
        .map(|cycle| {
            quantity = quantity - quantity * config.rake;
            rate = rate * config.cycle_multiplier;
            LadderRung {
                cycle,
                quantity: quantity.round_down(QUANTITY_DECIMALS),
                rate,
            }
        })
        .collect()
}

/// Market the ladder sells on, e.g. `BTC-LTC`.
pub fn ladder_market(coin: &str, config: &LadderConfig) -> String {
    format!("{}-{}", config.quote_currency, coin)
}

/// Fetch the balance of `coin` and place every rung once.
///
/// A failed rung is logged and left out; it is not retried.
pub async fn place_ladder(
    client: &DynExchangeClient,
    coin: &str,
    start_rate: Rate,
    config: &LadderConfig,
) -> AppResult<LadderReport> {
    let balance = client.balance(coin.to_string()).await?;
    let market = ladder_market(coin, config);
    info!(
        coin,
        %market,
        available = %balance.available,
        %start_rate,
        cycles = config.number_of_cycles,
        "Placing sell ladder"
    );

    let mut report = LadderReport {
        market: market.clone(),
        ..Default::default()
    };

    for rung in ladder_rungs(balance.available, start_rate, config) {
        let request = LimitOrderRequest {
            market: market.clone(),
            quantity: rung.quantity,
            rate: rung.rate,
        };
        match client.sell_limit(request).await {
            Ok(uuid) => {
                info!(%uuid, cycle = rung.cycle, quantity = %rung.quantity, rate = %rung.rate, "Sell rung placed");
                report.placed.push((rung, uuid));
            }
            Err(error) => {
                warn!(cycle = rung.cycle, quantity = %rung.quantity, rate = %rung.rate, %error, "Failed to place sell rung");
                report.failed.push(rung);
            }
        }
    }

    info!(
        %market,
        placed = report.placed.len(),
        failed = report.failed.len(),
        "Sell ladder done"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refresh_core::Balance;
    use refresh_exchange::{ExchangeCall, ExchangeError, MockExchange};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    #[test]
    fn test_rungs_follow_rake_and_multiplier() {
        let config = LadderConfig {
            number_of_cycles: 3,
            ..Default::default()
        };
        let rungs = ladder_rungs(Quantity::new(dec!(100)), Rate::new(dec!(0.01)), &config);

        assert_eq!(rungs.len(), 3);
        assert_eq!(rungs[0].cycle, 1);
        assert_eq!(rungs[0].quantity, Quantity::new(dec!(90)));
        assert_eq!(rungs[0].rate, Rate::new(dec!(0.011)));
        assert_eq!(rungs[1].quantity, Quantity::new(dec!(81)));
        assert_eq!(rungs[1].rate, Rate::new(dec!(0.0121)));
        assert_eq!(rungs[2].quantity, Quantity::new(dec!(72.9)));
        assert_eq!(rungs[2].rate, Rate::new(dec!(0.01331)));
    }

    #[test]
    fn test_rung_quantity_rounds_down_to_seven_places() {
        let config = LadderConfig {
            number_of_cycles: 1,
            rake: dec!(0.3),
            ..Default::default()
        };
        let rungs = ladder_rungs(Quantity::new(dec!(1.23456789)), Rate::new(dec!(1)), &config);

        // 1.23456789 * 0.7 = 0.864197523
        assert_eq!(rungs[0].quantity, Quantity::new(dec!(0.8641975)));
    }

    #[test]
    fn test_zero_cycles() {
        let config = LadderConfig {
            number_of_cycles: 0,
            ..Default::default()
        };
        assert!(ladder_rungs(Quantity::new(dec!(5)), Rate::new(dec!(1)), &config).is_empty());
    }

    #[test]
    fn test_market_name() {
        assert_eq!(ladder_market("LTC", &LadderConfig::default()), "BTC-LTC");
    }

    fn balance(currency: &str, available: rust_decimal::Decimal) -> Balance {
        Balance {
            currency: currency.to_string(),
            balance: Quantity::new(available),
            available: Quantity::new(available),
            pending: Quantity::ZERO,
        }
    }

    #[tokio::test]
    async fn test_place_ladder_sells_each_rung_once() {
        let mock = Arc::new(MockExchange::new());
        mock.set_balance(balance("LTC", dec!(10)));
        let client: DynExchangeClient = mock.clone();
        let config = LadderConfig {
            number_of_cycles: 2,
            ..Default::default()
        };

        let report = place_ladder(&client, "LTC", Rate::new(dec!(0.02)), &config)
            .await
            .unwrap();

        assert_eq!(report.market, "BTC-LTC");
        assert_eq!(report.placed.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(mock.calls()[0], ExchangeCall::Balance("LTC".to_string()));
        let sells = mock.creates();
        assert_eq!(sells.len(), 2);
        assert_eq!(sells[0].quantity, Quantity::new(dec!(9)));
        assert_eq!(sells[1].rate, Rate::new(dec!(0.0242)));
        assert!(sells.iter().all(|r| r.market == "BTC-LTC"));
    }

    #[tokio::test]
    async fn test_failed_rungs_are_not_retried() {
        let mock = Arc::new(MockExchange::new());
        mock.set_balance(balance("XRP", dec!(50)));
        mock.reject_sells_on("BTC-XRP");
        let client: DynExchangeClient = mock.clone();

        let report = place_ladder(&client, "XRP", Rate::new(dec!(0.0001)), &LadderConfig::default())
            .await
            .unwrap();

        assert!(report.placed.is_empty());
        assert_eq!(report.failed.len(), 5);
        assert_eq!(mock.count_calls(ExchangeCall::is_create), 5);
    }

    #[tokio::test]
    async fn test_unknown_currency_is_an_error() {
        let mock = Arc::new(MockExchange::new());
        let client: DynExchangeClient = mock;

        let result = place_ladder(&client, "NOPE", Rate::new(dec!(1)), &LadderConfig::default()).await;
        assert!(matches!(
            result,
            Err(crate::error::AppError::Exchange(ExchangeError::Rejected(_)))
        ));
    }
}
