//! Command line interface.

use std::path::PathBuf;

use clap::Parser;
use refresh_core::Rate;

use crate::error::{AppError, AppResult};

/// Cancel and re-create stale limit orders so they stay on the book.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (can also be set via REFRESH_CONFIG env var)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Cancel every open limit order, without replacing them
    #[arg(long, conflicts_with_all = ["restore_orders", "sell_order"])]
    pub purge_open_orders: bool,

    /// Re-create every order in a backup file
    #[arg(long, value_name = "FILE", conflicts_with = "sell_order")]
    pub restore_orders: Option<PathBuf>,

    /// Place a ladder of sell orders for the available balance of --coin
    #[arg(long)]
    pub sell_order: bool,

    /// Coin to sell (with --sell-order)
    #[arg(short, long)]
    pub coin: Option<String>,

    /// Starting rate of the sell ladder (with --sell-order)
    #[arg(short, long, value_name = "RATE")]
    pub float: Option<Rate>,
}

/// What a run does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Back up open limit orders, then replace the stale ones.
    Replace,
    /// Cancel every open limit order.
    Purge,
    /// Create every order recorded in a backup file.
    Restore(PathBuf),
    /// Sell the available balance of `coin` in rungs starting at `start_rate`.
    SellLadder { coin: String, start_rate: Rate },
}

impl Args {
    pub fn mode(&self) -> AppResult<RunMode> {
        if self.sell_order {
            return match (&self.coin, self.float) {
                (Some(coin), Some(start_rate)) if !coin.trim().is_empty() => {
                    Ok(RunMode::SellLadder {
                        coin: coin.trim().to_uppercase(),
                        start_rate,
                    })
                }
                _ => Err(AppError::Cli(
                    "--sell-order requires both --coin and --float".to_string(),
                )),
            };
        }
        if self.coin.is_some() || self.float.is_some() {
            return Err(AppError::Cli(
                "--coin and --float are only valid with --sell-order".to_string(),
            ));
        }
        if self.purge_open_orders {
            return Ok(RunMode::Purge);
        }
        if let Some(path) = &self.restore_orders {
            return Ok(RunMode::Restore(path.clone()));
        }
        Ok(RunMode::Replace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("order-refresher").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_no_flags_is_replace() {
        assert_eq!(parse(&[]).mode().unwrap(), RunMode::Replace);
    }

    #[test]
    fn test_purge_and_restore() {
        assert_eq!(
            parse(&["--purge-open-orders"]).mode().unwrap(),
            RunMode::Purge
        );
        assert_eq!(
            parse(&["--restore-orders", "backups/b.json"]).mode().unwrap(),
            RunMode::Restore(PathBuf::from("backups/b.json"))
        );
    }

    #[test]
    fn test_sell_ladder() {
        let args = parse(&["--sell-order", "-c", "ltc", "-f", "0.0125"]);
        assert_eq!(
            args.mode().unwrap(),
            RunMode::SellLadder {
                coin: "LTC".to_string(),
                start_rate: Rate::new(dec!(0.0125)),
            }
        );
    }

    #[test]
    fn test_sell_ladder_needs_coin_and_rate() {
        assert!(matches!(
            parse(&["--sell-order", "--coin", "LTC"]).mode(),
            Err(AppError::Cli(_))
        ));
        assert!(matches!(
            parse(&["--float", "0.1"]).mode(),
            Err(AppError::Cli(_))
        ));
    }

    #[test]
    fn test_conflicting_modes_rejected() {
        let result = Args::try_parse_from([
            "order-refresher",
            "--purge-open-orders",
            "--restore-orders",
            "b.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_flag() {
        let args = parse(&["-C", "conf/prod.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("conf/prod.toml")));
    }
}
