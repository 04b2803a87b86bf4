//! Run-mode orchestration.
//!
//! One run does one of:
//! - Replace (default): back up open limit orders, pick the stale ones,
//!   cancel and re-create them
//! - Purge: cancel every open limit order
//! - Restore: re-create every order in a backup file
//! - Sell ladder: place a series of sell orders for one coin

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use refresh_core::{limit_orders, Order, Rate, StaleSelector};
use refresh_engine::{BatchAction, BatchReport, ReplacementEngine};
use refresh_exchange::DynExchangeClient;
use refresh_persistence::{read_backup, BackupStore};
use tracing::{info, warn};

use crate::cli::RunMode;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::ladder::{place_ladder, LadderReport};

/// What a finished run did.
#[derive(Debug)]
pub enum RunSummary {
    /// A batch ran. `backup` is set for replace runs.
    Batch {
        backup: Option<PathBuf>,
        report: BatchReport,
    },
    /// Replace run with no stale orders.
    NothingToDo { backup: PathBuf },
    /// Sell ladder placed.
    Ladder(LadderReport),
}

impl RunSummary {
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            Self::Batch { report, .. } => Some(report),
            _ => None,
        }
    }

    pub fn backup(&self) -> Option<&Path> {
        match self {
            Self::Batch { backup, .. } => backup.as_deref(),
            Self::NothingToDo { backup } => Some(backup),
            Self::Ladder(_) => None,
        }
    }
}

/// Main application.
pub struct Application {
    config: AppConfig,
    client: DynExchangeClient,
    engine: ReplacementEngine,
    selector: StaleSelector,
    backups: BackupStore,
}

impl Application {
    /// Create a new application over `client`.
    pub fn new(config: AppConfig, client: DynExchangeClient) -> AppResult<Self> {
        config.validate()?;
        let engine = ReplacementEngine::new(client.clone(), config.engine_config())?;
        let selector = StaleSelector::new(config.stale_policy());
        let backups = BackupStore::new(config.backup_file.clone())?;

        Ok(Self {
            config,
            client,
            engine,
            selector,
            backups,
        })
    }

    /// Run `mode` to completion.
    pub async fn run(&self, mode: RunMode) -> AppResult<RunSummary> {
        self.run_at(mode, Utc::now()).await
    }

    /// Run `mode` with `now` as the snapshot time for staleness and backups.
    pub async fn run_at(&self, mode: RunMode, now: DateTime<Utc>) -> AppResult<RunSummary> {
        info!(?mode, "Starting run");

        match mode {
            RunMode::SellLadder { coin, start_rate } => self.sell_ladder(&coin, start_rate).await,
            RunMode::Purge => {
                let orders = self.fetch_open_orders().await?;
                self.purge(orders).await
            }
            RunMode::Restore(path) => {
                self.fetch_open_orders().await?;
                self.restore(&path).await
            }
            RunMode::Replace => {
                let orders = self.fetch_open_orders().await?;
                self.replace(orders, now).await
            }
        }
    }

    /// Fetch every open order. A failure here ends the run.
    async fn fetch_open_orders(&self) -> AppResult<Vec<Order>> {
        let orders = self
            .client
            .open_orders()
            .await
            .map_err(AppError::OpenOrders)?;
        info!(
            "You have {} open orders, of which {} are limit orders.",
            orders.len(),
            orders.iter().filter(|o| o.is_limit()).count()
        );
        Ok(orders)
    }

    async fn purge(&self, orders: Vec<Order>) -> AppResult<RunSummary> {
        let orders = limit_orders(&orders);
        warn!(orders = orders.len(), "Cancelling open limit orders");
        let report = self.engine.run_batch(orders, BatchAction::CancelOnly).await?;
        Ok(RunSummary::Batch {
            backup: None,
            report,
        })
    }

    async fn restore(&self, path: &Path) -> AppResult<RunSummary> {
        let orders = read_backup(path)?;
        warn!(path = %path.display(), orders = orders.len(), "Restoring limit orders from backup");
        let report = self.engine.run_batch(orders, BatchAction::CreateOnly).await?;
        Ok(RunSummary::Batch {
            backup: None,
            report,
        })
    }

    async fn replace(&self, orders: Vec<Order>, now: DateTime<Utc>) -> AppResult<RunSummary> {
        let backup = self.backups.write(&limit_orders(&orders), now)?;
        info!(path = %backup.display(), "All current limit orders backed up");

        let policy = self.selector.policy();
        let candidates = self.selector.candidates(&orders, now);
        if policy.replace_all_orders {
            info!(orders = candidates.len(), "Replacing all orders (replace_all_orders = true)");
        } else {
            info!(
                orders = candidates.len(),
                max_order_age_days = policy.max_order_age_days,
                "Limit orders older than the age threshold will be replaced"
            );
        }

        let selected = self.selector.sample(candidates, &mut StdRng::from_entropy());
        if selected.is_empty() {
            info!("Nothing to do.");
            return Ok(RunSummary::NothingToDo { backup });
        }
        if let Some(pct) = policy.percent_to_replace_each_run {
            info!(orders = selected.len(), percent = pct, "Sampled orders for this run");
        }

        let report = self.engine.run_batch(selected, BatchAction::Replace).await?;
        Ok(RunSummary::Batch {
            backup: Some(backup),
            report,
        })
    }

    async fn sell_ladder(&self, coin: &str, start_rate: Rate) -> AppResult<RunSummary> {
        let report = place_ladder(&self.client, coin, start_rate, &self.config.ladder).await?;
        Ok(RunSummary::Ladder(report))
    }
}
