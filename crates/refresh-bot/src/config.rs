//! Application configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. the base file (`config/default.toml` unless `--config` is given)
//! 2. an optional `<stem>_local.toml` next to it, meant for credentials
//! 3. `REFRESH__*` environment variables, `__` separating nested keys
//!    (e.g. `REFRESH__CREDENTIALS__SECRET`)

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use refresh_core::StalePolicy;
use refresh_engine::EngineConfig;
use refresh_exchange::{ClientConfig, Credentials};
use refresh_persistence::TIMESTAMP_PLACEHOLDER;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Default base configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "REFRESH";

/// Sell-ladder sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct LadderConfig {
    /// Number of rungs. Default: 5.
    #[serde(default = "default_number_of_cycles")]
    pub number_of_cycles: u32,
    /// Fraction of the running quantity removed before each rung. Default: 0.1.
    #[serde(default = "default_rake")]
    pub rake: Decimal,
    /// Rate multiplier applied before each rung. Default: 1.1.
    #[serde(default = "default_cycle_multiplier")]
    pub cycle_multiplier: Decimal,
    /// Quote side of the ladder market (`{quote}-{coin}`). Default: BTC.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
}

fn default_number_of_cycles() -> u32 {
    5
}

fn default_rake() -> Decimal {
    Decimal::new(1, 1)
}

fn default_cycle_multiplier() -> Decimal {
    Decimal::new(11, 1)
}

fn default_quote_currency() -> String {
    "BTC".to_string()
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            number_of_cycles: default_number_of_cycles(),
            rake: default_rake(),
            cycle_multiplier: default_cycle_multiplier(),
            quote_currency: default_quote_currency(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// API key pair.
    pub credentials: Credentials,

    /// Delay between status checks and create retries (ms). Default: 2000.
    #[serde(default = "default_retry_period_ms")]
    pub retry_period_ms: u64,

    /// Orders in flight at once. Default: 4.
    #[serde(default = "default_concurrent_tasks")]
    pub concurrent_tasks: usize,

    /// Orders older than this many days are replaced. Default: 21.
    #[serde(default = "default_max_order_age_days")]
    pub max_order_age_days: f64,

    /// Replace every open order regardless of age.
    #[serde(default)]
    pub replace_all_orders: bool,

    /// Replace only a random share of the stale orders each run.
    #[serde(default)]
    pub percent_to_replace_each_run: Option<f64>,

    /// Backup path template; `{timestamp}` is replaced by the UTC run time.
    #[serde(default = "default_backup_file")]
    pub backup_file: String,

    #[serde(default)]
    pub exchange: ClientConfig,

    #[serde(default)]
    pub ladder: LadderConfig,
}

fn default_retry_period_ms() -> u64 {
    2000
}

fn default_concurrent_tasks() -> usize {
    4
}

fn default_max_order_age_days() -> f64 {
    21.0
}

fn default_backup_file() -> String {
    "backups/open-orders-{timestamp}.json".to_string()
}

impl AppConfig {
    /// Load `path`, its local override, and the environment.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let config: Self = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(true))
            .add_source(File::from(local_override_path(path)).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without consulting other sources.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Self = Config::builder()
            .add_source(File::from_str(content, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !self.credentials.is_complete() {
            return Err(AppError::Config(
                "credentials.key and credentials.secret are required".to_string(),
            ));
        }
        if !self.backup_file.contains(TIMESTAMP_PLACEHOLDER) {
            return Err(AppError::Config(format!(
                "backup_file must contain {TIMESTAMP_PLACEHOLDER}"
            )));
        }
        if self.ladder.rake < Decimal::ZERO || self.ladder.rake >= Decimal::ONE {
            return Err(AppError::Config(format!(
                "ladder.rake must be in [0, 1), got {}",
                self.ladder.rake
            )));
        }
        if self.ladder.cycle_multiplier <= Decimal::ZERO {
            return Err(AppError::Config(format!(
                "ladder.cycle_multiplier must be positive, got {}",
                self.ladder.cycle_multiplier
            )));
        }
        self.stale_policy().validate()?;
        self.engine_config().validate()?;
        Ok(())
    }

    pub fn stale_policy(&self) -> StalePolicy {
        StalePolicy {
            max_order_age_days: self.max_order_age_days,
            replace_all_orders: self.replace_all_orders,
            percent_to_replace_each_run: self.percent_to_replace_each_run,
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            retry_period: Duration::from_millis(self.retry_period_ms),
            concurrent_tasks: self.concurrent_tasks,
        }
    }
}

/// `config/default.toml` -> `config/default_local.toml`.
pub fn local_override_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{stem}_local.{}", ext.to_string_lossy()),
        None => format!("{stem}_local"),
    };
    path.with_file_name(file_name)
}
