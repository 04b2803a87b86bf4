//! Backup snapshot writer and reader.
//!
//! Writes are synchronous and flushed to disk before returning, so a crash
//! during the cancel phase still leaves a complete recovery file.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use refresh_core::time::backup_stamp;
use refresh_core::Order;
use tracing::{debug, info};

use crate::error::{PersistenceError, PersistenceResult};

/// Placeholder replaced by the UTC stamp in the backup file template.
pub const TIMESTAMP_PLACEHOLDER: &str = "{timestamp}";

/// Writes timestamped snapshots of open orders.
#[derive(Debug, Clone)]
pub struct BackupStore {
    template: String,
}

impl BackupStore {
    /// Create a store for `template`, which must contain `{timestamp}`.
    pub fn new(template: impl Into<String>) -> PersistenceResult<Self> {
        let template = template.into();
        if !template.contains(TIMESTAMP_PLACEHOLDER) {
            return Err(PersistenceError::InvalidTemplate(format!(
                "'{template}' has no {TIMESTAMP_PLACEHOLDER} placeholder"
            )));
        }
        Ok(Self { template })
    }

    /// Path of the snapshot taken at `now`.
    pub fn path_for(&self, now: DateTime<Utc>) -> PathBuf {
        PathBuf::from(
            self.template
                .replace(TIMESTAMP_PLACEHOLDER, &backup_stamp(now)),
        )
    }

    /// Write `orders` to the snapshot for `now` and return its path.
    pub fn write(&self, orders: &[Order], now: DateTime<Utc>) -> PersistenceResult<PathBuf> {
        let path = self.path_for(now);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let file = File::create(&path).map_err(|source| io_error(&path, source))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, orders).map_err(|source| {
            PersistenceError::Json {
                path: path.display().to_string(),
                source,
            }
        })?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|source| io_error(&path, source))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|source| io_error(&path, source))?;

        info!(path = %path.display(), orders = orders.len(), "Backup written");
        Ok(path)
    }
}

/// Read a snapshot written by `BackupStore::write`.
pub fn read_backup(path: impl AsRef<Path>) -> PersistenceResult<Vec<Order>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let orders: Vec<Order> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| PersistenceError::Json {
            path: path.display().to_string(),
            source,
        })?;

    debug!(path = %path.display(), orders = orders.len(), "Backup read");
    Ok(orders)
}

fn io_error(path: &Path, source: std::io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.display().to_string(),
        source,
    }
}
