//! Open-order backup snapshots.
//!
//! A snapshot of the account's limit orders is written before anything is
//! cancelled, as a pretty-printed JSON array named by a UTC timestamp. The
//! same file can later be fed to restore mode.

pub mod backup;
pub mod error;

pub use backup::{read_backup, BackupStore, TIMESTAMP_PLACEHOLDER};
pub use error::{PersistenceError, PersistenceResult};
