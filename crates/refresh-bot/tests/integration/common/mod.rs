//! Shared fixtures for integration tests.

pub mod backup_watch;
pub mod fixtures;
