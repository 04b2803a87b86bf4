//! Integration tests for refresh-bot.
//!
//! These tests run whole modes against the scripted exchange:
//! - Replace runs with backup, selection and cancel/confirm/create
//! - Purge and restore recovery runs
//! - Startup failures

pub mod common;
