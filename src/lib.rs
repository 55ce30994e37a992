//! healthreport - runs a fixed battery of health-report SQL statements.
//!
//! This library exposes the core modules for use in integration tests.

pub mod classify;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod query;
pub mod report;
pub mod script;
