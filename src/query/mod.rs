//! Statement execution.

mod runner;

pub use runner::{QueryRunner, RunStats, StatementOutcome};
