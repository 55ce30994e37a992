//! Running the health-report plan.
//!
//! A run opens a transaction according to the [`TransactionMode`], executes
//! every step in order through a [`QueryRunner`] and closes the transaction.
//! The first failing statement aborts the run; an open transaction is rolled
//! back before the error is returned.

pub mod plan;
pub mod statements;

pub use plan::{health_report_plan, Section, Step};
pub use statements::Sql;

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::{DatabaseBackend, DatabaseClient};
use crate::error::Result;
use crate::query::{QueryRunner, RunStats};
use crate::report::{ReportEvent, ReportSink};

/// How statements of a run are grouped into transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionMode {
    /// One transaction around the whole run, committed at the end.
    #[default]
    Single,
    /// Every statement commits on its own.
    Autocommit,
    /// One transaction around the whole run, rolled back at the end.
    DryRun,
}

impl TransactionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Autocommit => "autocommit",
            Self::DryRun => "dry-run",
        }
    }

    /// Returns true if the run is wrapped in a transaction.
    pub fn is_transactional(&self) -> bool {
        !matches!(self, Self::Autocommit)
    }
}

impl std::str::FromStr for TransactionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(Self::Single),
            "autocommit" => Ok(Self::Autocommit),
            "dry-run" | "dryrun" => Ok(Self::DryRun),
            _ => Err(format!(
                "Invalid transaction mode: {s}. Expected: single, autocommit or dry-run"
            )),
        }
    }
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a finished run left the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Committed,
    RolledBack,
    Autocommitted,
}

impl Completion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::RolledBack => "rolled-back",
            Self::Autocommitted => "autocommitted",
        }
    }
}

/// Totals of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stats: RunStats,
    pub completion: Completion,
    pub elapsed: Duration,
}

/// Runs every section of `plan` in order.
pub async fn run_plan(
    db: &mut dyn DatabaseClient,
    plan: &[Section],
    mode: TransactionMode,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    let backend = db.backend();
    let start = Instant::now();
    let mut runner = QueryRunner::new(db);

    open(&mut runner, mode).await?;
    let outcome = run_sections(&mut runner, plan, backend, sink).await;

    finish(runner, mode, outcome, start, sink).await
}

async fn run_sections(
    runner: &mut QueryRunner<'_>,
    plan: &[Section],
    backend: DatabaseBackend,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    for section in plan {
        info!("Running section: {}", section.title);
        sink.emit(&ReportEvent::Section(section.title))?;
        for step in &section.steps {
            match step {
                Step::Note(text) => sink.emit(&ReportEvent::Note(text))?,
                Step::Statement { sql, prefix } => {
                    runner.run(sql.text(backend), prefix, sink).await?;
                }
            }
        }
    }
    Ok(())
}

/// Runs ad-hoc statements, printing returned rows after `prefix`.
pub async fn run_statements(
    db: &mut dyn DatabaseClient,
    statements: &[String],
    prefix: &str,
    mode: TransactionMode,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    let start = Instant::now();
    let mut runner = QueryRunner::new(db);

    open(&mut runner, mode).await?;
    let outcome = runner.run_all(statements, prefix, sink).await.map(|_| ());

    finish(runner, mode, outcome, start, sink).await
}

async fn open(runner: &mut QueryRunner<'_>, mode: TransactionMode) -> Result<()> {
    if mode.is_transactional() {
        runner.begin().await?;
    }
    Ok(())
}

async fn finish(
    mut runner: QueryRunner<'_>,
    mode: TransactionMode,
    outcome: Result<()>,
    start: Instant,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    if let Err(e) = outcome {
        if runner.in_transaction() {
            if let Err(rollback_err) = runner.rollback().await {
                warn!("Rollback after failure also failed: {}", rollback_err);
            } else {
                info!("Transaction rolled back");
            }
        }
        return Err(e);
    }

    let completion = match mode {
        TransactionMode::Single => {
            runner.commit().await?;
            Completion::Committed
        }
        TransactionMode::DryRun => {
            runner.rollback().await?;
            Completion::RolledBack
        }
        TransactionMode::Autocommit => Completion::Autocommitted,
    };

    let summary = RunSummary {
        stats: runner.stats(),
        completion,
        elapsed: start.elapsed(),
    };
    info!(
        "Run {} after {} statements in {:?}",
        completion.as_str(),
        summary.stats.statements,
        summary.elapsed
    );
    sink.emit(&ReportEvent::Finished(&summary))?;
    Ok(summary)
}
