//! Statement execution with optional reporting.
//!
//! `QueryRunner` classifies each statement, fetches the rows of read
//! queries and executes writes. Fetching is kept separate from rendering:
//! `fetch`/`execute` return data, `run` hands it to a report sink.

use std::time::Instant;

use tracing::{debug, info};

use crate::classify::{SqlClassifier, StatementKind};
use crate::db::{DatabaseClient, QueryResult};
use crate::error::Result;
use crate::report::{ReportEvent, ReportSink};

/// What a statement produced.
#[derive(Debug, Clone)]
pub enum StatementOutcome {
    /// Rows returned by a read query, fully materialized.
    Rows(QueryResult),
    /// A write was applied.
    Applied {
        kind: StatementKind,
        rows_affected: u64,
    },
    /// Multi-statement text, one outcome per statement in order.
    Batch(Vec<StatementOutcome>),
}

/// Running totals over every statement a runner executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub statements: usize,
    pub rows_fetched: usize,
    pub rows_affected: u64,
}

/// Executes statements one at a time on a single connection.
pub struct QueryRunner<'a> {
    db: &'a mut dyn DatabaseClient,
    classifier: SqlClassifier,
    stats: RunStats,
}

impl<'a> QueryRunner<'a> {
    /// Creates a runner over an open connection.
    pub fn new(db: &'a mut dyn DatabaseClient) -> Self {
        let classifier = SqlClassifier::new(db.backend());
        Self {
            db,
            classifier,
            stats: RunStats::default(),
        }
    }

    /// Returns the totals so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Executes a read query and returns every row.
    pub async fn fetch(&mut self, sql: &str) -> Result<QueryResult> {
        let result = self.db.execute_query(sql).await?;
        self.stats.statements += 1;
        self.stats.rows_fetched += result.row_count;
        debug!(
            "Fetched {} rows in {:?}",
            result.row_count, result.execution_time
        );
        Ok(result)
    }

    /// Classifies and executes SQL text without rendering anything.
    ///
    /// Multi-statement text runs one statement at a time so that every
    /// statement keeps its own rows and row count.
    pub async fn execute(&mut self, sql: &str) -> Result<StatementOutcome> {
        let kind = self.classifier.classify(sql);
        if kind != StatementKind::Batch {
            return self.execute_one(sql, kind).await;
        }

        let parts = self.classifier.split(sql);
        debug!("Running batch of {} statements", parts.len());
        let mut outcomes = Vec::with_capacity(parts.len());
        for part in &parts {
            let kind = self.classifier.classify(part);
            outcomes.push(self.execute_one(part, kind).await?);
        }
        Ok(StatementOutcome::Batch(outcomes))
    }

    async fn execute_one(&mut self, sql: &str, kind: StatementKind) -> Result<StatementOutcome> {
        if kind.returns_rows() {
            return Ok(StatementOutcome::Rows(self.fetch(sql).await?));
        }

        let start = Instant::now();
        let rows_affected = self.db.execute_statement(sql).await?;
        self.stats.statements += 1;
        self.stats.rows_affected += rows_affected;
        info!(
            "{kind} applied ({rows_affected} rows affected) in {:?}",
            start.elapsed()
        );

        Ok(StatementOutcome::Applied {
            kind,
            rows_affected,
        })
    }

    /// Executes one statement and reports its rows, each after `prefix`.
    pub async fn run(
        &mut self,
        sql: &str,
        prefix: &str,
        sink: &mut dyn ReportSink,
    ) -> Result<StatementOutcome> {
        let outcome = self.execute(sql).await?;
        report_outcome(&outcome, prefix, sink)?;
        Ok(outcome)
    }

    /// Runs statements in order; the first failure aborts the rest.
    pub async fn run_all<S: AsRef<str>>(
        &mut self,
        statements: &[S],
        prefix: &str,
        sink: &mut dyn ReportSink,
    ) -> Result<Vec<StatementOutcome>> {
        let mut outcomes = Vec::with_capacity(statements.len());
        for sql in statements {
            outcomes.push(self.run(sql.as_ref(), prefix, sink).await?);
        }
        Ok(outcomes)
    }

    /// Opens a transaction on the underlying connection.
    pub async fn begin(&mut self) -> Result<()> {
        self.db.begin().await
    }

    /// Commits the open transaction.
    pub async fn commit(&mut self) -> Result<()> {
        self.db.commit().await
    }

    /// Rolls back the open transaction.
    pub async fn rollback(&mut self) -> Result<()> {
        self.db.rollback().await
    }

    /// Returns true while a transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.db.in_transaction()
    }
}

fn report_outcome(
    outcome: &StatementOutcome,
    prefix: &str,
    sink: &mut dyn ReportSink,
) -> Result<()> {
    match outcome {
        StatementOutcome::Rows(result) => sink.emit(&ReportEvent::Rows { prefix, result }),
        StatementOutcome::Applied {
            kind,
            rows_affected,
        } => sink.emit(&ReportEvent::Applied {
            kind: *kind,
            rows_affected: *rows_affected,
        }),
        StatementOutcome::Batch(outcomes) => outcomes
            .iter()
            .try_for_each(|outcome| report_outcome(outcome, prefix, sink)),
    }
}
