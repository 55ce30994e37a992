//! SQL parsing and classification logic.
//!
//! Uses sqlparser-rs with the backend's dialect. Text the parser rejects
//! (vendor syntax such as SQLite `GLOB`) falls back to its leading keywords.

use sqlparser::ast::Statement;
use sqlparser::dialect::{Dialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use tracing::debug;

use crate::db::DatabaseBackend;

use super::StatementKind;

/// SQL classifier bound to one backend's dialect.
#[derive(Debug)]
pub struct SqlClassifier {
    backend: DatabaseBackend,
}

impl SqlClassifier {
    /// Creates a classifier for the given backend.
    pub fn new(backend: DatabaseBackend) -> Self {
        Self { backend }
    }

    /// Classifies a SQL string.
    pub fn classify(&self, sql: &str) -> StatementKind {
        match self.parse(sql) {
            Some(statements) if statements.len() > 1 => StatementKind::Batch,
            Some(statements) => statements
                .first()
                .map(classify_statement)
                .unwrap_or(StatementKind::Unknown),
            None => classify_by_keyword(sql),
        }
    }

    /// Splits multi-statement text into its statements, re-rendered by the
    /// parser. Text the parser rejects comes back whole.
    pub fn split(&self, sql: &str) -> Vec<String> {
        match self.parse(sql) {
            Some(statements) if !statements.is_empty() => {
                statements.iter().map(ToString::to_string).collect()
            }
            _ => vec![sql.to_string()],
        }
    }

    fn parse(&self, sql: &str) -> Option<Vec<Statement>> {
        match self.backend {
            DatabaseBackend::Postgres => parse_with(&PostgreSqlDialect {}, sql),
            DatabaseBackend::Sqlite => parse_with(&SQLiteDialect {}, sql),
        }
    }
}

/// Convenience function to classify SQL without creating a classifier instance.
pub fn classify_sql(sql: &str, backend: DatabaseBackend) -> StatementKind {
    SqlClassifier::new(backend).classify(sql)
}

fn parse_with(dialect: &dyn Dialect, sql: &str) -> Option<Vec<Statement>> {
    match Parser::parse_sql(dialect, sql) {
        Ok(statements) => Some(statements),
        Err(e) => {
            debug!("SQL parse error, falling back to keywords: {e}");
            None
        }
    }
}

/// Classifies a single parsed statement.
fn classify_statement(statement: &Statement) -> StatementKind {
    match statement {
        Statement::Query { .. }
        | Statement::Explain { .. }
        | Statement::ExplainTable { .. }
        | Statement::ShowTables { .. }
        | Statement::ShowColumns { .. }
        | Statement::ShowVariable { .. }
        | Statement::Pragma { .. } => StatementKind::Query,

        // Writes with RETURNING hand rows back like a query.
        Statement::Insert(insert) if insert.returning.is_some() => StatementKind::Query,
        Statement::Update {
            returning: Some(_), ..
        } => StatementKind::Query,
        Statement::Delete(delete) if delete.returning.is_some() => StatementKind::Query,

        Statement::Insert { .. } => StatementKind::Insert,
        Statement::Update { .. } => StatementKind::Update,
        Statement::Delete { .. } => StatementKind::Delete,
        Statement::CreateIndex { .. } => StatementKind::CreateIndex,
        Statement::CreateView { .. } => StatementKind::CreateView,

        Statement::CreateTable { .. }
        | Statement::Drop { .. }
        | Statement::AlterTable { .. }
        | Statement::Truncate { .. } => StatementKind::Ddl,

        _ => StatementKind::Unknown,
    }
}

/// Classifies by leading keywords when the parser cannot handle the text.
fn classify_by_keyword(sql: &str) -> StatementKind {
    let words: Vec<String> = sql
        .split_whitespace()
        .take(5)
        .map(|w| w.trim_end_matches(';').to_uppercase())
        .collect();

    let Some(first) = words.first() else {
        return StatementKind::Unknown;
    };

    match first.as_str() {
        "SELECT" | "WITH" | "VALUES" | "TABLE" | "EXPLAIN" | "SHOW" | "PRAGMA" => {
            StatementKind::Query
        }
        "INSERT" | "UPDATE" | "DELETE" if has_returning(sql) => StatementKind::Query,
        "INSERT" => StatementKind::Insert,
        "UPDATE" => StatementKind::Update,
        "DELETE" => StatementKind::Delete,
        "CREATE" => {
            let rest: Vec<&str> = words[1..]
                .iter()
                .map(String::as_str)
                .filter(|w| !matches!(*w, "UNIQUE" | "OR" | "REPLACE" | "TEMP" | "TEMPORARY"))
                .collect();
            match rest.first() {
                Some(&"INDEX") => StatementKind::CreateIndex,
                Some(&"VIEW") => StatementKind::CreateView,
                _ => StatementKind::Ddl,
            }
        }
        "DROP" | "ALTER" | "TRUNCATE" => StatementKind::Ddl,
        _ => StatementKind::Unknown,
    }
}

fn has_returning(sql: &str) -> bool {
    sql.split_whitespace()
        .any(|w| w.eq_ignore_ascii_case("RETURNING"))
}
