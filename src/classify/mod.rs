//! Statement classification.
//!
//! Parses SQL and decides whether a statement returns rows (and must be
//! fetched and printed) or only changes the database.

mod parser;

pub use parser::{classify_sql, SqlClassifier};

use std::fmt;

/// The kind of SQL statement detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    /// SELECT, WITH, VALUES, EXPLAIN, SHOW, PRAGMA and writes with RETURNING.
    Query,
    Insert,
    Update,
    Delete,
    CreateIndex,
    CreateView,
    /// Any other schema change (CREATE TABLE, DROP, ALTER, TRUNCATE).
    Ddl,
    /// Several statements in one text; each runs on its own.
    Batch,
    /// Statement type could not be determined.
    Unknown,
}

impl StatementKind {
    /// Returns true if the statement produces a result set to print.
    ///
    /// Unknown statements are fetched too, so whatever they return is shown.
    pub fn returns_rows(&self) -> bool {
        matches!(self, Self::Query | Self::Unknown)
    }

    /// Returns the kind as a short uppercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "QUERY",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::CreateIndex => "CREATE INDEX",
            Self::CreateView => "CREATE VIEW",
            Self::Ddl => "DDL",
            Self::Batch => "BATCH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
