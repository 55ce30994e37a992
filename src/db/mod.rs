//! Database abstraction layer for healthreport.
//!
//! Provides a trait-based interface over a single scoped connection, so the
//! statement runner works the same against PostgreSQL and SQLite.

mod postgres;
mod sqlite;
mod types;

pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{format_row, ColumnInfo, QueryResult, Row, Value};

use crate::config::ConnectionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creates a database client for the given backend and configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseClient>> {
    match config.backend {
        DatabaseBackend::Postgres => {
            let client = PostgresClient::connect(config).await?;
            Ok(Box::new(client))
        }
        DatabaseBackend::Sqlite => {
            let client = SqliteClient::connect(config).await?;
            Ok(Box::new(client))
        }
    }
}

/// Trait defining the interface for database clients.
///
/// A client owns exactly one connection. While a transaction is open every
/// statement runs inside it; otherwise each statement commits on its own.
#[async_trait]
pub trait DatabaseClient: Send {
    /// Returns the backend this client talks to.
    fn backend(&self) -> DatabaseBackend;

    /// Executes a statement and materializes every row it returns.
    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Executes a statement that returns no rows, yielding rows affected.
    async fn execute_statement(&mut self, sql: &str) -> Result<u64>;

    /// Executes a batch of `;`-separated statements (seed files, fixtures).
    async fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Opens a transaction on the connection.
    async fn begin(&mut self) -> Result<()>;

    /// Commits the open transaction.
    async fn commit(&mut self) -> Result<()>;

    /// Rolls back the open transaction.
    async fn rollback(&mut self) -> Result<()>;

    /// Returns true while a transaction is open.
    fn in_transaction(&self) -> bool;

    /// Closes the connection. An open transaction is rolled back first.
    async fn close(&mut self) -> Result<()>;
}
