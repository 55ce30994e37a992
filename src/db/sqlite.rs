//! SQLite database client implementation.
//!
//! Mirrors `PostgresClient` for SQLite files and in-memory databases. Used
//! for local runs and for the fixture-backed tests.

use crate::config::ConnectionConfig;
use crate::db::{ColumnInfo, DatabaseBackend, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Row as SqlxRow, Sqlite, Transaction, TypeInfo, ValueRef};
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing::debug;

/// SQLite database client holding a single connection.
pub struct SqliteClient {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteClient {
    /// Creates a new SqliteClient from an existing connection pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool, tx: None }
    }

    /// Opens the database file (or `:memory:`) named by `config`.
    ///
    /// The pool keeps its single connection alive for the client's whole
    /// lifetime, otherwise an in-memory database would vanish between
    /// statements.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        debug!("Opening {}", conn_str);

        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| ReportError::config(format!("Invalid database path: {e}")))?
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| ReportError::connection(format!("Failed to open {conn_str}: {e}")))?;

        Ok(Self::from_pool(pool))
    }

    /// Opens a private in-memory database.
    pub async fn in_memory() -> Result<Self> {
        Self::connect(&ConnectionConfig::sqlite(":memory:")).await
    }
}

#[async_trait]
impl DatabaseClient for SqliteClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Sqlite
    }

    async fn execute_query(&mut self, sql: &str) -> Result<QueryResult> {
        let start = Instant::now();

        let query = sqlx::query(sql);
        let result = match self.tx.as_mut() {
            Some(tx) => query.fetch_all(&mut **tx).await,
            None => query.fetch_all(&self.pool).await,
        }
        .map_err(|e| ReportError::query(format_query_error(e)))?;

        let execution_time = start.elapsed();

        let columns: Vec<ColumnInfo> = result
            .first()
            .map(|first_row| {
                first_row
                    .columns()
                    .iter()
                    .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<Row> = result.iter().map(convert_row).collect();

        Ok(QueryResult::with_data(columns, rows).with_execution_time(execution_time))
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<u64> {
        let query = sqlx::query(sql);
        let done = match self.tx.as_mut() {
            Some(tx) => query.execute(&mut **tx).await,
            None => query.execute(&self.pool).await,
        }
        .map_err(|e| ReportError::query(format_query_error(e)))?;

        Ok(done.rows_affected())
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        let batch = sqlx::raw_sql(sql);
        let done = match self.tx.as_mut() {
            Some(tx) => sqlx::Executor::execute(&mut **tx, batch).await,
            None => sqlx::Executor::execute(&self.pool, batch).await,
        };
        done.map_err(|e| ReportError::query(format_query_error(e)))?;
        Ok(())
    }

    async fn begin(&mut self) -> Result<()> {
        if self.tx.is_some() {
            return Err(ReportError::internal("Transaction already open"));
        }
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ReportError::connection(format!("Failed to begin transaction: {e}")))?;
        self.tx = Some(tx);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| ReportError::internal("No transaction to commit"))?;
        tx.commit()
            .await
            .map_err(|e| ReportError::query(format_query_error(e)))
    }

    async fn rollback(&mut self) -> Result<()> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| ReportError::internal("No transaction to roll back"))?;
        tx.rollback()
            .await
            .map_err(|e| ReportError::query(format_query_error(e)))
    }

    fn in_transaction(&self) -> bool {
        self.tx.is_some()
    }

    async fn close(&mut self) -> Result<()> {
        if self.tx.is_some() {
            self.rollback().await?;
        }
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow) -> Row {
    (0..row.columns().len())
        .map(|i| convert_value(row, i))
        .collect()
}

/// Converts a single value using its storage class.
///
/// SQLite types values, not columns, so the declared column type is ignored
/// and the runtime storage class picks the decoding.
fn convert_value(row: &SqliteRow, index: usize) -> Value {
    let storage_class = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_uppercase(),
        Err(e) => {
            debug!("Cannot read column {index}: {e}");
            return Value::Null;
        }
    };

    match storage_class.as_str() {
        "INTEGER" | "INT8" | "BIGINT" => row
            .try_get::<i64, _>(index)
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "REAL" | "FLOAT" | "DOUBLE" => row
            .try_get::<f64, _>(index)
            .map(Value::Float)
            .unwrap_or(Value::Null),

        "BOOLEAN" => row
            .try_get::<bool, _>(index)
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "BLOB" => row
            .try_get::<Vec<u8>, _>(index)
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        _ => row
            .try_get::<String, _>(index)
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Formats a statement error, keeping the SQLite message as-is.
fn format_query_error(error: sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => format!("ERROR: {}", db_error.message()),
        None => error.to_string(),
    }
}
