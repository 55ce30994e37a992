//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use crate::config::{redact_connection_string, ConnectionConfig};
use crate::db::{ColumnInfo, DatabaseBackend, DatabaseClient, QueryResult, Row, Value};
use crate::error::{ReportError, Result};
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as SqlxColumn, Postgres, Row as SqlxRow, Transaction, TypeInfo};
use std::time::{Duration, Instant};
use tracing::debug;

/// PostgreSQL database client holding a single connection.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresClient {
    /// Creates a new PostgresClient from an existing connection pool.
    ///
    /// This is primarily useful for testing.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool, tx: None }
    }

    /// Connects to the database described by `config`.
    ///
    /// The pool holds exactly one connection for the client's whole
    /// lifetime so every statement shares the same session.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;
        debug!("Connecting to {}", redact_connection_string(&conn_str));

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .acquire_timeout(Duration::from_secs(10))
            .connect(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;

        debug!("Successfully connected to database");
        Ok(Self::from_pool(pool))
    }
}

#[async_trait]
impl DatabaseClient for PostgresClient {
    fn backend(&self) -> DatabaseBackend {
        DatabaseBackend::Postgres
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

        // Column metadata comes from the first row; an empty result has none.
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

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => row
            .try_get::<Option<bool>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),

        "INT2" | "SMALLINT" => row
            .try_get::<Option<i16>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT4" | "INT" | "INTEGER" => row
            .try_get::<Option<i32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),

        "INT8" | "BIGINT" => row
            .try_get::<Option<i64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),

        "FLOAT4" | "REAL" => row
            .try_get::<Option<f32>, _>(index)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64))
            .unwrap_or(Value::Null),

        "FLOAT8" | "DOUBLE PRECISION" => row
            .try_get::<Option<f64>, _>(index)
            .ok()
            .flatten()
            .map(Value::Float)
            .unwrap_or(Value::Null),

        // AVG() and SUM(bigint) come back as NUMERIC
        "NUMERIC" => row
            .try_get::<Option<BigDecimal>, _>(index)
            .ok()
            .flatten()
            .map(Value::Decimal)
            .unwrap_or(Value::Null),

        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .ok()
            .flatten()
            .map(Value::Date)
            .unwrap_or(Value::Null),

        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .ok()
            .flatten()
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),

        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .ok()
            .flatten()
            .map(|ts| Value::Timestamp(ts.naive_utc()))
            .unwrap_or(Value::Null),

        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),

        // TEXT, VARCHAR, BPCHAR, NAME and anything else that decodes as text
        other => match row.try_get::<Option<String>, _>(index) {
            Ok(v) => v.map(Value::String).unwrap_or(Value::Null),
            Err(e) => {
                debug!("Cannot decode column {index} of type {other}: {e}");
                Value::Null
            }
        },
    }
}

/// Maps sqlx connection errors to user-friendly messages.
fn map_connection_error(error: sqlx::Error, config: &ConnectionConfig) -> ReportError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let database = config.database.as_deref().unwrap_or("unknown");

    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ReportError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if error_str.contains("password authentication failed")
        || error_str.contains("authentication failed")
    {
        ReportError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if error_str.contains("does not exist") && error_str.contains("database") {
        ReportError::connection(format!("Database '{database}' does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ReportError::connection(
            "Server requires SSL. Add '?sslmode=require' to connection string.".to_string(),
        )
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ReportError::connection(format!(
            "Connection to {host}:{port} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ReportError::connection(redact_connection_string(&error.to_string()))
    }
}

/// Formats a statement error with Postgres detail fields if available.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = String::from("ERROR: ");
    result.push_str(db_error.message());

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        let fields = [
            ("DETAIL", pg_error.detail()),
            ("HINT", pg_error.hint()),
            ("TABLE", pg_error.table()),
            ("COLUMN", pg_error.column()),
            ("CONSTRAINT", pg_error.constraint()),
        ];
        for (label, value) in fields {
            if let Some(value) = value {
                result.push_str("\n  ");
                result.push_str(label);
                result.push_str(": ");
                result.push_str(value);
            }
        }
    }

    result
}
