//! Query result types for healthreport.
//!
//! Defines the structures used to represent rows fetched from the database.

use base64::Engine as _;
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::time::Duration;

/// Represents the fully materialized result of a row-returning statement.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Rows of data, in the order the database returned them.
    pub rows: Vec<Row>,

    /// Time taken to execute the statement.
    pub execution_time: Duration,

    /// Number of rows in the result.
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<ColumnInfo>, rows: Vec<Row>) -> Self {
        let row_count = rows.len();
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
            row_count,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the index of the named column, ignoring ASCII case.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Returns every value of the named column, in row order.
    pub fn column_values(&self, name: &str) -> Vec<&Value> {
        match self.column_index(name) {
            Some(i) => self.rows.iter().filter_map(|row| row.get(i)).collect(),
            None => Vec::new(),
        }
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Column data type as reported by the driver.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single value from a database query.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Floating point number.
    Float(f64),

    /// Arbitrary precision number (Postgres NUMERIC, AVG/SUM results).
    Decimal(BigDecimal),

    /// Text/string value.
    String(String),

    /// Calendar date.
    Date(NaiveDate),

    /// Date and time without zone (timestamptz is normalized to UTC).
    Timestamp(NaiveDateTime),

    /// Binary data.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as an integer, if it holds one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Converts the value to its textual representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }

    /// Converts the value to JSON.
    ///
    /// Decimals are emitted as strings to keep their precision; bytes are
    /// base64 encoded.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(_) | Value::Timestamp(_) => {
                serde_json::Value::String(self.to_display_string())
            }
            Value::Bytes(b) => serde_json::Value::String(
                base64::engine::general_purpose::STANDARD.encode(b),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// Formats a row as `(v1, v2, ...)` in declared column order.
pub fn format_row(row: &[Value]) -> String {
    let cells: Vec<String> = row.iter().map(Value::to_display_string).collect();
    format!("({})", cells.join(", "))
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}
