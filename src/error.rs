//! Error types for healthreport.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for healthreport operations.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Database connection errors (host unreachable, auth failed, etc.)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution errors (syntax errors, constraint violations, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, missing required fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (output failures, unexpected states, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReportError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        Self::Internal(format!("Failed to write report: {e}"))
    }
}

/// Result type alias using ReportError.
pub type Result<T> = std::result::Result<T, ReportError>;
