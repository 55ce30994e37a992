//! Presentation layer.
//!
//! Report events are produced by the runner and rendered by a sink. The
//! events carry fetched data only; formatting lives entirely in the sinks.

mod json;
mod text;

pub use json::JsonReport;
pub use text::{write_plan, TextReport};

use crate::classify::StatementKind;
use crate::db::QueryResult;
use crate::error::Result;
use crate::script::RunSummary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Line-oriented console text.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

/// Something that happened while running statements.
#[derive(Debug)]
pub enum ReportEvent<'a> {
    /// A new section starts.
    Section(&'a str),
    /// A free-form line of text.
    Note(&'a str),
    /// Rows returned by a read query, each to be shown after `prefix`.
    Rows {
        prefix: &'a str,
        result: &'a QueryResult,
    },
    /// A write statement was applied.
    Applied {
        kind: StatementKind,
        rows_affected: u64,
    },
    /// The run finished and its transaction (if any) was closed.
    Finished(&'a RunSummary),
}

/// Receives report events and renders them somewhere.
pub trait ReportSink {
    /// Renders one event.
    fn emit(&mut self, event: &ReportEvent<'_>) -> Result<()>;
}

/// Creates the sink for `format`, writing to `out`.
pub fn sink_for<'w, W: Write + 'w>(format: OutputFormat, out: W) -> Box<dyn ReportSink + 'w> {
    match format {
        OutputFormat::Text => Box::new(TextReport::new(out)),
        OutputFormat::Json => Box::new(JsonReport::new(out)),
    }
}
