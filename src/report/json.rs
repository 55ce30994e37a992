//! JSON lines report rendering.

use std::io::Write;

use serde_json::{json, Value as Json};

use super::{ReportEvent, ReportSink};
use crate::error::{ReportError, Result};

/// Renders each event as one JSON object per line.
pub struct JsonReport<W: Write> {
    out: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn event_to_json(event: &ReportEvent<'_>) -> Json {
    match event {
        ReportEvent::Section(title) => json!({ "type": "section", "title": title }),
        ReportEvent::Note(text) => json!({ "type": "note", "text": text }),
        ReportEvent::Rows { prefix, result } => {
            let columns: Vec<&str> = result.columns.iter().map(|c| c.name.as_str()).collect();
            let rows: Vec<Vec<Json>> = result
                .rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_json()).collect())
                .collect();
            json!({
                "type": "rows",
                "prefix": prefix,
                "columns": columns,
                "rows": rows,
                "elapsed_ms": result.execution_time.as_millis() as u64,
            })
        }
        ReportEvent::Applied {
            kind,
            rows_affected,
        } => json!({
            "type": "applied",
            "statement": kind.as_str(),
            "rows_affected": rows_affected,
        }),
        ReportEvent::Finished(summary) => json!({
            "type": "finished",
            "statements": summary.stats.statements,
            "rows_fetched": summary.stats.rows_fetched,
            "rows_affected": summary.stats.rows_affected,
            "completion": summary.completion.as_str(),
            "elapsed_ms": summary.elapsed.as_millis() as u64,
        }),
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn emit(&mut self, event: &ReportEvent<'_>) -> Result<()> {
        let line = serde_json::to_string(&event_to_json(event))
            .map_err(|e| ReportError::internal(format!("Failed to encode report: {e}")))?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}
