//! Plain-text report rendering.

use std::io::Write;

use super::{ReportEvent, ReportSink};
use crate::db::{format_row, DatabaseBackend};
use crate::error::Result;
use crate::script::{Section, Step};

/// Renders events as console lines.
///
/// Sections get a `--- title ---` header with a blank line before every
/// header but the first. Each row is printed as its prefix immediately
/// followed by `(v1, v2, ...)`.
pub struct TextReport<W: Write> {
    out: W,
    sections: usize,
}

impl<W: Write> TextReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, sections: 0 }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn emit(&mut self, event: &ReportEvent<'_>) -> Result<()> {
        match event {
            ReportEvent::Section(title) => {
                if self.sections > 0 {
                    writeln!(self.out)?;
                }
                self.sections += 1;
                writeln!(self.out, "--- {title} ---")?;
            }
            ReportEvent::Note(text) => writeln!(self.out, "{text}")?,
            ReportEvent::Rows { prefix, result } => {
                for row in &result.rows {
                    writeln!(self.out, "{prefix}{}", format_row(row))?;
                }
            }
            // Writes show up through the reads around them.
            ReportEvent::Applied { .. } | ReportEvent::Finished(_) => {}
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Writes the plan as it would run on `backend`, without executing it.
pub fn write_plan<W: Write>(out: &mut W, plan: &[Section], backend: DatabaseBackend) -> Result<()> {
    for (i, section) in plan.iter().enumerate() {
        if i > 0 {
            writeln!(out)?;
        }
        writeln!(out, "--- {} ---", section.title)?;
        for step in &section.steps {
            match step {
                Step::Note(text) => writeln!(out, "-- {}", text.trim())?,
                Step::Statement { sql, .. } => writeln!(out, "{};", sql.text(backend))?,
            }
        }
    }
    Ok(())
}
