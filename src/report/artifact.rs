//! Report artifact writer
//!
//! Serializes report rows into the spreadsheet artifact: a single worksheet
//! with a fixed three-column header, overwritten in place on every run.

use super::transform::ReportRow;
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Name of the single worksheet in the artifact.
pub const SHEET_NAME: &str = "Report";

/// Fixed column header of the report.
pub const HEADER: [&str; 3] = ["Full name", "Date", "Subdivision"];

/// Artifact serialization failures.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The workbook could not be assembled or saved
    #[error("failed to write the report artifact: {details}")]
    WriteFailed {
        /// Underlying writer failure
        details: String,
    },
}

impl From<XlsxError> for ArtifactError {
    fn from(error: XlsxError) -> Self {
        ArtifactError::WriteFailed { details: error.to_string() }
    }
}

/// Write `rows` to an xlsx workbook at `path`, replacing any prior artifact.
pub fn write_report(rows: &[ReportRow], path: &Path) -> Result<(), ArtifactError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *title)?;
    }
    for (index, row) in rows.iter().enumerate() {
        let line = (index + 1) as u32;
        sheet.write_string(line, 0, row.full_name.as_str())?;
        sheet.write_string(line, 1, row.event_date.as_str())?;
        sheet.write_string(line, 2, row.subdivision.as_str())?;
    }

    workbook.save(path)?;
    info!(rows = rows.len(), path = %path.display(), "report artifact written");
    Ok(())
}
