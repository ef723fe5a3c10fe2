//! Event record transformation
//!
//! Maps raw event records into normalized report rows. Extraction is
//! tolerant per record: an event missing a required attribute is skipped and
//! counted, never fatal for the batch. An entirely empty input is reported
//! as [`TransformError::NoData`] so the run does not silently produce a
//! header-only artifact.

use crate::connector::RawEventRecord;
use thiserror::Error;
use tracing::warn;

/// Attribute carrying the person's full name.
pub const ATTR_FULL_NAME: &str = "f_fio";

/// Attribute carrying the event timestamp.
pub const ATTR_EVENT_DATE: &str = "f_date_ev";

/// Attribute carrying the subdivision/department name.
pub const ATTR_SUBDIVISION: &str = "f_name_subdiv";

/// A normalized, display-ready report row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Person's full name
    pub full_name: String,
    /// Event timestamp, as reported by the server
    pub event_date: String,
    /// Subdivision the person belongs to
    pub subdivision: String,
}

/// Transformation result: the retained rows plus how many records were
/// dropped for missing attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutcome {
    /// Report rows, in input order of the retained records
    pub rows: Vec<ReportRow>,
    /// Number of records skipped because a required attribute was absent
    pub skipped: usize,
}

/// Batch-level transformation failures.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The retrieval produced no event records at all
    #[error("no event records were retrieved for the reporting window")]
    NoData,
}

fn row_from_record(record: &RawEventRecord) -> Option<ReportRow> {
    Some(ReportRow {
        full_name: record.attr(ATTR_FULL_NAME)?.to_string(),
        event_date: record.attr(ATTR_EVENT_DATE)?.to_string(),
        subdivision: record.attr(ATTR_SUBDIVISION)?.to_string(),
    })
}

/// Transform retrieved records into report rows.
///
/// Row order is the input order of the records that survive extraction.
pub fn transform(records: &[RawEventRecord]) -> Result<TransformOutcome, TransformError> {
    if records.is_empty() {
        return Err(TransformError::NoData);
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut skipped = 0usize;
    for (index, record) in records.iter().enumerate() {
        match row_from_record(record) {
            Some(row) => rows.push(row),
            None => {
                skipped += 1;
                warn!(index, "skipping event record with missing attributes");
            }
        }
    }

    Ok(TransformOutcome { rows, skipped })
}
