//! Reporting core
//!
//! Window computation, query construction, record transformation and the
//! spreadsheet artifact writer.

pub mod artifact;
pub mod period;
pub mod query;
pub mod transform;

pub use artifact::{write_report, ArtifactError, HEADER, SHEET_NAME};
pub use period::{compute_window, ReportingWindow, MONTH_SPLIT_DAY};
pub use query::{EventQuery, DAY_END, DAY_START};
pub use transform::{
    transform, ReportRow, TransformError, TransformOutcome, ATTR_EVENT_DATE, ATTR_FULL_NAME,
    ATTR_SUBDIVISION,
};
