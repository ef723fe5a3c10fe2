//! Event query construction
//!
//! Builds the immutable request description sent to the access-control
//! server: the reporting window, the fixed full-day time bounds and the
//! opaque resource/event-type filters supplied by configuration.

use super::period::ReportingWindow;
use serde::Serialize;

/// Start-of-day bound applied to every day in the window.
pub const DAY_START: &str = "00:00:00";

/// End-of-day bound applied to every day in the window.
pub const DAY_END: &str = "23:59:59";

/// Date format used for period boundaries on the wire.
const PERIOD_FORMAT: &str = "%d.%m.%Y";

/// A fully determined event query. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventQuery {
    window: ReportingWindow,
    start_time: &'static str,
    end_time: &'static str,
    resource_id: String,
    event_type_id: String,
}

impl EventQuery {
    /// Build a query for the given window and filters.
    ///
    /// `resource_id` and `event_type_id` are opaque identifiers owned by the
    /// caller's configuration; their content is not validated here.
    pub fn new(
        window: ReportingWindow,
        resource_id: impl Into<String>,
        event_type_id: impl Into<String>,
    ) -> Self {
        Self {
            window,
            start_time: DAY_START,
            end_time: DAY_END,
            resource_id: resource_id.into(),
            event_type_id: event_type_id.into(),
        }
    }

    /// The reporting window this query covers.
    pub fn window(&self) -> ReportingWindow {
        self.window
    }

    /// First day of the period, formatted for the wire (`dd.mm.yyyy`).
    pub fn begin_period(&self) -> String {
        self.window.start.format(PERIOD_FORMAT).to_string()
    }

    /// Last day of the period, formatted for the wire (`dd.mm.yyyy`).
    pub fn end_period(&self) -> String {
        self.window.end.format(PERIOD_FORMAT).to_string()
    }

    /// Daily start-of-day time bound.
    pub fn start_time(&self) -> &'static str {
        self.start_time
    }

    /// Daily end-of-day time bound.
    pub fn end_time(&self) -> &'static str {
        self.end_time
    }

    /// Opaque identifier of the monitored resource.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Opaque identifier of the event type to report on.
    pub fn event_type_id(&self) -> &str {
        &self.event_type_id
    }
}
