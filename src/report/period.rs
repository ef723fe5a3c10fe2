//! Reporting window computation
//!
//! This module computes the calendar-month window a report covers from the
//! date the pipeline runs on.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Day of month on which the window switches from the previous month to the
/// current one. Running on the 15th or earlier reports on the month that just
/// ended; running later reports on the month in progress.
pub const MONTH_SPLIT_DAY: u32 = 15;

/// An inclusive calendar-month date range.
///
/// Invariant: `start` is day 1 of its month, `end` is the last day of the
/// same month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingWindow {
    /// First day of the reported month
    pub start: NaiveDate,
    /// Last day of the reported month
    pub end: NaiveDate,
}

impl ReportingWindow {
    /// The full calendar month containing the given year/month.
    fn month_of(year: i32, month: u32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .expect("day 1 exists in every month");
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .expect("day 1 exists in every month")
            .pred_opt()
            .expect("a month start always has a preceding day");
        Self { start, end }
    }
}

/// Compute the reporting window for a run happening on `today`.
///
/// On or before [`MONTH_SPLIT_DAY`] the window is the full previous calendar
/// month (December of the prior year when `today` is in January); afterwards
/// it is the full current calendar month. Total over any valid date.
pub fn compute_window(today: NaiveDate) -> ReportingWindow {
    if today.day() <= MONTH_SPLIT_DAY {
        let (year, month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };
        ReportingWindow::month_of(year, month)
    } else {
        ReportingWindow::month_of(today.year(), today.month())
    }
}
