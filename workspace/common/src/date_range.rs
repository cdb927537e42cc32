use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    /// First day of the range (inclusive)
    pub start: NaiveDate,
    /// Last day of the range (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Fills in missing bounds: `end` defaults to `today` and `start` defaults to
    /// `today - default_days`. Explicit bounds are kept as given.
    ///
    /// Negative windows count as zero days; windows reaching past the calendar
    /// start at [`NaiveDate::MIN`].
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
        default_days: i64,
    ) -> Self {
        let start = from.unwrap_or_else(|| {
            Duration::try_days(default_days.max(0))
                .and_then(|window| today.checked_sub_signed(window))
                .unwrap_or(NaiveDate::MIN)
        });
        let end = to.unwrap_or(today);
        tracing::trace!("Resolved date range {} ..= {}", start, end);
        Self { start, end }
    }

    /// A range whose start lies after its end contains no days.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
