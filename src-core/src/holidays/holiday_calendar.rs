use chrono::NaiveDate;

use crate::errors::Result;
use crate::holidays::holidays_model::HolidayRange;

/// Read-only holiday lookup injected into the target service
pub trait HolidayCalendar: Send + Sync {
    /// All ranges overlapping `[start, end]`, in the order they were recorded
    fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<HolidayRange>>;
}

/// The holiday whose multiplier applies to `date`.
///
/// Overlapping ranges resolve to the largest multiplier; on equal
/// multipliers the first range in `holidays` wins.
pub fn strongest_holiday(holidays: &[HolidayRange], date: NaiveDate) -> Option<&HolidayRange> {
    let mut strongest: Option<&HolidayRange> = None;
    for holiday in holidays.iter().filter(|h| h.covers(date)) {
        match strongest {
            Some(current) if holiday.weight_multiplier <= current.weight_multiplier => {}
            _ => strongest = Some(holiday),
        }
    }
    strongest
}
