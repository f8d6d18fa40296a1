//! Calendar month handling.
//!
//! Targets are scoped to a `YearMonth` ("YYYY-MM"). Every allocation date,
//! holiday lookup and progress window is derived from it.

use chrono::{Datelike, Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

lazy_static! {
    static ref YEAR_MONTH_RE: Regex = Regex::new(r"^(\d{4})-(\d{2})$").unwrap();
}

/// A calendar month without a day component
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, ValidationError> {
        if !(1..=12).contains(&month) {
            return Err(ValidationError::field(
                "yearMonth",
                format!("month {} is out of range", month),
            ));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(ValidationError::field(
                "yearMonth",
                format!("year {} is out of range", year),
            ));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Constructors only admit representable months.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day() - Duration::days(1)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// Every calendar date of the month, in order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let first = self.first_day();
        (0..self.days_in_month() as i64).map(move |offset| first + Duration::days(offset))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Number of days of this month on or before `as_of`.
    /// 0 for a month that has not started, the full month once it is over.
    pub fn days_elapsed(&self, as_of: NaiveDate) -> u32 {
        if as_of < self.first_day() {
            0
        } else if as_of > self.last_day() {
            self.days_in_month()
        } else {
            as_of.day()
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = YEAR_MONTH_RE.captures(s.trim()).ok_or_else(|| {
            ValidationError::field("yearMonth", format!("'{}' is not in YYYY-MM format", s))
        })?;
        let year: i32 = caps[1]
            .parse()
            .map_err(|_| ValidationError::field("yearMonth", format!("bad year in '{}'", s)))?;
        let month: u32 = caps[2]
            .parse()
            .map_err(|_| ValidationError::field("yearMonth", format!("bad month in '{}'", s)))?;
        YearMonth::new(year, month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let ym: YearMonth = "2025-02".parse().unwrap();
        assert_eq!(ym.year(), 2025);
        assert_eq!(ym.month(), 2);
        assert_eq!(ym.to_string(), "2025-02");
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!("2025-13".parse::<YearMonth>().is_err());
        assert!("2025-00".parse::<YearMonth>().is_err());
        assert!("2025-1".parse::<YearMonth>().is_err());
        assert!("2025-01-01".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_lengths() {
        assert_eq!("2024-02".parse::<YearMonth>().unwrap().days_in_month(), 29);
        assert_eq!("2025-02".parse::<YearMonth>().unwrap().days_in_month(), 28);
        assert_eq!("2025-04".parse::<YearMonth>().unwrap().days_in_month(), 30);
        assert_eq!("2025-12".parse::<YearMonth>().unwrap().days_in_month(), 31);
        assert_eq!("2025-12".parse::<YearMonth>().unwrap().days().count(), 31);
    }

    #[test]
    fn test_next_wraps_year() {
        let dec: YearMonth = "2024-12".parse().unwrap();
        assert_eq!(dec.next().to_string(), "2025-01");
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_days_elapsed() {
        let ym: YearMonth = "2025-06".parse().unwrap();
        let day = |m, d| NaiveDate::from_ymd_opt(2025, m, d).unwrap();
        assert_eq!(ym.days_elapsed(day(5, 31)), 0);
        assert_eq!(ym.days_elapsed(day(6, 10)), 10);
        assert_eq!(ym.days_elapsed(day(7, 2)), 30);
    }

    #[test]
    fn test_serde_as_string() {
        let ym: YearMonth = "2025-03".parse().unwrap();
        let json = serde_json::to_string(&ym).unwrap();
        assert_eq!(json, "\"2025-03\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ym);
    }
}
