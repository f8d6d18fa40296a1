use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolidayType {
    Religious,
    National,
    International,
    Seasonal,
    Custom,
}

impl fmt::Display for HolidayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            HolidayType::Religious => "religious",
            HolidayType::National => "national",
            HolidayType::International => "international",
            HolidayType::Seasonal => "seasonal",
            HolidayType::Custom => "custom",
        };
        f.write_str(label)
    }
}

/// A named, inclusive date range whose days get their weight scaled by `weight_multiplier`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayRange {
    pub id: String,
    pub name: String,
    pub holiday_type: HolidayType,
    /// Display subtype (icon selection), not used in any calculation
    pub category: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 1.0 leaves the day alone, 0 suppresses its allocation
    pub weight_multiplier: Decimal,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl HolidayRange {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date >= start
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHolidayRange {
    pub name: String,
    pub holiday_type: HolidayType,
    pub category: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub weight_multiplier: Decimal,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl NewHolidayRange {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::field("name", "holiday name cannot be empty").into());
        }
        if self.start_date > self.end_date {
            return Err(ValidationError::InvalidDateRange {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            }
            .into());
        }
        if self.weight_multiplier < Decimal::ZERO {
            return Err(ValidationError::field(
                "weightMultiplier",
                format!("{} is negative", self.weight_multiplier),
            )
            .into());
        }
        Ok(())
    }

    pub fn into_range(self, id: String) -> HolidayRange {
        HolidayRange {
            id,
            name: self.name.trim().to_string(),
            holiday_type: self.holiday_type,
            category: self.category,
            start_date: self.start_date,
            end_date: self.end_date,
            weight_multiplier: self.weight_multiplier,
            color: self.color,
            description: self.description,
        }
    }
}
