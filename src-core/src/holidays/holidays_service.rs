use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use crate::calendar::YearMonth;
use crate::errors::{Result, ValidationError};
use crate::holidays::holiday_calendar::HolidayCalendar;
use crate::holidays::holidays_model::{HolidayRange, NewHolidayRange};

/// Holiday storage; reads go through [`HolidayCalendar`]
#[async_trait]
pub trait HolidayRepositoryTrait: HolidayCalendar {
    async fn insert_holiday(&self, holiday: HolidayRange) -> Result<HolidayRange>;
    async fn delete_holiday(&self, holiday_id: &str) -> Result<usize>;
}

pub struct HolidayService<H: HolidayRepositoryTrait> {
    holiday_repo: Arc<H>,
}

impl<H: HolidayRepositoryTrait> HolidayService<H> {
    pub fn new(holiday_repo: Arc<H>) -> Self {
        HolidayService { holiday_repo }
    }

    pub async fn create_holiday(&self, new_holiday: NewHolidayRange) -> Result<HolidayRange> {
        new_holiday.validate()?;
        let holiday = new_holiday.into_range(Uuid::new_v4().to_string());
        let holiday = self.holiday_repo.insert_holiday(holiday).await?;
        info!(
            "Created {} holiday '{}' {}..{} x{}",
            holiday.holiday_type,
            holiday.name,
            holiday.start_date,
            holiday.end_date,
            holiday.weight_multiplier
        );
        Ok(holiday)
    }

    pub async fn delete_holiday(&self, holiday_id: &str) -> Result<usize> {
        self.holiday_repo.delete_holiday(holiday_id).await
    }

    pub fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<HolidayRange>> {
        if start > end {
            return Err(ValidationError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            }
            .into());
        }
        self.holiday_repo.holidays_in_range(start, end)
    }

    pub fn holidays_in_month(&self, year_month: YearMonth) -> Result<Vec<HolidayRange>> {
        self.holiday_repo
            .holidays_in_range(year_month.first_day(), year_month.last_day())
    }
}
