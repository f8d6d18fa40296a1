use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::YearMonth;
use crate::targets::targets_model::TargetStatus;

/// Target vs. recorded sales for a single day of the month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyProgress {
    pub date: NaiveDate,
    pub target_amount: Decimal,
    /// `None` for days after the reference date
    pub achieved_amount: Option<Decimal>,
    /// achieved - target, `None` for days after the reference date
    pub variance: Option<Decimal>,
    pub cumulative_target: Decimal,
    pub cumulative_achieved: Decimal,
    pub cumulative_percent: Decimal,
    pub is_holiday: bool,
    pub is_manual_override: bool,
    pub is_active: bool,
}

/// Month-level achievement of one branch against its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchProgress {
    pub branch_id: String,
    pub branch_name: String,
    pub year_month: YearMonth,
    pub target_id: String,
    pub status: TargetStatus,
    pub target_amount: Decimal,
    pub achieved_amount: Decimal,
    pub achievement_percent: Decimal,
    pub remaining_amount: Decimal,
    pub daily_target_average: Decimal,
    /// Sum of daily targets up to and including the reference date
    pub target_to_date: Decimal,
    /// Remaining amount spread over the days still to come
    pub required_daily_average: Decimal,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    pub daily_progress: Vec<DailyProgress>,
}

/// Sales rung up by one cashier over a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashierSales {
    pub cashier_id: String,
    pub cashier_name: String,
    pub branch_id: String,
    pub sale_date: NaiveDate,
    pub amount: Decimal,
}
