use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::achievements::achievement_model::{BranchProgress, DailyProgress};
use crate::alerts::percent_of;
use crate::branches::Branch;
use crate::errors::Result;
use crate::targets::allocation_generator::round_amount;
use crate::targets::targets_model::{DailyAllocation, MonthlyTarget};

/// Join a target's allocations with recorded sales, day by day.
///
/// Days after `as_of` keep their target but carry no achieved figure and
/// `sales_for_date` is not consulted for them. A month with no allocations
/// yet is still walked day by day with a zero daily target.
pub fn aggregate<F>(
    target: &MonthlyTarget,
    branch: &Branch,
    allocations: &[DailyAllocation],
    as_of: NaiveDate,
    amount_scale: u32,
    mut sales_for_date: F,
) -> Result<BranchProgress>
where
    F: FnMut(NaiveDate) -> Result<Decimal>,
{
    let month = target.year_month;
    let by_date: HashMap<NaiveDate, &DailyAllocation> =
        allocations.iter().map(|a| (a.target_date, a)).collect();

    let mut daily_progress = Vec::with_capacity(month.days_in_month() as usize);
    let mut cumulative_target = Decimal::ZERO;
    let mut cumulative_achieved = Decimal::ZERO;
    let mut target_to_date = Decimal::ZERO;

    for date in month.days() {
        let allocation = by_date.get(&date);
        let day_target = allocation.map(|a| a.daily_target).unwrap_or(Decimal::ZERO);
        let is_active = date <= as_of;

        cumulative_target += day_target;
        let (achieved_amount, variance) = if is_active {
            let achieved = sales_for_date(date)?;
            cumulative_achieved += achieved;
            target_to_date += day_target;
            (Some(achieved), Some(achieved - day_target))
        } else {
            (None, None)
        };

        daily_progress.push(DailyProgress {
            date,
            target_amount: day_target,
            achieved_amount,
            variance,
            cumulative_target,
            cumulative_achieved,
            cumulative_percent: percent_of(cumulative_achieved, cumulative_target),
            is_holiday: allocation.map(|a| a.is_holiday).unwrap_or(false),
            is_manual_override: allocation.map(|a| a.is_manual_override()).unwrap_or(false),
            is_active,
        });
    }

    let days_in_month = month.days_in_month();
    let days_elapsed = month.days_elapsed(as_of);
    let days_left = days_in_month - days_elapsed;

    let remaining_amount = (target.target_amount - cumulative_achieved).max(Decimal::ZERO);
    let required_daily_average = if days_left == 0 {
        Decimal::ZERO
    } else {
        round_amount(remaining_amount / Decimal::from(days_left), amount_scale)
    };

    Ok(BranchProgress {
        branch_id: branch.id.clone(),
        branch_name: branch.name.clone(),
        year_month: month,
        target_id: target.id.clone(),
        status: target.status,
        target_amount: target.target_amount,
        achieved_amount: cumulative_achieved,
        achievement_percent: percent_of(cumulative_achieved, target.target_amount),
        remaining_amount,
        daily_target_average: round_amount(
            target.target_amount / Decimal::from(days_in_month),
            amount_scale,
        ),
        target_to_date,
        required_daily_average,
        days_elapsed,
        days_in_month,
        daily_progress,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use chrono::Datelike;
    use crate::targets::targets_model::{AllocationSource, TargetStatus};
    use rust_decimal_macros::dec;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn fixture() -> (MonthlyTarget, Branch, Vec<DailyAllocation>) {
        let now = date(1).and_hms_opt(0, 0, 0).unwrap();
        let target = MonthlyTarget {
            id: "t-1".to_string(),
            branch_id: "b-1".to_string(),
            year_month: "2025-06".parse::<YearMonth>().unwrap(),
            target_amount: dec!(30000),
            profile_id: None,
            status: TargetStatus::Active,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let allocations = (1..=30)
            .map(|d| DailyAllocation {
                id: format!("a-{}", d),
                monthly_target_id: "t-1".to_string(),
                target_date: date(d),
                daily_target: dec!(1000),
                weight_percent: Decimal::ONE,
                is_holiday: false,
                holiday_name: None,
                source: AllocationSource::Generated,
            })
            .collect();
        (target, Branch::new("b-1", "Main Street"), allocations)
    }

    #[test]
    fn test_cumulative_figures_up_to_reference_date() {
        let (target, branch, allocations) = fixture();
        let progress = aggregate(&target, &branch, &allocations, date(3), 0, |d| {
            Ok(match d.day0() {
                0 => dec!(1200),
                1 => dec!(800),
                _ => dec!(1000),
            })
        })
        .unwrap();

        assert_eq!(progress.daily_progress.len(), 30);
        assert_eq!(progress.days_elapsed, 3);
        assert_eq!(progress.achieved_amount, dec!(3000));
        assert_eq!(progress.achievement_percent, dec!(10));
        assert_eq!(progress.remaining_amount, dec!(27000));
        assert_eq!(progress.target_to_date, dec!(3000));
        assert_eq!(progress.daily_target_average, dec!(1000));
        assert_eq!(progress.required_daily_average, dec!(1000));

        let day1 = &progress.daily_progress[0];
        assert_eq!(day1.variance, Some(dec!(200)));
        assert_eq!(day1.cumulative_percent, dec!(120));

        let day2 = &progress.daily_progress[1];
        assert_eq!(day2.variance, Some(dec!(-200)));
        assert_eq!(day2.cumulative_achieved, dec!(2000));

        let future = &progress.daily_progress[10];
        assert!(!future.is_active);
        assert_eq!(future.achieved_amount, None);
        assert_eq!(future.target_amount, dec!(1000));
    }

    #[test]
    fn test_future_days_are_not_looked_up() {
        let (target, branch, allocations) = fixture();
        let mut lookups = 0;
        aggregate(&target, &branch, &allocations, date(5), 0, |_| {
            lookups += 1;
            Ok(Decimal::ZERO)
        })
        .unwrap();
        assert_eq!(lookups, 5);
    }

    #[test]
    fn test_past_month_counts_every_day_and_clamps_remaining() {
        let (target, branch, allocations) = fixture();
        let after = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let progress =
            aggregate(&target, &branch, &allocations, after, 0, |_| Ok(dec!(1500))).unwrap();
        assert_eq!(progress.days_elapsed, 30);
        assert_eq!(progress.achieved_amount, dec!(45000));
        assert_eq!(progress.achievement_percent, dec!(150));
        assert_eq!(progress.remaining_amount, Decimal::ZERO);
        assert_eq!(progress.required_daily_average, Decimal::ZERO);
        assert!(progress.daily_progress.iter().all(|d| d.is_active));
    }

    #[test]
    fn test_sales_lookup_errors_propagate() {
        let (target, branch, allocations) = fixture();
        let result = aggregate(&target, &branch, &allocations, date(2), 0, |_| {
            Err(crate::errors::Error::Repository("journal offline".to_string()))
        });
        assert!(result.is_err());
    }
}
