//! Distribution of a monthly target across the days of its month.
//!
//! Weights go through two passes: the profile's weekday weight (normalized
//! to 100) is scaled by the strongest covering holiday multiplier, then the
//! adjusted weights of every regenerated day are normalized to 100 again.
//! Manual overrides keep their amounts and sit outside that pool.

use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{Error, Result, ValidationError};
use crate::holidays::{strongest_holiday, HolidayRange};
use crate::profiles::WeightProfile;
use crate::targets::targets_model::{AllocationSource, DailyAllocation, MonthlyTarget};

pub fn round_amount(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

struct PoolDay<'a> {
    date: NaiveDate,
    raw_weight: Decimal,
    holiday: Option<&'a HolidayRange>,
    covered: bool,
}

/// Produce the full allocation set for `target`'s month.
///
/// `existing` is the target's current allocation set; its manual overrides
/// are returned unchanged and their amounts are taken off the target before
/// the remainder is spread. Nothing is persisted here.
pub fn generate(
    target: &MonthlyTarget,
    profile: &WeightProfile,
    holidays: &[HolidayRange],
    existing: &[DailyAllocation],
    amount_scale: u32,
) -> Result<Vec<DailyAllocation>> {
    if !target.status.is_editable() {
        return Err(Error::TargetNotEditable {
            target_id: target.id.clone(),
            status: target.status,
        });
    }

    let weekday_weights = profile.normalized_weights()?;
    let month = target.year_month;

    let overrides: HashMap<NaiveDate, &DailyAllocation> = existing
        .iter()
        .filter(|a| a.is_manual_override() && month.contains(a.target_date))
        .map(|a| (a.target_date, a))
        .collect();
    let existing_ids: HashMap<NaiveDate, &str> = existing
        .iter()
        .map(|a| (a.target_date, a.id.as_str()))
        .collect();

    let override_total: Decimal = overrides.values().map(|a| a.daily_target).sum();
    let remaining = target.target_amount - override_total;
    if remaining < Decimal::ZERO {
        return Err(ValidationError::field(
            "dailyTarget",
            format!(
                "manual overrides total {} which exceeds the target amount {} of target {}",
                override_total, target.target_amount, target.id
            ),
        )
        .into());
    }

    let pool: Vec<PoolDay> = month
        .days()
        .filter(|date| !overrides.contains_key(date))
        .map(|date| {
            let weekday_weight =
                weekday_weights[date.weekday().num_days_from_sunday() as usize];
            let holiday = strongest_holiday(holidays, date);
            let multiplier = holiday.map(|h| h.weight_multiplier).unwrap_or(Decimal::ONE);
            PoolDay {
                date,
                raw_weight: weekday_weight * multiplier,
                holiday,
                covered: holiday.is_some(),
            }
        })
        .collect();

    let pool_weight: Decimal = pool.iter().map(|d| d.raw_weight).sum();
    if pool.is_empty() {
        if !remaining.is_zero() {
            warn!(
                "Target {}: every day is overridden, overrides total {} against target {}",
                target.id, override_total, target.target_amount
            );
        }
    } else if pool_weight.is_zero() && remaining > Decimal::ZERO {
        return Err(Error::InvalidProfile {
            profile_id: profile.id.clone(),
            message: format!(
                "no weight left to distribute {} over {} days after holiday multipliers",
                remaining,
                pool.len()
            ),
        });
    }

    let mut rows: Vec<DailyAllocation> = Vec::with_capacity(month.days_in_month() as usize);
    for day in &pool {
        let weight_percent = if pool_weight.is_zero() {
            Decimal::ZERO
        } else {
            day.raw_weight / pool_weight * dec!(100)
        };
        let daily_target = round_amount(remaining * weight_percent / dec!(100), amount_scale);
        rows.push(DailyAllocation {
            id: existing_ids
                .get(&day.date)
                .map(|id| id.to_string())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            monthly_target_id: target.id.clone(),
            target_date: day.date,
            daily_target,
            weight_percent,
            is_holiday: day.covered,
            holiday_name: day.holiday.map(|h| h.name.clone()),
            source: AllocationSource::Generated,
        });
    }

    reconcile(&mut rows, remaining, &target.id);

    rows.extend(overrides.into_values().cloned());
    rows.sort_by_key(|a| a.target_date);

    debug!(
        "Generated {} allocations for target {} ({} overridden, {} distributed)",
        rows.len(),
        target.id,
        rows.iter().filter(|a| a.is_manual_override()).count(),
        remaining
    );
    Ok(rows)
}

/// Push rounding drift onto the last generated day that carries weight so the rows sum to `expected`.
/// Days suppressed by a zero multiplier never absorb drift. A negative drift that would push
/// the chosen day below zero moves to the latest weighted day that can absorb it.
fn reconcile(rows: &mut [DailyAllocation], expected: Decimal, target_id: &str) {
    let allocated: Decimal = rows.iter().map(|a| a.daily_target).sum();
    let drift = expected - allocated;
    if drift.is_zero() || rows.is_empty() {
        return;
    }

    let Some(last_weighted) = rows.iter().rposition(|a| a.weight_percent > Decimal::ZERO) else {
        warn!(
            "Target {}: no weighted day left to absorb rounding drift {}",
            target_id, drift
        );
        return;
    };
    let absorber = rows[..=last_weighted].iter().rposition(|a| {
        a.weight_percent > Decimal::ZERO && a.daily_target + drift >= Decimal::ZERO
    });

    match absorber {
        Some(idx) => {
            if idx != rows.len() - 1 {
                warn!(
                    "Target {}: rounding drift {} placed on {} instead of {}",
                    target_id,
                    drift,
                    rows[idx].target_date,
                    rows[rows.len() - 1].target_date
                );
            }
            rows[idx].daily_target += drift;
        }
        None => warn!(
            "Target {}: no generated day can absorb rounding drift {}",
            target_id, drift
        ),
    }
}

/// Sum of a set of allocation amounts
pub fn total_allocated(rows: &[DailyAllocation]) -> Decimal {
    rows.iter().map(|a| a.daily_target).sum()
}
