//! End-of-month projection and alert tiers.
//!
//! Projection is a flat linear extrapolation of the current daily pace over
//! the whole month. Tiers are checked in order: `exceeding` (target already
//! met), `critical`, `warning`, then `on_track`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    Critical,
    Warning,
    OnTrack,
    Exceeding,
}

impl AlertTier {
    /// 0 is the worst tier
    pub fn severity_rank(self) -> u8 {
        match self {
            AlertTier::Critical => 0,
            AlertTier::Warning => 1,
            AlertTier::OnTrack => 2,
            AlertTier::Exceeding => 3,
        }
    }
}

impl fmt::Display for AlertTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AlertTier::Critical => "critical",
            AlertTier::Warning => "warning",
            AlertTier::OnTrack => "on_track",
            AlertTier::Exceeding => "exceeding",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub branch_id: String,
    pub branch_name: String,
    pub tier: AlertTier,
    pub target_amount: Decimal,
    pub achieved_amount: Decimal,
    pub achievement_percent: Decimal,
    pub daily_pace: Decimal,
    pub projected_achievement: Decimal,
    pub projected_percent: Decimal,
    pub days_elapsed: u32,
    pub days_remaining: u32,
    /// Daily sales needed from here on to still hit the target
    pub required_daily_pace: Decimal,
    pub message: String,
}

/// `part / whole * 100`, 0 when `whole` is 0
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * dec!(100)
    }
}

pub fn evaluate(
    branch_id: &str,
    branch_name: &str,
    target_amount: Decimal,
    achieved_amount: Decimal,
    days_elapsed: u32,
    days_in_month: u32,
    config: &EngineConfig,
) -> Alert {
    let days_elapsed = days_elapsed.min(days_in_month);
    let days_remaining = days_in_month - days_elapsed;

    let achievement_percent = percent_of(achieved_amount, target_amount);
    let daily_pace = achieved_amount / Decimal::from(days_elapsed.max(1));
    let projected_achievement = daily_pace * Decimal::from(days_in_month);
    let projected_percent = percent_of(projected_achievement, target_amount);

    let shortfall = (target_amount - achieved_amount).max(Decimal::ZERO);
    let required_daily_pace = if days_remaining == 0 {
        Decimal::ZERO
    } else {
        shortfall / Decimal::from(days_remaining)
    };

    let tier = if achievement_percent >= dec!(100) {
        AlertTier::Exceeding
    } else if projected_percent < config.critical_threshold_percent {
        AlertTier::Critical
    } else if projected_percent < config.warning_threshold_percent {
        AlertTier::Warning
    } else {
        AlertTier::OnTrack
    };

    let message = alert_message(
        tier,
        branch_name,
        achievement_percent,
        projected_percent,
        days_remaining,
    );

    Alert {
        branch_id: branch_id.to_string(),
        branch_name: branch_name.to_string(),
        tier,
        target_amount,
        achieved_amount,
        achievement_percent,
        daily_pace,
        projected_achievement,
        projected_percent,
        days_elapsed,
        days_remaining,
        required_daily_pace,
        message,
    }
}

fn alert_message(
    tier: AlertTier,
    branch_name: &str,
    achievement_percent: Decimal,
    projected_percent: Decimal,
    days_remaining: u32,
) -> String {
    let achieved = achievement_percent.round_dp(1);
    let projected = projected_percent.round_dp(1);
    match tier {
        AlertTier::Exceeding => format!(
            "{} has already reached {}% of its monthly target with {} days remaining",
            branch_name, achieved, days_remaining
        ),
        AlertTier::Critical => format!(
            "{} is at {}% of target and projected to finish at only {}%; {} days remaining",
            branch_name, achieved, projected, days_remaining
        ),
        AlertTier::Warning => format!(
            "{} is projected to finish at {}% of target; {} days remaining to close the gap",
            branch_name, projected, days_remaining
        ),
        AlertTier::OnTrack => format!(
            "{} is on track at {}% of target, projected {}% with {} days remaining",
            branch_name, achieved, projected, days_remaining
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(target: Decimal, achieved: Decimal, elapsed: u32, days: u32) -> Alert {
        evaluate("b-1", "Main Street", target, achieved, elapsed, days, &EngineConfig::default())
    }

    #[test]
    fn test_projection_example() {
        let alert = eval(dec!(100000), dec!(40000), 10, 30);
        assert_eq!(alert.daily_pace, dec!(4000));
        assert_eq!(alert.projected_achievement, dec!(120000));
        assert_eq!(alert.projected_percent, dec!(120));
        assert_eq!(alert.achievement_percent, dec!(40));
        assert_eq!(alert.days_remaining, 20);
        assert_eq!(alert.required_daily_pace, dec!(3000));
        assert_eq!(alert.tier, AlertTier::OnTrack);
    }

    #[test]
    fn test_exceeding_is_checked_first() {
        let alert = eval(dec!(100000), dec!(100000), 30, 30);
        assert_eq!(alert.tier, AlertTier::Exceeding);
        assert!(alert.message.contains("Main Street"));
        assert!(alert.message.contains("0 days remaining"));
    }

    #[test]
    fn test_critical_and_warning_thresholds() {
        // pace 2500/day -> 75000 projected -> 75%
        assert_eq!(eval(dec!(100000), dec!(25000), 10, 30).tier, AlertTier::Critical);
        // pace 3000/day -> 90000 projected -> 90%
        assert_eq!(eval(dec!(100000), dec!(30000), 10, 30).tier, AlertTier::Warning);
        // exactly 80% projected is a warning, not critical
        let alert = eval(dec!(90000), dec!(24000), 10, 30);
        assert_eq!(alert.projected_percent, dec!(80));
        assert_eq!(alert.tier, AlertTier::Warning);
    }

    #[test]
    fn test_zero_days_elapsed_uses_one_day_pace() {
        let alert = eval(dec!(31000), dec!(500), 0, 31);
        assert_eq!(alert.daily_pace, dec!(500));
        assert_eq!(alert.projected_achievement, dec!(15500));
        assert_eq!(alert.days_remaining, 31);
    }

    #[test]
    fn test_more_sales_never_worsen_tier() {
        let target = dec!(100000);
        for elapsed in [1u32, 7, 15, 29, 30] {
            let mut previous = AlertTier::Critical.severity_rank();
            let mut achieved = Decimal::ZERO;
            while achieved <= dec!(150000) {
                let rank = eval(target, achieved, elapsed, 30).tier.severity_rank();
                assert!(rank >= previous, "tier worsened at {} after {} days", achieved, elapsed);
                previous = rank;
                achieved += dec!(2500);
            }
        }
    }

    #[test]
    fn test_zero_target_guards_division() {
        assert_eq!(percent_of(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }
}
