use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::calendar::YearMonth;
use crate::errors::{Result, ValidationError};

/// Lifecycle of a monthly target.
///
/// `draft -> active -> locked`, and `draft | active -> archived`.
/// Archived is terminal; locked and archived targets reject allocation edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Draft,
    Active,
    Locked,
    Archived,
}

impl TargetStatus {
    pub fn can_transition_to(self, next: TargetStatus) -> bool {
        matches!(
            (self, next),
            (TargetStatus::Draft, TargetStatus::Active)
                | (TargetStatus::Active, TargetStatus::Locked)
                | (TargetStatus::Draft, TargetStatus::Archived)
                | (TargetStatus::Active, TargetStatus::Archived)
        )
    }

    pub fn is_editable(self) -> bool {
        matches!(self, TargetStatus::Draft | TargetStatus::Active)
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TargetStatus::Draft => "draft",
            TargetStatus::Active => "active",
            TargetStatus::Locked => "locked",
            TargetStatus::Archived => "archived",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTarget {
    pub id: String,
    pub branch_id: String,
    pub year_month: YearMonth,
    pub target_amount: Decimal,
    /// `None` falls back to the system default profile
    pub profile_id: Option<String>,
    pub status: TargetStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonthlyTarget {
    pub branch_id: String,
    pub year_month: YearMonth,
    pub target_amount: Decimal,
    pub profile_id: Option<String>,
    pub notes: Option<String>,
}

impl NewMonthlyTarget {
    pub fn validate(&self) -> Result<()> {
        if self.branch_id.trim().is_empty() {
            return Err(ValidationError::field("branchId", "branch id cannot be empty").into());
        }
        validate_target_amount(self.target_amount)
    }

    pub fn into_target(self, id: String, now: NaiveDateTime) -> MonthlyTarget {
        MonthlyTarget {
            id,
            branch_id: self.branch_id,
            year_month: self.year_month,
            target_amount: self.target_amount,
            profile_id: self.profile_id,
            status: TargetStatus::Draft,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

pub fn validate_target_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::field(
            "targetAmount",
            format!("target amount must be positive, got {}", amount),
        )
        .into());
    }
    Ok(())
}

/// Where a daily allocation's amount came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum AllocationSource {
    /// Computed by the generator; replaced on every regeneration
    Generated,
    /// Fixed by a user; regeneration leaves it alone
    #[serde(rename_all = "camelCase")]
    ManualOverride { override_reason: Option<String> },
}

/// One day's share of a monthly target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAllocation {
    pub id: String,
    pub monthly_target_id: String,
    pub target_date: NaiveDate,
    pub daily_target: Decimal,
    /// Normalized weight actually used for this day (0-100)
    pub weight_percent: Decimal,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    #[serde(flatten)]
    pub source: AllocationSource,
}

impl DailyAllocation {
    pub fn is_manual_override(&self) -> bool {
        matches!(self.source, AllocationSource::ManualOverride { .. })
    }

    pub fn override_reason(&self) -> Option<&str> {
        match &self.source {
            AllocationSource::ManualOverride { override_reason } => override_reason.as_deref(),
            AllocationSource::Generated => None,
        }
    }
}

/// Partial update applied by the store's `update_allocation`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationPatch {
    pub daily_target: Option<Decimal>,
    pub source: Option<AllocationSource>,
}

impl AllocationPatch {
    pub fn apply(self, allocation: &mut DailyAllocation) {
        if let Some(amount) = self.daily_target {
            allocation.daily_target = amount;
        }
        if let Some(source) = self.source {
            allocation.source = source;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_legal_transitions() {
        use TargetStatus::*;
        assert!(Draft.can_transition_to(Active));
        assert!(Active.can_transition_to(Locked));
        assert!(Draft.can_transition_to(Archived));
        assert!(Active.can_transition_to(Archived));

        assert!(!Draft.can_transition_to(Locked));
        assert!(!Locked.can_transition_to(Active));
        assert!(!Archived.can_transition_to(Draft));
        assert!(!Archived.can_transition_to(Active));
        assert!(!Active.can_transition_to(Draft));
    }

    #[test]
    fn test_only_draft_and_active_are_editable() {
        assert!(TargetStatus::Draft.is_editable());
        assert!(TargetStatus::Active.is_editable());
        assert!(!TargetStatus::Locked.is_editable());
        assert!(!TargetStatus::Archived.is_editable());
    }

    #[test]
    fn test_target_amount_must_be_positive() {
        assert!(validate_target_amount(dec!(1)).is_ok());
        assert!(validate_target_amount(dec!(0)).is_err());
        assert!(validate_target_amount(dec!(-5)).is_err());
    }

    #[test]
    fn test_allocation_serializes_source_tag() {
        let allocation = DailyAllocation {
            id: "a-1".to_string(),
            monthly_target_id: "t-1".to_string(),
            target_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            daily_target: dec!(1000),
            weight_percent: dec!(3.5),
            is_holiday: false,
            holiday_name: None,
            source: AllocationSource::ManualOverride {
                override_reason: Some("Store closed".to_string()),
            },
        };
        let json = serde_json::to_value(&allocation).unwrap();
        assert_eq!(json["source"], "manualOverride");
        assert_eq!(json["overrideReason"], "Store closed");
        assert_eq!(json["targetDate"], "2025-06-01");
        assert!(allocation.is_manual_override());
        assert_eq!(allocation.override_reason(), Some("Store closed"));
    }
}
