use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::calendar::YearMonth;

/// Amount to give each branch in a bulk create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkAmount {
    Shared(Decimal),
    PerBranch(HashMap<String, Decimal>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateRequest {
    pub year_month: YearMonth,
    pub branch_ids: Vec<String>,
    pub amount: BulkAmount,
    pub profile_id: Option<String>,
    pub notes: Option<String>,
    /// Run the allocation generator on each new target
    #[serde(default)]
    pub generate_allocations: bool,
}

impl BulkCreateRequest {
    pub fn amount_for(&self, branch_id: &str) -> Option<Decimal> {
        match &self.amount {
            BulkAmount::Shared(amount) => Some(*amount),
            BulkAmount::PerBranch(amounts) => amounts.get(branch_id).copied(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyMonthRequest {
    pub source_month: YearMonth,
    pub destination_month: YearMonth,
    /// +10 raises every copied target by 10%, -5 lowers it by 5%
    pub adjustment_percent: Decimal,
    #[serde(default)]
    pub generate_allocations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum BulkOutcome {
    #[serde(rename_all = "camelCase")]
    Created {
        target_id: String,
        /// Set when allocation generation was requested and failed
        allocation_error: Option<String>,
    },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    pub branch_id: String,
    #[serde(flatten)]
    pub outcome: BulkOutcome,
}

/// Per-branch report of a bulk operation; partial success is normal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
    pub items: Vec<BulkItemResult>,
}

impl BulkOperationResult {
    pub fn record(&mut self, branch_id: &str, outcome: BulkOutcome) {
        match outcome {
            BulkOutcome::Created { .. } => self.created += 1,
            BulkOutcome::Skipped { .. } => self.skipped += 1,
            BulkOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(BulkItemResult {
            branch_id: branch_id.to_string(),
            outcome,
        });
    }

    pub fn skipped_branches(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter(|item| matches!(item.outcome, BulkOutcome::Skipped { .. }))
            .map(|item| item.branch_id.as_str())
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "created {}, skipped {}, failed {}",
            self.created, self.skipped, self.failed
        )
    }
}
