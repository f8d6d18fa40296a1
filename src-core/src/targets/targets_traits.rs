use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::achievements::{BranchProgress, CashierSales};
use crate::alerts::Alert;
use crate::branches::Branch;
use crate::bulk::{BulkCreateRequest, BulkOperationResult, CopyMonthRequest};
use crate::calendar::YearMonth;
use crate::errors::Result;
use crate::leaderboard::{RankMetric, RankedEntity};
use crate::profiles::{NewWeightProfile, WeightProfile};
use crate::targets::targets_model::{
    AllocationPatch, DailyAllocation, MonthlyTarget, NewMonthlyTarget, TargetStatus,
};

/// Persistence for branches, profiles, targets and their allocations
#[async_trait]
pub trait TargetRepositoryTrait: Send + Sync {
    fn load_branches(&self) -> Result<Vec<Branch>>;
    fn load_weight_profile(&self, profile_id: &str) -> Result<WeightProfile>;
    fn load_default_weight_profile(&self) -> Result<Option<WeightProfile>>;
    fn load_weight_profiles(&self) -> Result<Vec<WeightProfile>>;
    fn get_target(&self, target_id: &str) -> Result<MonthlyTarget>;
    fn find_target(&self, branch_id: &str, year_month: YearMonth) -> Result<Option<MonthlyTarget>>;
    fn load_targets_for_month(&self, year_month: YearMonth) -> Result<Vec<MonthlyTarget>>;
    fn load_allocations(&self, target_id: &str) -> Result<Vec<DailyAllocation>>;
    fn get_allocation(&self, allocation_id: &str) -> Result<DailyAllocation>;

    /// Stores a profile; a new default profile clears the flag on the old one
    async fn insert_weight_profile(&self, profile: WeightProfile) -> Result<WeightProfile>;
    /// Fails with `DuplicateTarget` when the branch already has a target that month
    async fn insert_target(&self, target: MonthlyTarget) -> Result<MonthlyTarget>;
    async fn update_target(&self, target: MonthlyTarget) -> Result<MonthlyTarget>;
    /// Deletes the target and its allocations, returning the number of rows removed
    async fn delete_target(&self, target_id: &str) -> Result<usize>;
    /// Replaces the whole allocation set of a target
    async fn save_allocations(&self, target_id: &str, rows: Vec<DailyAllocation>) -> Result<usize>;
    async fn update_allocation(
        &self,
        allocation_id: &str,
        patch: AllocationPatch,
    ) -> Result<DailyAllocation>;
}

/// Read access to recorded sales
pub trait SalesJournalTrait: Send + Sync {
    fn load_sales_for_branch_and_date(&self, branch_id: &str, date: NaiveDate) -> Result<Decimal>;
    /// Per-cashier sales lines between `start` and `end` inclusive
    fn load_cashier_sales(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CashierSales>>;
}

#[async_trait]
pub trait TargetServiceTrait: Send + Sync {
    fn get_targets(&self, year_month: YearMonth) -> Result<Vec<MonthlyTarget>>;
    fn get_allocations(&self, target_id: &str) -> Result<Vec<DailyAllocation>>;
    async fn create_target(&self, new_target: NewMonthlyTarget) -> Result<MonthlyTarget>;
    async fn generate_allocations(&self, target_id: &str) -> Result<Vec<DailyAllocation>>;
    async fn update_allocation(
        &self,
        allocation_id: &str,
        amount: Decimal,
        reason: Option<String>,
    ) -> Result<DailyAllocation>;
    async fn clear_override(&self, allocation_id: &str) -> Result<DailyAllocation>;
    async fn transition_status(&self, target_id: &str, to: TargetStatus) -> Result<MonthlyTarget>;
    async fn update_target_amount(&self, target_id: &str, amount: Decimal) -> Result<MonthlyTarget>;
    async fn delete_target(&self, target_id: &str) -> Result<usize>;
    async fn create_weight_profile(&self, new_profile: NewWeightProfile) -> Result<WeightProfile>;
    fn get_weight_profiles(&self) -> Result<Vec<WeightProfile>>;
    fn get_branch_progress(&self, branch_id: &str, year_month: YearMonth) -> Result<BranchProgress>;
    fn get_leaderboard(&self, year_month: YearMonth, metric: RankMetric) -> Result<Vec<RankedEntity>>;
    fn get_cashier_leaderboard(&self, year_month: YearMonth) -> Result<Vec<RankedEntity>>;
    fn get_alerts(&self, year_month: YearMonth) -> Result<Vec<Alert>>;
    async fn bulk_create_targets(&self, request: BulkCreateRequest) -> Result<BulkOperationResult>;
    async fn copy_from_month(&self, request: CopyMonthRequest) -> Result<BulkOperationResult>;
}
