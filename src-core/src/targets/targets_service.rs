use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use log::{debug, info};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::achievements::{aggregate, BranchProgress};
use crate::alerts::{evaluate, Alert};
use crate::branches::Branch;
use crate::bulk::{BulkCreateRequest, BulkOperationResult, CopyMonthRequest};
use crate::calendar::YearMonth;
use crate::config::EngineConfig;
use crate::errors::{Error, Result, ValidationError};
use crate::holidays::HolidayCalendar;
use crate::leaderboard::{rank, LeaderboardEntry, RankMetric, RankedEntity};
use crate::profiles::{NewWeightProfile, WeightProfile};
use crate::targets::allocation_generator::{self, total_allocated};
use crate::targets::targets_model::{
    validate_target_amount, AllocationPatch, AllocationSource, DailyAllocation, MonthlyTarget,
    NewMonthlyTarget, TargetStatus,
};
use crate::targets::targets_traits::{SalesJournalTrait, TargetRepositoryTrait, TargetServiceTrait};

pub struct TargetService<T: TargetRepositoryTrait> {
    pub(crate) target_repo: Arc<T>,
    sales_journal: Arc<dyn SalesJournalTrait>,
    holiday_calendar: Arc<dyn HolidayCalendar>,
    pub(crate) config: EngineConfig,
    /// One mutex per target id; writers to the same target queue up here
    target_locks: DashMap<String, Arc<Mutex<()>>>,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl<T: TargetRepositoryTrait> TargetService<T> {
    pub fn new(
        target_repo: Arc<T>,
        sales_journal: Arc<dyn SalesJournalTrait>,
        holiday_calendar: Arc<dyn HolidayCalendar>,
        config: EngineConfig,
    ) -> Self {
        TargetService {
            target_repo,
            sales_journal,
            holiday_calendar,
            config,
            target_locks: DashMap::new(),
        }
    }

    fn target_lock(&self, target_id: &str) -> Arc<Mutex<()>> {
        self.target_locks
            .entry(target_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn branches_by_id(&self) -> Result<HashMap<String, Branch>> {
        Ok(self
            .target_repo
            .load_branches()?
            .into_iter()
            .map(|b| (b.id.clone(), b))
            .collect())
    }

    pub(crate) fn get_branch(&self, branch_id: &str) -> Result<Branch> {
        self.target_repo
            .load_branches()?
            .into_iter()
            .find(|b| b.id == branch_id)
            .ok_or_else(|| Error::not_found("Branch", branch_id))
    }

    /// The target's own profile, else the system default, else equal weights
    fn resolve_profile(&self, target: &MonthlyTarget) -> Result<WeightProfile> {
        if let Some(profile_id) = &target.profile_id {
            return self.target_repo.load_weight_profile(profile_id);
        }
        match self.target_repo.load_default_weight_profile()? {
            Some(profile) => Ok(profile),
            None => {
                debug!(
                    "No default weight profile, target {} uses equal weights",
                    target.id
                );
                Ok(WeightProfile::equal_weights())
            }
        }
    }

    fn ensure_editable(target: &MonthlyTarget) -> Result<()> {
        if target.status.is_editable() {
            Ok(())
        } else {
            Err(Error::TargetNotEditable {
                target_id: target.id.clone(),
                status: target.status,
            })
        }
    }

    pub(crate) async fn insert_new_target(&self, new_target: NewMonthlyTarget) -> Result<MonthlyTarget> {
        new_target.validate()?;
        if let Some(profile_id) = &new_target.profile_id {
            self.target_repo.load_weight_profile(profile_id)?;
        }
        if self
            .target_repo
            .find_target(&new_target.branch_id, new_target.year_month)?
            .is_some()
        {
            return Err(Error::DuplicateTarget {
                branch_id: new_target.branch_id.clone(),
                year_month: new_target.year_month.to_string(),
            });
        }

        let target = new_target.into_target(Uuid::new_v4().to_string(), Utc::now().naive_utc());
        let target = self.target_repo.insert_target(target).await?;
        info!(
            "Created target {} for branch {} in {}: {}",
            target.id, target.branch_id, target.year_month, target.target_amount
        );
        Ok(target)
    }

    /// Regenerate non-overridden allocations. Nothing is written unless generation succeeds.
    pub(crate) async fn regenerate(&self, target_id: &str) -> Result<Vec<DailyAllocation>> {
        let lock = self.target_lock(target_id);
        let _guard = lock.lock().await;

        let target = self.target_repo.get_target(target_id)?;
        Self::ensure_editable(&target)?;

        let profile = self.resolve_profile(&target)?;
        let holidays = self.holiday_calendar.holidays_in_range(
            target.year_month.first_day(),
            target.year_month.last_day(),
        )?;
        let existing = self.target_repo.load_allocations(target_id)?;

        let rows = allocation_generator::generate(
            &target,
            &profile,
            &holidays,
            &existing,
            self.config.amount_scale,
        )?;
        self.target_repo
            .save_allocations(target_id, rows.clone())
            .await?;

        info!(
            "Generated {} allocations for target {} with profile '{}' ({} holidays), total {}",
            rows.len(),
            target_id,
            profile.name,
            holidays.len(),
            total_allocated(&rows)
        );
        Ok(rows)
    }

    fn progress_for(
        &self,
        target: &MonthlyTarget,
        branch: &Branch,
        as_of: NaiveDate,
    ) -> Result<BranchProgress> {
        let allocations = self.target_repo.load_allocations(&target.id)?;
        aggregate(
            target,
            branch,
            &allocations,
            as_of,
            self.config.amount_scale,
            |date| {
                self.sales_journal
                    .load_sales_for_branch_and_date(&branch.id, date)
            },
        )
    }

    /// Non-archived targets of the month paired with their active branch
    fn live_targets(&self, year_month: YearMonth) -> Result<Vec<(MonthlyTarget, Branch)>> {
        let branches = self.branches_by_id()?;
        Ok(self
            .target_repo
            .load_targets_for_month(year_month)?
            .into_iter()
            .filter(|t| t.status != TargetStatus::Archived)
            .filter_map(|t| {
                branches
                    .get(&t.branch_id)
                    .filter(|b| b.is_active)
                    .cloned()
                    .map(|b| (t, b))
            })
            .collect())
    }

    pub fn get_branch_progress_as_of(
        &self,
        branch_id: &str,
        year_month: YearMonth,
        as_of: NaiveDate,
    ) -> Result<BranchProgress> {
        let branch = self.get_branch(branch_id)?;
        let target = self
            .target_repo
            .find_target(branch_id, year_month)?
            .ok_or_else(|| Error::not_found("MonthlyTarget", &format!("{}/{}", branch_id, year_month)))?;
        self.progress_for(&target, &branch, as_of)
    }

    pub fn get_leaderboard_as_of(
        &self,
        year_month: YearMonth,
        metric: RankMetric,
        as_of: NaiveDate,
    ) -> Result<Vec<RankedEntity>> {
        let mut entries = Vec::new();
        for (target, branch) in self.live_targets(year_month)? {
            let progress = self.progress_for(&target, &branch, as_of)?;
            entries.push(LeaderboardEntry {
                entity_id: branch.id,
                entity_name: branch.name,
                achieved_amount: progress.achieved_amount,
                target_amount: Some(progress.target_amount),
                achievement_percent: Some(progress.achievement_percent),
            });
        }
        Ok(rank(entries, metric, self.config.ranking_mode))
    }

    pub fn get_cashier_leaderboard_as_of(
        &self,
        year_month: YearMonth,
        as_of: NaiveDate,
    ) -> Result<Vec<RankedEntity>> {
        if as_of < year_month.first_day() {
            return Ok(Vec::new());
        }
        let end = as_of.min(year_month.last_day());
        let lines = self
            .sales_journal
            .load_cashier_sales(year_month.first_day(), end)?;

        let mut totals: HashMap<String, LeaderboardEntry> = HashMap::new();
        for line in lines {
            let entry = totals
                .entry(line.cashier_id.clone())
                .or_insert_with(|| LeaderboardEntry {
                    entity_id: line.cashier_id.clone(),
                    entity_name: line.cashier_name.clone(),
                    achieved_amount: Decimal::ZERO,
                    target_amount: None,
                    achievement_percent: None,
                });
            entry.achieved_amount += line.amount;
        }

        Ok(rank(
            totals.into_values().collect(),
            RankMetric::AchievedAmount,
            self.config.ranking_mode,
        ))
    }

    /// Alerts for every live target of the month, worst tier first.
    /// A month that has not started yet has nothing to project and yields no alerts.
    pub fn get_alerts_as_of(&self, year_month: YearMonth, as_of: NaiveDate) -> Result<Vec<Alert>> {
        let days_elapsed = year_month.days_elapsed(as_of);
        if days_elapsed == 0 {
            debug!("No alerts for {}: month has not started on {}", year_month, as_of);
            return Ok(Vec::new());
        }

        let mut alerts = Vec::new();
        for (target, branch) in self.live_targets(year_month)? {
            let progress = self.progress_for(&target, &branch, as_of)?;
            alerts.push(evaluate(
                &branch.id,
                &branch.name,
                progress.target_amount,
                progress.achieved_amount,
                progress.days_elapsed,
                progress.days_in_month,
                &self.config,
            ));
        }

        alerts.sort_by(|a, b| {
            a.tier
                .severity_rank()
                .cmp(&b.tier.severity_rank())
                .then(a.projected_percent.cmp(&b.projected_percent))
                .then(a.branch_id.cmp(&b.branch_id))
        });
        Ok(alerts)
    }
}

#[async_trait]
impl<T: TargetRepositoryTrait + Send + Sync> TargetServiceTrait for TargetService<T> {
    fn get_targets(&self, year_month: YearMonth) -> Result<Vec<MonthlyTarget>> {
        self.target_repo.load_targets_for_month(year_month)
    }

    fn get_allocations(&self, target_id: &str) -> Result<Vec<DailyAllocation>> {
        self.target_repo.get_target(target_id)?;
        self.target_repo.load_allocations(target_id)
    }

    async fn create_target(&self, new_target: NewMonthlyTarget) -> Result<MonthlyTarget> {
        self.get_branch(&new_target.branch_id)?;
        self.insert_new_target(new_target).await
    }

    async fn generate_allocations(&self, target_id: &str) -> Result<Vec<DailyAllocation>> {
        self.regenerate(target_id).await
    }

    async fn update_allocation(
        &self,
        allocation_id: &str,
        amount: Decimal,
        reason: Option<String>,
    ) -> Result<DailyAllocation> {
        if amount < Decimal::ZERO {
            return Err(ValidationError::field(
                "dailyTarget",
                format!("override amount {} for allocation {} is negative", amount, allocation_id),
            )
            .into());
        }

        let target_id = self.target_repo.get_allocation(allocation_id)?.monthly_target_id;
        let lock = self.target_lock(&target_id);
        let _guard = lock.lock().await;

        let target = self.target_repo.get_target(&target_id)?;
        Self::ensure_editable(&target)?;
        // a regeneration may have finished while we waited for the lock
        let previous = self.target_repo.get_allocation(allocation_id)?;

        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let patch = AllocationPatch {
            daily_target: Some(amount),
            source: Some(AllocationSource::ManualOverride {
                override_reason: reason,
            }),
        };
        let updated = self.target_repo.update_allocation(allocation_id, patch).await?;
        info!(
            "Allocation {} of target {} on {} overridden: {} -> {}",
            allocation_id, target.id, updated.target_date, previous.daily_target, amount
        );
        Ok(updated)
    }

    async fn clear_override(&self, allocation_id: &str) -> Result<DailyAllocation> {
        let allocation = self.target_repo.get_allocation(allocation_id)?;
        let lock = self.target_lock(&allocation.monthly_target_id);
        let _guard = lock.lock().await;

        let target = self.target_repo.get_target(&allocation.monthly_target_id)?;
        Self::ensure_editable(&target)?;

        let patch = AllocationPatch {
            daily_target: None,
            source: Some(AllocationSource::Generated),
        };
        let updated = self.target_repo.update_allocation(allocation_id, patch).await?;
        info!(
            "Override cleared on allocation {} of target {}; amount kept until regeneration",
            allocation_id, target.id
        );
        Ok(updated)
    }

    async fn transition_status(&self, target_id: &str, to: TargetStatus) -> Result<MonthlyTarget> {
        let lock = self.target_lock(target_id);
        let _guard = lock.lock().await;

        let mut target = self.target_repo.get_target(target_id)?;
        if target.status == to {
            return Ok(target);
        }
        if !target.status.can_transition_to(to) {
            return Err(Error::InvalidStatusTransition {
                target_id: target_id.to_string(),
                from: target.status,
                to,
            });
        }

        let from = target.status;
        target.status = to;
        target.updated_at = Utc::now().naive_utc();
        let target = self.target_repo.update_target(target).await?;
        info!("Target {} moved from {} to {}", target_id, from, to);
        Ok(target)
    }

    async fn update_target_amount(&self, target_id: &str, amount: Decimal) -> Result<MonthlyTarget> {
        validate_target_amount(amount)?;
        let lock = self.target_lock(target_id);
        let _guard = lock.lock().await;

        let mut target = self.target_repo.get_target(target_id)?;
        Self::ensure_editable(&target)?;
        let previous = target.target_amount;
        target.target_amount = amount;
        target.updated_at = Utc::now().naive_utc();
        let target = self.target_repo.update_target(target).await?;
        info!(
            "Target {} amount changed from {} to {}",
            target_id, previous, amount
        );
        Ok(target)
    }

    async fn delete_target(&self, target_id: &str) -> Result<usize> {
        let lock = self.target_lock(target_id);
        let deleted = {
            let _guard = lock.lock().await;
            self.target_repo.delete_target(target_id).await?
        };
        self.target_locks.remove(target_id);
        info!("Deleted target {} ({} rows)", target_id, deleted);
        Ok(deleted)
    }

    async fn create_weight_profile(&self, new_profile: NewWeightProfile) -> Result<WeightProfile> {
        new_profile.validate()?;
        let profile = new_profile.into_profile(Uuid::new_v4().to_string());
        let profile = self.target_repo.insert_weight_profile(profile).await?;
        info!(
            "Created weight profile '{}' ({}){}",
            profile.name,
            profile.id,
            if profile.is_default { " as default" } else { "" }
        );
        Ok(profile)
    }

    fn get_weight_profiles(&self) -> Result<Vec<WeightProfile>> {
        self.target_repo.load_weight_profiles()
    }

    fn get_branch_progress(&self, branch_id: &str, year_month: YearMonth) -> Result<BranchProgress> {
        self.get_branch_progress_as_of(branch_id, year_month, today())
    }

    fn get_leaderboard(&self, year_month: YearMonth, metric: RankMetric) -> Result<Vec<RankedEntity>> {
        self.get_leaderboard_as_of(year_month, metric, today())
    }

    fn get_cashier_leaderboard(&self, year_month: YearMonth) -> Result<Vec<RankedEntity>> {
        self.get_cashier_leaderboard_as_of(year_month, today())
    }

    fn get_alerts(&self, year_month: YearMonth) -> Result<Vec<Alert>> {
        self.get_alerts_as_of(year_month, today())
    }

    async fn bulk_create_targets(&self, request: BulkCreateRequest) -> Result<BulkOperationResult> {
        self.run_bulk_create(request).await
    }

    async fn copy_from_month(&self, request: CopyMonthRequest) -> Result<BulkOperationResult> {
        self.run_copy_from_month(request).await
    }
}
