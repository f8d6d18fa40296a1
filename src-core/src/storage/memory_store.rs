//! In-memory implementation of the engine's persistence and sales journal seams.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::achievements::CashierSales;
use crate::branches::Branch;
use crate::calendar::YearMonth;
use crate::errors::{Error, Result};
use crate::holidays::{HolidayCalendar, HolidayRange, HolidayRepositoryTrait};
use crate::profiles::WeightProfile;
use crate::targets::{
    AllocationPatch, DailyAllocation, MonthlyTarget, SalesJournalTrait, TargetRepositoryTrait,
};

#[derive(Default)]
pub struct InMemoryStore {
    branches: DashMap<String, Branch>,
    profiles: DashMap<String, WeightProfile>,
    targets: DashMap<String, MonthlyTarget>,
    /// (branch, month) -> target id
    target_index: DashMap<(String, YearMonth), String>,
    /// target id -> allocations in date order
    allocations: DashMap<String, Vec<DailyAllocation>>,
    /// allocation id -> target id
    allocation_owner: DashMap<String, String>,
    holidays: RwLock<Vec<HolidayRange>>,
    daily_sales: DashMap<(String, NaiveDate), Decimal>,
    cashier_sales: RwLock<Vec<CashierSales>>,
}

fn poisoned<E>(_: E) -> Error {
    Error::Repository("in-memory store lock poisoned".to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_branch(&self, branch: Branch) {
        self.branches.insert(branch.id.clone(), branch);
    }

    /// Adds `amount` to the branch's recorded sales for `date`
    pub fn record_sale(&self, branch_id: &str, date: NaiveDate, amount: Decimal) {
        *self
            .daily_sales
            .entry((branch_id.to_string(), date))
            .or_insert(Decimal::ZERO) += amount;
    }

    /// Records a cashier's sale line; it also counts towards the branch's daily sales
    pub fn record_cashier_sale(&self, sale: CashierSales) -> Result<()> {
        self.record_sale(&sale.branch_id, sale.sale_date, sale.amount);
        self.cashier_sales.write().map_err(poisoned)?.push(sale);
        Ok(())
    }
}

#[async_trait]
impl TargetRepositoryTrait for InMemoryStore {
    fn load_branches(&self) -> Result<Vec<Branch>> {
        let mut branches: Vec<Branch> = self.branches.iter().map(|b| b.value().clone()).collect();
        branches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(branches)
    }

    fn load_weight_profile(&self, profile_id: &str) -> Result<WeightProfile> {
        self.profiles
            .get(profile_id)
            .map(|p| p.value().clone())
            .ok_or_else(|| Error::not_found("WeightProfile", profile_id))
    }

    fn load_default_weight_profile(&self) -> Result<Option<WeightProfile>> {
        Ok(self
            .profiles
            .iter()
            .find(|p| p.is_default && p.is_active)
            .map(|p| p.value().clone()))
    }

    fn load_weight_profiles(&self) -> Result<Vec<WeightProfile>> {
        let mut profiles: Vec<WeightProfile> =
            self.profiles.iter().map(|p| p.value().clone()).collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    fn get_target(&self, target_id: &str) -> Result<MonthlyTarget> {
        self.targets
            .get(target_id)
            .map(|t| t.value().clone())
            .ok_or_else(|| Error::not_found("MonthlyTarget", target_id))
    }

    fn find_target(&self, branch_id: &str, year_month: YearMonth) -> Result<Option<MonthlyTarget>> {
        let target_id = match self.target_index.get(&(branch_id.to_string(), year_month)) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        Ok(self.targets.get(&target_id).map(|t| t.value().clone()))
    }

    fn load_targets_for_month(&self, year_month: YearMonth) -> Result<Vec<MonthlyTarget>> {
        let mut targets: Vec<MonthlyTarget> = self
            .targets
            .iter()
            .filter(|t| t.year_month == year_month)
            .map(|t| t.value().clone())
            .collect();
        targets.sort_by(|a, b| a.branch_id.cmp(&b.branch_id));
        Ok(targets)
    }

    fn load_allocations(&self, target_id: &str) -> Result<Vec<DailyAllocation>> {
        Ok(self
            .allocations
            .get(target_id)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    fn get_allocation(&self, allocation_id: &str) -> Result<DailyAllocation> {
        let target_id = self
            .allocation_owner
            .get(allocation_id)
            .map(|owner| owner.value().clone())
            .ok_or_else(|| Error::AllocationNotFound(allocation_id.to_string()))?;
        self.allocations
            .get(&target_id)
            .and_then(|rows| rows.iter().find(|a| a.id == allocation_id).cloned())
            .ok_or_else(|| Error::AllocationNotFound(allocation_id.to_string()))
    }

    async fn insert_weight_profile(&self, profile: WeightProfile) -> Result<WeightProfile> {
        if profile.is_default {
            for mut existing in self.profiles.iter_mut() {
                existing.is_default = false;
            }
        }
        self.profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn insert_target(&self, target: MonthlyTarget) -> Result<MonthlyTarget> {
        match self
            .target_index
            .entry((target.branch_id.clone(), target.year_month))
        {
            Entry::Occupied(_) => Err(Error::DuplicateTarget {
                branch_id: target.branch_id.clone(),
                year_month: target.year_month.to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(target.id.clone());
                self.targets.insert(target.id.clone(), target.clone());
                Ok(target)
            }
        }
    }

    async fn update_target(&self, target: MonthlyTarget) -> Result<MonthlyTarget> {
        match self.targets.get_mut(&target.id) {
            Some(mut stored) => {
                *stored = target.clone();
                Ok(target)
            }
            None => Err(Error::not_found("MonthlyTarget", &target.id)),
        }
    }

    async fn delete_target(&self, target_id: &str) -> Result<usize> {
        let (_, target) = self
            .targets
            .remove(target_id)
            .ok_or_else(|| Error::not_found("MonthlyTarget", target_id))?;
        self.target_index
            .remove(&(target.branch_id.clone(), target.year_month));

        let rows = self
            .allocations
            .remove(target_id)
            .map(|(_, rows)| rows)
            .unwrap_or_default();
        for row in &rows {
            self.allocation_owner.remove(&row.id);
        }
        Ok(1 + rows.len())
    }

    async fn save_allocations(&self, target_id: &str, mut rows: Vec<DailyAllocation>) -> Result<usize> {
        if !self.targets.contains_key(target_id) {
            return Err(Error::not_found("MonthlyTarget", target_id));
        }
        rows.sort_by_key(|a| a.target_date);

        for row in &rows {
            self.allocation_owner
                .insert(row.id.clone(), target_id.to_string());
        }
        let kept: HashSet<&str> = rows.iter().map(|a| a.id.as_str()).collect();
        let stale: Vec<String> = self
            .allocations
            .get(target_id)
            .map(|previous| {
                previous
                    .iter()
                    .filter(|a| !kept.contains(a.id.as_str()))
                    .map(|a| a.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        let count = rows.len();

        // readers see either the old set or the new one
        self.allocations.insert(target_id.to_string(), rows);
        for id in stale {
            self.allocation_owner.remove(&id);
        }
        Ok(count)
    }

    async fn update_allocation(
        &self,
        allocation_id: &str,
        patch: AllocationPatch,
    ) -> Result<DailyAllocation> {
        let target_id = self
            .allocation_owner
            .get(allocation_id)
            .map(|owner| owner.value().clone())
            .ok_or_else(|| Error::AllocationNotFound(allocation_id.to_string()))?;
        let mut rows = self
            .allocations
            .get_mut(&target_id)
            .ok_or_else(|| Error::AllocationNotFound(allocation_id.to_string()))?;
        let row = rows
            .iter_mut()
            .find(|a| a.id == allocation_id)
            .ok_or_else(|| Error::AllocationNotFound(allocation_id.to_string()))?;
        patch.apply(row);
        Ok(row.clone())
    }
}

impl SalesJournalTrait for InMemoryStore {
    fn load_sales_for_branch_and_date(&self, branch_id: &str, date: NaiveDate) -> Result<Decimal> {
        Ok(self
            .daily_sales
            .get(&(branch_id.to_string(), date))
            .map(|amount| *amount.value())
            .unwrap_or(Decimal::ZERO))
    }

    fn load_cashier_sales(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CashierSales>> {
        Ok(self
            .cashier_sales
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|s| start <= s.sale_date && s.sale_date <= end)
            .cloned()
            .collect())
    }
}

impl HolidayCalendar for InMemoryStore {
    fn holidays_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<HolidayRange>> {
        Ok(self
            .holidays
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|h| h.overlaps(start, end))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HolidayRepositoryTrait for InMemoryStore {
    async fn insert_holiday(&self, holiday: HolidayRange) -> Result<HolidayRange> {
        self.holidays
            .write()
            .map_err(poisoned)?
            .push(holiday.clone());
        Ok(holiday)
    }

    async fn delete_holiday(&self, holiday_id: &str) -> Result<usize> {
        let mut holidays = self.holidays.write().map_err(poisoned)?;
        let before = holidays.len();
        holidays.retain(|h| h.id != holiday_id);
        Ok(before - holidays.len())
    }
}
