pub(crate) mod allocation_generator;
pub(crate) mod targets_model;
pub(crate) mod targets_service;
pub(crate) mod targets_traits;

pub use allocation_generator::{generate, round_amount, total_allocated};
pub use targets_model::{
    AllocationPatch, AllocationSource, DailyAllocation, MonthlyTarget, NewMonthlyTarget,
    TargetStatus,
};
pub use targets_service::TargetService;
pub use targets_traits::{SalesJournalTrait, TargetRepositoryTrait, TargetServiceTrait};
