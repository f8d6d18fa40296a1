pub(crate) mod achievement_aggregator;
pub(crate) mod achievement_model;

pub use achievement_aggregator::aggregate;
pub use achievement_model::{BranchProgress, CashierSales, DailyProgress};
