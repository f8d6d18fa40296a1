//! Monthly sales target allocation and achievement tracking for bakery branches.
//!
//! A [`targets::MonthlyTarget`] is spread over the days of its month by the
//! allocation generator, using a weekday [`profiles::WeightProfile`] and the
//! holiday calendar. Recorded sales are then compared against those daily
//! allocations to produce progress, leaderboards and alerts.

pub mod achievements;
pub mod alerts;
pub mod branches;
pub mod bulk;
pub mod calendar;
pub mod config;
pub mod errors;
pub mod holidays;
pub mod leaderboard;
pub mod profiles;
pub mod storage;
pub mod targets;

pub use errors::{Error, Result};
