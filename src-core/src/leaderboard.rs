use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    AchievedAmount,
    AchievementPercent,
}

/// How equal metric values are ranked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// 1, 2, 3, ... in sorted order, ties broken by entity id
    Sequential,
    /// Standard competition ranking: ties share a rank, the next rank skips (1, 1, 3)
    Shared,
}

impl FromStr for RankingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" => Ok(RankingMode::Sequential),
            "shared" => Ok(RankingMode::Shared),
            other => Err(ValidationError::field(
                "rankingMode",
                format!("'{}' is not one of sequential, shared", other),
            )),
        }
    }
}

/// A branch or cashier with its achieved sales for the period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub entity_id: String,
    pub entity_name: String,
    pub achieved_amount: Decimal,
    pub target_amount: Option<Decimal>,
    pub achievement_percent: Option<Decimal>,
}

impl LeaderboardEntry {
    fn metric_value(&self, metric: RankMetric) -> Decimal {
        match metric {
            RankMetric::AchievedAmount => self.achieved_amount,
            RankMetric::AchievementPercent => self.achievement_percent.unwrap_or(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntity {
    pub rank: u32,
    pub metric_value: Decimal,
    #[serde(flatten)]
    pub entry: LeaderboardEntry,
}

/// Sort entries by `metric` (descending, ties by entity id) and number them
pub fn rank(entries: Vec<LeaderboardEntry>, metric: RankMetric, mode: RankingMode) -> Vec<RankedEntity> {
    let mut scored: Vec<(Decimal, LeaderboardEntry)> = entries
        .into_iter()
        .map(|entry| (entry.metric_value(metric), entry))
        .collect();

    scored.sort_by(|(a_value, a), (b_value, b)| match b_value.cmp(a_value) {
        Ordering::Equal => a.entity_id.cmp(&b.entity_id),
        other => other,
    });

    let mut ranked: Vec<RankedEntity> = Vec::with_capacity(scored.len());
    for (position, (metric_value, entry)) in scored.into_iter().enumerate() {
        let sequential = position as u32 + 1;
        let rank = match (mode, ranked.last()) {
            (RankingMode::Shared, Some(previous)) if previous.metric_value == metric_value => {
                previous.rank
            }
            _ => sequential,
        };
        ranked.push(RankedEntity {
            rank,
            metric_value,
            entry,
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(id: &str, achieved: Decimal, percent: Decimal) -> LeaderboardEntry {
        LeaderboardEntry {
            entity_id: id.to_string(),
            entity_name: format!("Branch {}", id),
            achieved_amount: achieved,
            target_amount: None,
            achievement_percent: Some(percent),
        }
    }

    fn ids(ranked: &[RankedEntity]) -> Vec<&str> {
        ranked.iter().map(|r| r.entry.entity_id.as_str()).collect()
    }

    #[test]
    fn test_sorts_descending_by_amount() {
        let ranked = rank(
            vec![
                entry("a", dec!(100), dec!(90)),
                entry("b", dec!(300), dec!(50)),
                entry("c", dec!(200), dec!(120)),
            ],
            RankMetric::AchievedAmount,
            RankingMode::Sequential,
        );
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_percent_metric_changes_order() {
        let ranked = rank(
            vec![
                entry("a", dec!(100), dec!(90)),
                entry("b", dec!(300), dec!(50)),
                entry("c", dec!(200), dec!(120)),
            ],
            RankMetric::AchievementPercent,
            RankingMode::Sequential,
        );
        assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_ties_break_by_id_with_sequential_ranks() {
        let ranked = rank(
            vec![
                entry("z", dec!(100), dec!(10)),
                entry("m", dec!(100), dec!(10)),
                entry("a", dec!(50), dec!(5)),
            ],
            RankMetric::AchievedAmount,
            RankingMode::Sequential,
        );
        assert_eq!(ids(&ranked), vec!["m", "z", "a"]);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_shared_mode_uses_competition_ranking() {
        let ranked = rank(
            vec![
                entry("z", dec!(100), dec!(10)),
                entry("m", dec!(100), dec!(10)),
                entry("a", dec!(50), dec!(5)),
                entry("b", dec!(20), dec!(2)),
            ],
            RankMetric::AchievedAmount,
            RankingMode::Shared,
        );
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 1, 3, 4]);
    }

    #[test]
    fn test_ranking_mode_from_str() {
        assert_eq!("Shared".parse::<RankingMode>().unwrap(), RankingMode::Shared);
        assert!("dense".parse::<RankingMode>().is_err());
    }
}
