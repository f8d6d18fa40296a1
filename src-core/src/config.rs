use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::errors::{Result, ValidationError};
use crate::leaderboard::RankingMode;

/// Tunables for allocation rounding, alert tiers and leaderboard ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Decimal places kept on allocated daily amounts (0 = whole currency units)
    pub amount_scale: u32,
    /// Projected achievement below this percent is critical
    pub critical_threshold_percent: Decimal,
    /// Projected achievement below this percent is a warning
    pub warning_threshold_percent: Decimal,
    pub ranking_mode: RankingMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            amount_scale: 0,
            critical_threshold_percent: dec!(80),
            warning_threshold_percent: dec!(100),
            ranking_mode: RankingMode::Sequential,
        }
    }
}

impl EngineConfig {
    /// Load overrides from the environment (and `.env` if present).
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = EngineConfig::default();

        if let Some(raw) = read_var("TARGETS_AMOUNT_SCALE") {
            config.amount_scale = raw.parse().map_err(|_| {
                ValidationError::field("TARGETS_AMOUNT_SCALE", format!("'{}' is not a number", raw))
            })?;
        }
        if let Some(raw) = read_var("TARGETS_CRITICAL_PERCENT") {
            config.critical_threshold_percent = parse_percent("TARGETS_CRITICAL_PERCENT", &raw)?;
        }
        if let Some(raw) = read_var("TARGETS_WARNING_PERCENT") {
            config.warning_threshold_percent = parse_percent("TARGETS_WARNING_PERCENT", &raw)?;
        }
        if let Some(raw) = read_var("TARGETS_RANKING_MODE") {
            config.ranking_mode = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.amount_scale > 4 {
            return Err(ValidationError::field(
                "amountScale",
                format!("{} decimal places is more than currency amounts carry", self.amount_scale),
            )
            .into());
        }
        if self.critical_threshold_percent <= Decimal::ZERO
            || self.critical_threshold_percent > self.warning_threshold_percent
        {
            return Err(ValidationError::field(
                "criticalThresholdPercent",
                format!(
                    "must be positive and not above the warning threshold ({} > {})",
                    self.critical_threshold_percent, self.warning_threshold_percent
                ),
            )
            .into());
        }
        Ok(())
    }
}

fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_percent(name: &str, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|_| ValidationError::field(name, format!("'{}' is not a decimal number", raw)).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.amount_scale, 0);
        assert_eq!(config.ranking_mode, RankingMode::Sequential);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let config = EngineConfig {
            critical_threshold_percent: dec!(110),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"amountScale": 2}"#).unwrap();
        assert_eq!(config.amount_scale, 2);
        assert_eq!(config.warning_threshold_percent, dec!(100));
    }
}
