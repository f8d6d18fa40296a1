use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Weekday order of the weight arrays (index = days from Sunday)
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Expected share of monthly sales per weekday, Sunday first.
/// Weights are percentages but need not sum to 100; see [`WeightProfile::normalized_weights`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightProfile {
    pub id: String,
    pub name: String,
    pub weights: [Decimal; 7],
    pub is_default: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWeightProfile {
    pub name: String,
    pub weights: [Decimal; 7],
    #[serde(default)]
    pub is_default: bool,
}

impl NewWeightProfile {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::field("name", "profile name cannot be empty").into());
        }
        for (idx, weight) in self.weights.iter().enumerate() {
            if *weight < Decimal::ZERO {
                return Err(ValidationError::field(
                    "weights",
                    format!("{} weight {} is negative", WEEKDAY_NAMES[idx], weight),
                )
                .into());
            }
        }
        Ok(())
    }

    pub fn into_profile(self, id: String) -> WeightProfile {
        WeightProfile {
            id,
            name: self.name.trim().to_string(),
            weights: self.weights,
            is_default: self.is_default,
            is_active: true,
        }
    }
}

impl WeightProfile {
    /// Flat profile used when no default profile has been configured
    pub fn equal_weights() -> Self {
        Self {
            id: "equal".to_string(),
            name: "Equal weights".to_string(),
            weights: [dec!(1); 7],
            is_default: false,
            is_active: true,
        }
    }

    pub fn total_weight(&self) -> Decimal {
        self.weights.iter().copied().sum()
    }

    /// Weights scaled so the seven of them sum to 100
    pub fn normalized_weights(&self) -> Result<[Decimal; 7]> {
        if self.weights.iter().any(|w| *w < Decimal::ZERO) {
            return Err(Error::InvalidProfile {
                profile_id: self.id.clone(),
                message: "weekday weights cannot be negative".to_string(),
            });
        }
        let total = self.total_weight();
        if total <= Decimal::ZERO {
            return Err(Error::InvalidProfile {
                profile_id: self.id.clone(),
                message: "all weekday weights are zero".to_string(),
            });
        }
        let mut normalized = [Decimal::ZERO; 7];
        for (slot, weight) in normalized.iter_mut().zip(self.weights.iter()) {
            *slot = *weight / total * dec!(100);
        }
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(weights: [Decimal; 7]) -> WeightProfile {
        WeightProfile {
            id: "p-1".to_string(),
            name: "Test".to_string(),
            weights,
            is_default: true,
            is_active: true,
        }
    }

    #[test]
    fn test_normalized_weights_sum_to_100() {
        let p = profile([dec!(3), dec!(1), dec!(1), dec!(1), dec!(2), dec!(4), dec!(5)]);
        let normalized = p.normalized_weights().unwrap();
        let sum: Decimal = normalized.iter().copied().sum();
        assert!((sum - dec!(100)).abs() < dec!(0.000001));
        // Saturday (5) is five times Monday (1)
        assert!((normalized[6] - normalized[1] * dec!(5)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_already_normalized_profile_is_unchanged() {
        let p = profile([dec!(10), dec!(10), dec!(10), dec!(10), dec!(20), dec!(25), dec!(15)]);
        let normalized = p.normalized_weights().unwrap();
        assert_eq!(normalized[5], dec!(25));
    }

    #[test]
    fn test_all_zero_weights_is_invalid() {
        let p = profile([Decimal::ZERO; 7]);
        assert!(matches!(p.normalized_weights(), Err(Error::InvalidProfile { .. })));
    }

    #[test]
    fn test_new_profile_validation() {
        let mut new_profile = NewWeightProfile {
            name: "Weekend heavy".to_string(),
            weights: [dec!(20), dec!(10), dec!(10), dec!(10), dec!(10), dec!(20), dec!(20)],
            is_default: false,
        };
        assert!(new_profile.validate().is_ok());

        new_profile.weights[2] = dec!(-1);
        assert!(new_profile.validate().is_err());

        new_profile.weights[2] = dec!(1);
        new_profile.name = "  ".to_string();
        assert!(new_profile.validate().is_err());
    }
}
