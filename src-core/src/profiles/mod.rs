pub(crate) mod profiles_model;

pub use profiles_model::{NewWeightProfile, WeightProfile, WEEKDAY_NAMES};
