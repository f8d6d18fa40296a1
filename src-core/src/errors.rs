use thiserror::Error;

use crate::targets::targets_model::TargetStatus;

/// Custom result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the target engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid weight profile '{profile_id}': {message}")]
    InvalidProfile { profile_id: String, message: String },

    #[error("A target already exists for branch {branch_id} in {year_month}")]
    DuplicateTarget {
        branch_id: String,
        year_month: String,
    },

    #[error("Target {target_id} is {status} and cannot be edited")]
    TargetNotEditable {
        target_id: String,
        status: TargetStatus,
    },

    #[error("Allocation {0} not found")]
    AllocationNotFound(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Target {target_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        target_id: String,
        from: TargetStatus,
        to: TargetStatus,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Repository error: {0}")]
    Repository(String),
}

/// Input validation errors, carrying the offending field where there is one
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid {field}: {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: String, end: String },
}

impl ValidationError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl Error {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}
