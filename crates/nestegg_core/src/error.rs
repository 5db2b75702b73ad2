use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{BucketKind, ErrorDetails, PersonSlot, YearResult};

/// Machine-readable category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    Missing,
    OutOfRange,
    Inconsistent,
    NotFinite,
}

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: ValidationCode,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ValidationCode) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code,
        }
    }
}

/// Every validation failure found in one input, reported together
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s)", self.0.len())?;
        for (i, e) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{e}")?;
        }
        Ok(())
    }
}

impl ValidationErrors {
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(e: ValidationError) -> Self {
        Self(vec![e])
    }
}

/// Broken engine invariant; aborts the run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    #[error("negative balance {balance:.2} in {bucket:?} of {person:?} in {year}")]
    NegativeBalance {
        year: i16,
        person: PersonSlot,
        bucket: BucketKind,
        balance: f64,
    },
    #[error(
        "{bucket:?} of {person:?} in {year} ended at {actual:.6}, flows imply {expected:.6}"
    )]
    BalanceMismatch {
        year: i16,
        person: PersonSlot,
        bucket: BucketKind,
        expected: f64,
        actual: f64,
    },
    #[error("non-finite {quantity} ({value}) in {year}")]
    NonFinite {
        year: i16,
        person: Option<PersonSlot>,
        bucket: Option<BucketKind>,
        quantity: &'static str,
        value: f64,
    },
    #[error("household has no person to simulate")]
    MissingPerson,
}

impl ComputationError {
    #[must_use]
    pub fn year(&self) -> Option<i16> {
        match self {
            ComputationError::NegativeBalance { year, .. }
            | ComputationError::BalanceMismatch { year, .. }
            | ComputationError::NonFinite { year, .. } => Some(*year),
            ComputationError::MissingPerson => None,
        }
    }

    #[must_use]
    pub fn person(&self) -> Option<PersonSlot> {
        match self {
            ComputationError::NegativeBalance { person, .. }
            | ComputationError::BalanceMismatch { person, .. } => Some(*person),
            ComputationError::NonFinite { person, .. } => *person,
            ComputationError::MissingPerson => None,
        }
    }

    #[must_use]
    pub fn bucket(&self) -> Option<BucketKind> {
        match self {
            ComputationError::NegativeBalance { bucket, .. }
            | ComputationError::BalanceMismatch { bucket, .. } => Some(*bucket),
            ComputationError::NonFinite { bucket, .. } => *bucket,
            ComputationError::MissingPerson => None,
        }
    }
}

/// Errors related to market/distribution operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarketError {
    #[error("invalid {profile_type} parameters (mean={mean}, std_dev={std_dev}): {reason}")]
    InvalidDistributionParameters {
        profile_type: &'static str,
        mean: f64,
        std_dev: f64,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("fatal computation error: {source}")]
    Computation {
        source: ComputationError,
        /// The failing year as far as it was computed
        snapshot: Option<Box<YearResult>>,
    },
    #[error(transparent)]
    Market(#[from] MarketError),
    #[error("simulation cancelled")]
    Cancelled,
}

impl From<ComputationError> for SimulationError {
    fn from(source: ComputationError) -> Self {
        SimulationError::Computation {
            source,
            snapshot: None,
        }
    }
}

impl SimulationError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            SimulationError::Validation(_) | SimulationError::Market(_) => "VALIDATION_ERROR",
            SimulationError::Computation { .. } => "FATAL_COMPUTATION_ERROR",
            SimulationError::Cancelled => "CANCELLED",
        }
    }

    #[must_use]
    pub fn details(&self) -> ErrorDetails {
        let mut details = ErrorDetails {
            code: self.code().to_string(),
            ..ErrorDetails::default()
        };
        match self {
            SimulationError::Validation(errors) => details.validation = errors.0.clone(),
            SimulationError::Computation { source, snapshot } => {
                details.year = source.year();
                details.person = source.person();
                details.bucket = source.bucket();
                details.snapshot = snapshot.clone();
            }
            SimulationError::Market(_) | SimulationError::Cancelled => {}
        }
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_display_lists_every_field() {
        let errors = ValidationErrors(vec![
            ValidationError::new("person1.start_age", "must be at most 110", ValidationCode::OutOfRange),
            ValidationError::new("spending_go_go", "must be finite", ValidationCode::NotFinite),
        ]);
        let text = errors.to_string();
        assert!(text.starts_with("2 invalid field(s): person1.start_age"));
        assert!(text.contains("; spending_go_go: must be finite"));
    }

    #[test]
    fn codes_are_stable() {
        let validation: SimulationError = ValidationErrors::default().into();
        assert_eq!(validation.code(), "VALIDATION_ERROR");
        let fatal: SimulationError = ComputationError::MissingPerson.into();
        assert_eq!(fatal.code(), "FATAL_COMPUTATION_ERROR");
        assert_eq!(SimulationError::Cancelled.code(), "CANCELLED");
    }

    #[test]
    fn computation_details_carry_context() {
        let err: SimulationError = ComputationError::NegativeBalance {
            year: 2030,
            person: PersonSlot::Person2,
            bucket: BucketKind::Tfsa,
            balance: -3.0,
        }
        .into();
        let details = err.details();
        assert_eq!(details.year, Some(2030));
        assert_eq!(details.person, Some(PersonSlot::Person2));
        assert_eq!(details.bucket, Some(BucketKind::Tfsa));
    }
}
