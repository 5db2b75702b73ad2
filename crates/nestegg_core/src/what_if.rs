//! What-if adjustments
//!
//! A bounded set of changes applied to a copy of the household, followed by an
//! ordinary run. The baseline input is never modified.

use serde::{Deserialize, Serialize};

use crate::benefits::{cpp_adjustment_factor, oas_deferral_factor};
use crate::config::{CPP_AGE_RANGE, OAS_AGE_RANGE};
use crate::error::{SimulationError, ValidationCode, ValidationError, ValidationErrors};
use crate::model::{HouseholdInput, SimulationOutcome, SimulationResponse, SummaryDiff};
use crate::simulation::run_simulation;

pub const SPENDING_MULTIPLIER_RANGE: (f64, f64) = (0.5, 1.5);

const fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhatIfAdjustments {
    /// Applied to every spending phase; must be within `SPENDING_MULTIPLIER_RANGE`
    #[serde(default = "one")]
    pub spending_multiplier: f64,
    /// Years added to each person's retirement age, clamped to their lifetime
    #[serde(default)]
    pub retirement_age_shift: i32,
    #[serde(default)]
    pub cpp_start_age_shift: i32,
    #[serde(default)]
    pub oas_start_age_shift: i32,
}

impl Default for WhatIfAdjustments {
    fn default() -> Self {
        Self {
            spending_multiplier: 1.0,
            retirement_age_shift: 0,
            cpp_start_age_shift: 0,
            oas_start_age_shift: 0,
        }
    }
}

impl WhatIfAdjustments {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let (lo, hi) = SPENDING_MULTIPLIER_RANGE;
        let m = self.spending_multiplier;
        if !m.is_finite() {
            return Err(ValidationError::new(
                "spending_multiplier",
                "must be a finite number",
                ValidationCode::NotFinite,
            )
            .into());
        }
        if m < lo || m > hi {
            return Err(ValidationError::new(
                "spending_multiplier",
                format!("must be between {lo} and {hi}"),
                ValidationCode::OutOfRange,
            )
            .into());
        }
        Ok(())
    }

    /// A copy of `input` with the adjustments applied
    pub fn apply(&self, input: &HouseholdInput) -> Result<HouseholdInput, ValidationErrors> {
        self.validate()?;
        let mut adjusted = input.clone();
        let m = self.spending_multiplier;
        adjusted.spending_go_go = adjusted_spending(adjusted.spending_go_go, m);
        adjusted.spending_slow_go = adjusted.spending_slow_go.map(|s| adjusted_spending(s, m));
        adjusted.spending_no_go = adjusted.spending_no_go.map(|s| adjusted_spending(s, m));

        let household_end_age = adjusted.end_age;
        let benefits = adjusted.resolved_benefit_config();
        for person in adjusted.persons_mut() {
            if self.retirement_age_shift != 0 {
                let lifetime = (person.start_age, person.end_age_or(household_end_age));
                person.retirement_age = Some(shift_age(
                    person.retirement_age(),
                    self.retirement_age_shift,
                    lifetime,
                ));
            }

            let cpp_age = shift_age(person.cpp_start_age, self.cpp_start_age_shift, CPP_AGE_RANGE);
            if let Some(amount) = person.cpp_annual_at_start.as_mut() {
                *amount *= cpp_adjustment_factor(cpp_age, &benefits)
                    / cpp_adjustment_factor(person.cpp_start_age, &benefits);
            }
            person.cpp_start_age = cpp_age;

            let oas_age = shift_age(person.oas_start_age, self.oas_start_age_shift, OAS_AGE_RANGE);
            if let Some(amount) = person.oas_annual_at_start.as_mut() {
                *amount *= oas_deferral_factor(oas_age, &benefits)
                    / oas_deferral_factor(person.oas_start_age, &benefits);
            }
            person.oas_start_age = oas_age;
        }
        tracing::debug!(adjustments = ?self, "applied what-if adjustments");
        Ok(adjusted)
    }
}

/// Spending after the multiplier, rounded to whole dollars
#[must_use]
pub fn adjusted_spending(amount: f64, multiplier: f64) -> f64 {
    (amount * multiplier).round()
}

/// `age + shift`, clamped into `[lo, hi]`
#[must_use]
pub fn shift_age(age: u32, shift: i32, (lo, hi): (u32, u32)) -> u32 {
    let shifted = i64::from(age) + i64::from(shift);
    let clamped = shifted.clamp(i64::from(lo), i64::from(hi.max(lo)));
    u32::try_from(clamped).unwrap_or(lo)
}

/// Run the adjusted household
pub fn run_what_if(
    input: &HouseholdInput,
    adjustments: &WhatIfAdjustments,
) -> Result<SimulationOutcome, SimulationError> {
    let adjusted = adjustments.apply(input)?;
    run_simulation(&adjusted)
}

#[must_use]
pub fn simulate_what_if(
    input: &HouseholdInput,
    adjustments: &WhatIfAdjustments,
) -> SimulationResponse {
    SimulationResponse::from_result(run_what_if(input, adjustments))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfComparison {
    pub baseline: SimulationOutcome,
    pub adjusted: SimulationOutcome,
    pub diff: SummaryDiff,
}

/// Run the baseline and the adjusted household and diff their summaries
pub fn compare_what_if(
    input: &HouseholdInput,
    adjustments: &WhatIfAdjustments,
) -> Result<WhatIfComparison, SimulationError> {
    #[cfg(feature = "parallel")]
    let (baseline, adjusted) = rayon::join(
        || run_simulation(input),
        || run_what_if(input, adjustments),
    );
    #[cfg(not(feature = "parallel"))]
    let (baseline, adjusted) = (run_simulation(input), run_what_if(input, adjustments));

    let (baseline, adjusted) = (baseline?, adjusted?);
    let diff = SummaryDiff::between(&baseline.summary, &adjusted.summary);
    Ok(WhatIfComparison {
        baseline,
        adjusted,
        diff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_age_clamps() {
        assert_eq!(shift_age(65, 5, CPP_AGE_RANGE), 70);
        assert_eq!(shift_age(65, -10, CPP_AGE_RANGE), 60);
        assert_eq!(shift_age(65, 9, OAS_AGE_RANGE), 70);
        assert_eq!(shift_age(66, -3, OAS_AGE_RANGE), 65);
    }

    #[test]
    fn spending_is_rounded() {
        assert_eq!(adjusted_spending(60_000.0, 1.2), 72_000.0);
        assert_eq!(adjusted_spending(33_333.0, 1.1), 36_666.0);
    }

    #[test]
    fn multiplier_outside_range_is_rejected() {
        let adj = WhatIfAdjustments {
            spending_multiplier: 1.6,
            ..WhatIfAdjustments::default()
        };
        let err = adj.validate().unwrap_err();
        assert_eq!(err.0[0].field, "spending_multiplier");
        assert_eq!(err.0[0].code, ValidationCode::OutOfRange);

        let nan = WhatIfAdjustments {
            spending_multiplier: f64::NAN,
            ..WhatIfAdjustments::default()
        };
        assert_eq!(nan.validate().unwrap_err().0[0].code, ValidationCode::NotFinite);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let adj: WhatIfAdjustments = serde_json::from_str(r#"{"cpp_start_age_shift": 2}"#).unwrap();
        assert_eq!(adj.spending_multiplier, 1.0);
        assert_eq!(adj.cpp_start_age_shift, 2);
        assert!(serde_json::from_str::<WhatIfAdjustments>(r#"{"bogus": 1}"#).is_err());
    }
}
