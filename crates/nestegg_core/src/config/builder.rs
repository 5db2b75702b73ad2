//! Household Builder
//!
//! The fluent way to assemble a `HouseholdInput`. `build` runs the same
//! validation as the JSON entry points, so a built household is always safe to
//! simulate.
//!
//! # Example
//!
//! ```ignore
//! use nestegg_core::config::{HouseholdBuilder, PersonBuilder};
//!
//! let input = HouseholdBuilder::new()
//!     .start_year(2025)
//!     .person1(PersonBuilder::new(65)
//!         .cpp(65, 10_000.0)
//!         .oas(65, 8_000.0)
//!         .rrif(100_000.0)
//!         .pension("Employer DB", 24_000.0, 65, true))
//!     .spending(60_000.0)
//!     .build()?;
//! ```

use super::defaults;
use super::person_builder::PersonBuilder;
use crate::error::ValidationErrors;
use crate::model::{
    BenefitConfig, HouseholdInput, Province, ReinvestWeights, RrifTable, Strategy, TaxConfig,
};

#[derive(Debug, Clone)]
pub struct HouseholdBuilder {
    input: HouseholdInput,
}

impl Default for HouseholdBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HouseholdBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: HouseholdInput {
                person1: None,
                person2: None,
                province: Province::default(),
                start_year: None,
                end_age: defaults::END_AGE,
                strategy: Strategy::default(),
                spending_go_go: 0.0,
                spending_slow_go: None,
                spending_no_go: None,
                slow_go_start_age: defaults::SLOW_GO_START_AGE,
                no_go_start_age: defaults::NO_GO_START_AGE,
                spending_inflation: defaults::SPENDING_INFLATION,
                general_inflation: defaults::GENERAL_INFLATION,
                gap_tolerance: defaults::GAP_TOLERANCE,
                reinvest_nonreg_dist: true,
                income_split_rrif_fraction: 0.0,
                stop_on_fail: false,
                nonreg_reinvest_weights: ReinvestWeights::default(),
                tax_config: None,
                benefit_config: None,
                rrif_table: None,
            },
        }
    }

    #[must_use]
    pub fn person1(mut self, person: PersonBuilder) -> Self {
        self.input.person1 = Some(person.build_person());
        self
    }

    #[must_use]
    pub fn person2(mut self, person: PersonBuilder) -> Self {
        self.input.person2 = Some(person.build_person());
        self
    }

    #[must_use]
    pub fn province(mut self, province: Province) -> Self {
        self.input.province = province;
        self
    }

    #[must_use]
    pub fn start_year(mut self, year: i16) -> Self {
        self.input.start_year = Some(year);
        self
    }

    #[must_use]
    pub fn end_age(mut self, age: u32) -> Self {
        self.input.end_age = age;
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.input.strategy = strategy;
        self
    }

    /// Same after-tax spending in every phase
    #[must_use]
    pub fn spending(mut self, amount: f64) -> Self {
        self.input.spending_go_go = amount;
        self.input.spending_slow_go = None;
        self.input.spending_no_go = None;
        self
    }

    #[must_use]
    pub fn spending_phases(mut self, go_go: f64, slow_go: f64, no_go: f64) -> Self {
        self.input.spending_go_go = go_go;
        self.input.spending_slow_go = Some(slow_go);
        self.input.spending_no_go = Some(no_go);
        self
    }

    #[must_use]
    pub fn phase_ages(mut self, slow_go_start: u32, no_go_start: u32) -> Self {
        self.input.slow_go_start_age = slow_go_start;
        self.input.no_go_start_age = no_go_start;
        self
    }

    #[must_use]
    pub fn inflation(mut self, spending: f64, general: f64) -> Self {
        self.input.spending_inflation = spending;
        self.input.general_inflation = general;
        self
    }

    #[must_use]
    pub fn gap_tolerance(mut self, dollars: f64) -> Self {
        self.input.gap_tolerance = dollars;
        self
    }

    #[must_use]
    pub fn reinvest_distributions(mut self, reinvest: bool) -> Self {
        self.input.reinvest_nonreg_dist = reinvest;
        self
    }

    #[must_use]
    pub fn income_split(mut self, rrif_fraction: f64) -> Self {
        self.input.income_split_rrif_fraction = rrif_fraction;
        self
    }

    #[must_use]
    pub fn stop_on_fail(mut self, stop: bool) -> Self {
        self.input.stop_on_fail = stop;
        self
    }

    #[must_use]
    pub fn reinvest_weights(mut self, weights: ReinvestWeights) -> Self {
        self.input.nonreg_reinvest_weights = weights;
        self
    }

    #[must_use]
    pub fn tax_config(mut self, config: TaxConfig) -> Self {
        self.input.tax_config = Some(config);
        self
    }

    #[must_use]
    pub fn benefit_config(mut self, config: BenefitConfig) -> Self {
        self.input.benefit_config = Some(config);
        self
    }

    #[must_use]
    pub fn rrif_table(mut self, table: RrifTable) -> Self {
        self.input.rrif_table = Some(table);
        self
    }

    /// Validate and return the household
    pub fn build(self) -> Result<HouseholdInput, ValidationErrors> {
        self.input.validate()?;
        Ok(self.input)
    }

    /// Return the household without validating it
    #[must_use]
    pub fn build_unchecked(self) -> HouseholdInput {
        self.input
    }
}
