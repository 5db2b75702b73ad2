//! Scenario tests for the nestegg simulation engine
//!
//! Tests are organized by topic:
//! - `scenarios` - Full-household runs: retiree baseline, couples, survivors
//! - `single_person` - Households with one present person and age-gated benefits
//! - `conversion` - RRSP to RRIF conversion and RRIF minimums
//! - `waterfall` - Strategy tier order, shortfalls, corporate refunds, reinvestment
//! - `what_if` - Adjusted re-runs and comparisons
//! - `monte_carlo` - Seeded trials, determinism and cancellation
//! - `properties` - Property tests for conservation and non-negativity

mod scenarios;
mod waterfall;

use crate::config::{HouseholdBuilder, PersonBuilder};
use crate::model::{HouseholdInput, SimulationOutcome};
use crate::simulation::run_simulation;

/// Single 65-year-old with a pension, CPP, OAS and a modest RRIF
pub(crate) fn retiree() -> HouseholdInput {
    HouseholdBuilder::new()
        .start_year(2025)
        .person1(
            PersonBuilder::new(65)
                .cpp(65, 10_000.0)
                .oas(65, 8_000.0)
                .rrif(100_000.0)
                .pension("Employer", 24_000.0, 65, true),
        )
        .spending(60_000.0)
        .build()
        .unwrap()
}

/// Person with no CPP or OAS and no investment growth
pub(crate) fn bare_person(age: u32) -> PersonBuilder {
    PersonBuilder::new(age).cpp(65, 0.0).oas(65, 0.0).no_growth()
}

pub(crate) fn run(input: &HouseholdInput) -> SimulationOutcome {
    run_simulation(input).unwrap()
}
