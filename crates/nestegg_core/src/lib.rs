//! Canadian retirement withdrawal and tax simulation library
//!
//! This crate projects a household's accounts year by year through retirement.
//! It supports:
//! - One or two persons, each with TFSA, RRSP/RRIF, non-registered and
//!   corporate accounts
//! - CPP, OAS and GIS with deferral factors, the OAS clawback and the GIS means test
//! - Federal and provincial income tax with credits, dividend gross-up, capital
//!   gains inclusion and RRIF pension splitting
//! - Ordered withdrawal strategies sized against after-tax spending needs
//! - Surplus reinvestment under TFSA room
//! - A 0-100 plan health score, what-if comparisons and Monte Carlo trials
//!
//! # Builder DSL
//!
//! ```ignore
//! use nestegg_core::config::{HouseholdBuilder, PersonBuilder};
//! use nestegg_core::simulation::run_simulation;
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
//!
//! let outcome = run_simulation(&input)?;
//! println!("{:?}", outcome.summary.health_rating);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod benefits;
pub mod error;
pub mod health;
pub mod reinvest;
pub mod simulation;
pub mod simulation_state;
pub mod taxes;
pub mod what_if;
pub mod withdrawal;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::{HouseholdBuilder, PersonBuilder};
pub use error::{ComputationError, SimulationError, ValidationError, ValidationErrors};
pub use simulation::{
    monte_carlo_simulate, monte_carlo_simulate_with_cancel, run_simulation, run_with_market,
    simulate,
};
pub use what_if::{WhatIfAdjustments, WhatIfComparison, compare_what_if, simulate_what_if};
