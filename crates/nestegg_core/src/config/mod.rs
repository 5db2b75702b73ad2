//! Household configuration
//!
//! `HouseholdInput` (in `model`) is the one input type. This module holds the
//! defaults serde and the builders share, the builders themselves, and
//! validation.
//!
//! # Builder DSL
//!
//! ```ignore
//! use nestegg_core::config::{HouseholdBuilder, PersonBuilder};
//! use nestegg_core::model::{Province, Strategy};
//!
//! let input = HouseholdBuilder::new()
//!     .start_year(2025)
//!     .province(Province::BritishColumbia)
//!     .strategy(Strategy::MinimizeIncome)
//!     .person1(PersonBuilder::new(66).rrif(400_000.0).tfsa(90_000.0, 20_000.0))
//!     .person2(PersonBuilder::new(63).rrsp(250_000.0).cpp_start_age(70))
//!     .spending_phases(80_000.0, 65_000.0, 55_000.0)
//!     .income_split(0.5)
//!     .build()?;
//! ```

mod builder;
pub mod defaults;
mod person_builder;
mod validation;

pub use builder::HouseholdBuilder;
pub use person_builder::PersonBuilder;
pub use validation::{
    CONVERSION_AGE_RANGE, CPP_AGE_RANGE, INFLATION_RANGE, MAX_AGE, OAS_AGE_RANGE, YIELD_RANGE,
};
