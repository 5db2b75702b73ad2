//! Default values for every optional `HouseholdInput` and `Person` field
//!
//! Serde `default = "..."` attributes and the builders both read from here so a
//! value omitted from JSON and a value omitted from a builder resolve identically.

pub const END_AGE: u32 = 95;
pub const CPP_START_AGE: u32 = 65;
pub const OAS_START_AGE: u32 = 65;
pub const RRSP_CONVERSION_AGE: u32 = 71;

pub const TFSA_ROOM_ANNUAL_GROWTH: f64 = 7_000.0;

pub const REGISTERED_YIELD: f64 = 0.05;
pub const CASH_YIELD: f64 = 0.02;
pub const GIC_YIELD: f64 = 0.035;
pub const INVEST_YIELD: f64 = 0.05;
pub const INVEST_DIVIDEND_YIELD: f64 = 0.02;

pub const SLOW_GO_START_AGE: u32 = 75;
pub const NO_GO_START_AGE: u32 = 85;
pub const SPENDING_INFLATION: f64 = 0.02;
pub const GENERAL_INFLATION: f64 = 0.02;

/// Shortfall in dollars still counted as a funded year
pub const GAP_TOLERANCE: f64 = 1.0;

pub(crate) const fn end_age() -> u32 {
    END_AGE
}

pub(crate) const fn cpp_start_age() -> u32 {
    CPP_START_AGE
}

pub(crate) const fn oas_start_age() -> u32 {
    OAS_START_AGE
}

pub(crate) const fn rrsp_conversion_age() -> u32 {
    RRSP_CONVERSION_AGE
}

pub(crate) const fn tfsa_room_annual_growth() -> f64 {
    TFSA_ROOM_ANNUAL_GROWTH
}

pub(crate) const fn registered_yield() -> f64 {
    REGISTERED_YIELD
}

pub(crate) const fn cash_yield() -> f64 {
    CASH_YIELD
}

pub(crate) const fn gic_yield() -> f64 {
    GIC_YIELD
}

pub(crate) const fn invest_yield() -> f64 {
    INVEST_YIELD
}

pub(crate) const fn invest_dividend_yield() -> f64 {
    INVEST_DIVIDEND_YIELD
}

pub(crate) const fn slow_go_start_age() -> u32 {
    SLOW_GO_START_AGE
}

pub(crate) const fn no_go_start_age() -> u32 {
    NO_GO_START_AGE
}

pub(crate) const fn spending_inflation() -> f64 {
    SPENDING_INFLATION
}

pub(crate) const fn general_inflation() -> f64 {
    GENERAL_INFLATION
}

pub(crate) const fn gap_tolerance() -> f64 {
    GAP_TOLERANCE
}

pub(crate) const fn yes() -> bool {
    true
}
