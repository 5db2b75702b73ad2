use serde::{Deserialize, Serialize};

/// Government benefit parameters in base-year dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenefitConfig {
    /// Maximum annual CPP retirement pension when starting at 65
    pub cpp_max_at_65: f64,
    pub cpp_early_reduction_per_month: f64,
    pub cpp_late_increase_per_month: f64,
    pub cpp_earliest_age: u32,
    pub cpp_latest_age: u32,

    /// Maximum annual OAS pension when starting at 65
    pub oas_max_at_65: f64,
    pub oas_deferral_increase_per_month: f64,
    pub oas_earliest_age: u32,
    pub oas_latest_age: u32,
    /// Permanent increase from age 75
    pub oas_age_75_increase: f64,

    pub gis_max_single: f64,
    /// Per-person maximum when both spouses receive OAS
    pub gis_max_couple: f64,
    /// Benefit reduction per dollar of non-OAS income (single)
    pub gis_reduction_rate_single: f64,
    /// Per-person reduction per dollar of combined non-OAS income (couple)
    pub gis_reduction_rate_couple: f64,
}

impl Default for BenefitConfig {
    fn default() -> Self {
        Self {
            cpp_max_at_65: 17_196.0,
            cpp_early_reduction_per_month: 0.006,
            cpp_late_increase_per_month: 0.007,
            cpp_earliest_age: 60,
            cpp_latest_age: 70,

            oas_max_at_65: 8_732.0,
            oas_deferral_increase_per_month: 0.006,
            oas_earliest_age: 65,
            oas_latest_age: 70,
            oas_age_75_increase: 0.10,

            gis_max_single: 13_043.0,
            gis_max_couple: 7_851.0,
            gis_reduction_rate_single: 0.50,
            gis_reduction_rate_couple: 0.25,
        }
    }
}
