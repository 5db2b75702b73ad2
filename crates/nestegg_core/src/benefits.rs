//! Government retirement benefits
//!
//! CPP and OAS depend only on age and the chosen start age. GIS is means-tested
//! on income other than OAS, which itself depends on withdrawals; the yearly
//! loop resolves that circularity by iterating (see `simulation`).

use serde::{Deserialize, Serialize};

use crate::model::{BenefitConfig, Person};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Couple,
}

/// Age-based benefits one person receives in one year, before clawback
///
/// GIS is not included; it depends on the year's withdrawals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BenefitAmounts {
    pub cpp: f64,
    pub oas: f64,
}

/// Multiplier applied to the age-65 CPP pension for a given start age
#[must_use]
pub fn cpp_adjustment_factor(start_age: u32, config: &BenefitConfig) -> f64 {
    let age = start_age
        .min(config.cpp_latest_age)
        .max(config.cpp_earliest_age);
    let months = (f64::from(age) - 65.0) * 12.0;
    if months < 0.0 {
        1.0 + months * config.cpp_early_reduction_per_month
    } else {
        1.0 + months * config.cpp_late_increase_per_month
    }
}

/// Multiplier applied to the age-65 OAS pension for a deferred start
#[must_use]
pub fn oas_deferral_factor(start_age: u32, config: &BenefitConfig) -> f64 {
    let age = start_age
        .min(config.oas_latest_age)
        .max(config.oas_earliest_age);
    1.0 + (f64::from(age) - 65.0) * 12.0 * config.oas_deferral_increase_per_month
}

/// CPP pension at `age`; zero before the person's start age
#[must_use]
pub fn cpp_amount(person: &Person, age: u32, index_factor: f64, config: &BenefitConfig) -> f64 {
    if age < person.cpp_start_age.max(config.cpp_earliest_age) {
        return 0.0;
    }
    let at_start = person.cpp_annual_at_start.unwrap_or_else(|| {
        config.cpp_max_at_65 * cpp_adjustment_factor(person.cpp_start_age, config)
    });
    at_start * index_factor
}

/// OAS pension at `age`, before clawback; zero before `max(65, start age)`
#[must_use]
pub fn oas_amount(person: &Person, age: u32, index_factor: f64, config: &BenefitConfig) -> f64 {
    if age < person.oas_start_age.max(config.oas_earliest_age) {
        return 0.0;
    }
    let at_start = person.oas_annual_at_start.unwrap_or_else(|| {
        config.oas_max_at_65 * oas_deferral_factor(person.oas_start_age, config)
    });
    let age_75 = if age >= 75 {
        1.0 + config.oas_age_75_increase
    } else {
        1.0
    };
    at_start * age_75 * index_factor
}

/// OAS recovery tax: `rate` on net income above `threshold`, capped at OAS received
#[must_use]
pub fn oas_clawback(net_income: f64, oas_received: f64, threshold: f64, rate: f64) -> f64 {
    (rate * (net_income - threshold)).clamp(0.0, oas_received.max(0.0))
}

/// GIS for one person
///
/// `income_excluding_oas` is the person's own income when single and the
/// couple's combined income otherwise.
#[must_use]
pub fn gis_amount(
    income_excluding_oas: f64,
    status: MaritalStatus,
    receives_oas: bool,
    index_factor: f64,
    config: &BenefitConfig,
) -> f64 {
    if !receives_oas {
        return 0.0;
    }
    let (maximum, reduction) = match status {
        MaritalStatus::Single => (config.gis_max_single, config.gis_reduction_rate_single),
        MaritalStatus::Couple => (config.gis_max_couple, config.gis_reduction_rate_couple),
    };
    (maximum * index_factor - reduction * income_excluding_oas.max(0.0)).max(0.0)
}

/// CPP and OAS for a person at `age`
#[must_use]
pub fn age_based_benefits(
    person: &Person,
    age: u32,
    index_factor: f64,
    config: &BenefitConfig,
) -> BenefitAmounts {
    BenefitAmounts {
        cpp: cpp_amount(person, age, index_factor, config),
        oas: oas_amount(person, age, index_factor, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PersonBuilder;

    fn cfg() -> BenefitConfig {
        BenefitConfig::default()
    }

    #[test]
    fn cpp_factor_at_bounds() {
        assert!((cpp_adjustment_factor(60, &cfg()) - 0.64).abs() < 1e-12);
        assert!((cpp_adjustment_factor(65, &cfg()) - 1.0).abs() < 1e-12);
        assert!((cpp_adjustment_factor(70, &cfg()) - 1.42).abs() < 1e-12);
        // out-of-range start ages are clamped
        assert_eq!(cpp_adjustment_factor(55, &cfg()), cpp_adjustment_factor(60, &cfg()));
    }

    #[test]
    fn reversed_age_window_does_not_panic() {
        let reversed = BenefitConfig {
            cpp_earliest_age: 70,
            cpp_latest_age: 60,
            oas_earliest_age: 70,
            oas_latest_age: 65,
            ..cfg()
        };
        assert!(cpp_adjustment_factor(65, &reversed).is_finite());
        assert!(oas_deferral_factor(65, &reversed).is_finite());
    }

    #[test]
    fn oas_deferral_caps_at_70() {
        assert!((oas_deferral_factor(70, &cfg()) - 1.36).abs() < 1e-12);
        assert_eq!(oas_deferral_factor(72, &cfg()), oas_deferral_factor(70, &cfg()));
        assert_eq!(oas_deferral_factor(60, &cfg()), 1.0);
    }

    #[test]
    fn cpp_is_age_gated() {
        let person = PersonBuilder::new(58).cpp(62, 9_000.0).build_person();
        assert_eq!(cpp_amount(&person, 59, 1.0, &cfg()), 0.0);
        assert_eq!(cpp_amount(&person, 61, 1.0, &cfg()), 0.0);
        assert_eq!(cpp_amount(&person, 62, 1.0, &cfg()), 9_000.0);
        assert!((cpp_amount(&person, 63, 1.02, &cfg()) - 9_180.0).abs() < 1e-9);
    }

    #[test]
    fn cpp_defaults_to_adjusted_maximum() {
        let person = PersonBuilder::new(60).cpp_start_age(70).build_person();
        let expected = cfg().cpp_max_at_65 * 1.42;
        assert!((cpp_amount(&person, 70, 1.0, &cfg()) - expected).abs() < 1e-9);
    }

    #[test]
    fn oas_never_before_65_and_bumps_at_75() {
        let person = PersonBuilder::new(60).oas(60, 8_000.0).build_person();
        assert_eq!(oas_amount(&person, 64, 1.0, &cfg()), 0.0);
        assert_eq!(oas_amount(&person, 65, 1.0, &cfg()), 8_000.0);
        assert!((oas_amount(&person, 75, 1.0, &cfg()) - 8_800.0).abs() < 1e-9);
    }

    #[test]
    fn clawback_is_capped_at_oas() {
        assert_eq!(oas_clawback(90_000.0, 8_000.0, 93_454.0, 0.15), 0.0);
        assert!((oas_clawback(103_454.0, 8_000.0, 93_454.0, 0.15) - 1_500.0).abs() < 1e-9);
        assert_eq!(oas_clawback(500_000.0, 8_000.0, 93_454.0, 0.15), 8_000.0);
    }

    #[test]
    fn gis_is_means_tested() {
        let c = cfg();
        assert_eq!(gis_amount(0.0, MaritalStatus::Single, true, 1.0, &c), c.gis_max_single);
        assert_eq!(gis_amount(0.0, MaritalStatus::Single, false, 1.0, &c), 0.0);
        let reduced = gis_amount(10_000.0, MaritalStatus::Single, true, 1.0, &c);
        assert!((reduced - (c.gis_max_single - 5_000.0)).abs() < 1e-9);
        assert_eq!(gis_amount(100_000.0, MaritalStatus::Couple, true, 1.0, &c), 0.0);
    }
}
