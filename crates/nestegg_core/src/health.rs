//! Plan health scoring
//!
//! Scores a finished trace on five criteria that add up to 100. Everything here
//! is a pure function of the input and the year results.

use crate::model::{
    AccountModel, BucketKind, Criterion, CriterionScore, DividendType, HealthRating,
    HouseholdInput, PersonSlot, SimulationSummary, SimulationWarning, TaxConfig, YearResult,
};
use crate::taxes::{IncomeComposition, calculate_tax_liability};

pub const FUNDING_WEIGHT: f64 = 30.0;
pub const TAX_WEIGHT: f64 = 20.0;
pub const ESTATE_WEIGHT: f64 = 20.0;
pub const BENEFIT_WEIGHT: f64 = 15.0;
pub const RISK_WEIGHT: f64 = 15.0;

/// Effective tax rate that scores zero on tax efficiency
const TAX_RATE_CEILING: f64 = 0.40;
/// Estate target as a multiple of final-year spending
const ESTATE_SPENDING_MULTIPLE: f64 = 10.0;
/// Investable assets per person above which deferring benefits is near-optimal
const DEFERRAL_ASSET_THRESHOLD: f64 = 500_000.0;
const RISK_VOLATILITY_PENALTY: f64 = 4.0;

/// Build the run summary from the trace
#[must_use]
pub fn evaluate(
    input: &HouseholdInput,
    years: &[YearResult],
    warnings: Vec<SimulationWarning>,
) -> SimulationSummary {
    let years_simulated = u32::try_from(years.len()).unwrap_or(u32::MAX);
    let years_funded = u32::try_from(years.iter().filter(|y| y.funded).count()).unwrap_or(u32::MAX);
    let success_rate = if years.is_empty() {
        0.0
    } else {
        f64::from(years_funded) / f64::from(years_simulated)
    };
    let total_tax: f64 = years.iter().map(|y| y.total_tax).sum();
    let total_income: f64 = years.iter().map(|y| y.total_income).sum();
    let average_effective_tax_rate = if total_income > 0.0 {
        total_tax / total_income
    } else {
        0.0
    };
    let last = years.last();
    let final_estate_after_tax = last.map_or(0.0, |y| y.after_tax_estate);
    let final_spending = last.map_or(0.0, |y| y.spending_need);

    let health_criteria = vec![
        funding_coverage(success_rate, years_funded, years_simulated),
        tax_efficiency(average_effective_tax_rate),
        estate_preservation(final_estate_after_tax, final_spending),
        benefit_optimization(input),
        risk_management(years),
    ];
    let raw: f64 = health_criteria.iter().map(|c| c.score).sum();
    let health_score = (raw * 10.0).round() / 10.0;

    SimulationSummary {
        success_rate,
        years_funded,
        years_simulated,
        first_shortfall_year: years.iter().find(|y| !y.funded).map(|y| y.year),
        total_shortfall: years.iter().map(|y| y.shortfall).sum(),
        total_tax,
        average_effective_tax_rate,
        final_net_worth: last.map_or(0.0, |y| y.net_worth),
        final_estate_after_tax,
        health_score,
        health_rating: HealthRating::from_score(health_score),
        health_criteria,
        warnings,
    }
}

fn funding_coverage(success_rate: f64, funded: u32, simulated: u32) -> CriterionScore {
    CriterionScore {
        criterion: Criterion::FundingCoverage,
        score: FUNDING_WEIGHT * success_rate,
        max: FUNDING_WEIGHT,
        detail: format!("{funded} of {simulated} years fully funded"),
    }
}

fn tax_efficiency(effective_rate: f64) -> CriterionScore {
    CriterionScore {
        criterion: Criterion::TaxEfficiency,
        score: TAX_WEIGHT * (1.0 - effective_rate / TAX_RATE_CEILING).clamp(0.0, 1.0),
        max: TAX_WEIGHT,
        detail: format!("average effective tax rate {:.1}%", effective_rate * 100.0),
    }
}

fn estate_preservation(estate: f64, final_spending: f64) -> CriterionScore {
    let target = ESTATE_SPENDING_MULTIPLE * final_spending;
    let ratio = if target > 0.0 {
        (estate / target).clamp(0.0, 1.0)
    } else if estate >= 0.0 {
        1.0
    } else {
        0.0
    };
    CriterionScore {
        criterion: Criterion::EstatePreservation,
        score: ESTATE_WEIGHT * ratio,
        max: ESTATE_WEIGHT,
        detail: format!("after-tax estate {estate:.0} against target {target:.0}"),
    }
}

fn benefit_optimization(input: &HouseholdInput) -> CriterionScore {
    let persons: Vec<_> = input.persons().map(|(_, p)| p).collect();
    let count = persons.len().max(1) as f64;
    let investable_per_person = persons.iter().map(|p| p.investable_assets()).sum::<f64>() / count;

    let (cpp_band, oas_band) = if investable_per_person >= DEFERRAL_ASSET_THRESHOLD {
        ((65, 70), (65, 70))
    } else {
        ((60, 67), (65, 67))
    };
    let within = |age: u32, (lo, hi): (u32, u32)| u32::from(age >= lo && age <= hi);
    let in_band: u32 = persons
        .iter()
        .map(|p| within(p.cpp_start_age, cpp_band) + within(p.oas_start_age, oas_band))
        .sum();
    let share = f64::from(in_band) / (2.0 * count);

    CriterionScore {
        criterion: Criterion::BenefitOptimization,
        score: BENEFIT_WEIGHT * share,
        max: BENEFIT_WEIGHT,
        detail: format!(
            "{in_band} of {} start ages within CPP {}-{} / OAS {}-{}",
            2 * persons.len(),
            cpp_band.0,
            cpp_band.1,
            oas_band.0,
            oas_band.1
        ),
    }
}

fn risk_management(years: &[YearResult]) -> CriterionScore {
    let ratios: Vec<f64> = years
        .iter()
        .map(|y| {
            if y.spending_need > 0.0 {
                y.spending_met / y.spending_need
            } else {
                1.0
            }
        })
        .collect();
    let sd = std_dev(&ratios);
    CriterionScore {
        criterion: Criterion::RiskManagement,
        score: RISK_WEIGHT * (1.0 - RISK_VOLATILITY_PENALTY * sd).clamp(0.0, 1.0),
        max: RISK_WEIGHT,
        detail: format!("spending coverage std dev {sd:.3}"),
    }
}

/// Population standard deviation; zero for fewer than two values
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Net worth after a deemed disposition of everything the household holds
///
/// Registered balances are taxed as income, unrealized non-registered gains as
/// capital gains, and corporate balances as dividends of the corporation's type
/// with the matching RDTOH refund.
#[must_use]
pub fn after_tax_estate(accounts: &AccountModel, ages: [Option<u32>; 2], config: &TaxConfig) -> f64 {
    let mut estate = accounts.net_worth();
    for slot in PersonSlot::ALL {
        let Some(person) = accounts.person(slot) else {
            continue;
        };
        let registered = person.total_of(&[BucketKind::Rrsp, BucketKind::Rrif]);
        let gains: f64 = [
            BucketKind::NonRegCash,
            BucketKind::NonRegGic,
            BucketKind::NonRegInvest,
        ]
        .iter()
        .map(|k| person.bucket(*k).unrealized_gain())
        .sum();
        let corporate = person.total_of(&[
            BucketKind::CorpCash,
            BucketKind::CorpGic,
            BucketKind::CorpInvest,
        ]);
        if registered <= 0.0 && gains <= 0.0 && corporate <= 0.0 {
            continue;
        }

        let mut income = IncomeComposition {
            rrsp: registered,
            capital_gains: gains,
            ..IncomeComposition::default()
        };
        match person.dividend_type {
            DividendType::Eligible => income.eligible_dividends = corporate,
            DividendType::NonEligible => income.non_eligible_dividends = corporate,
        }
        let age = ages[slot.index()].unwrap_or(0);
        let tax = calculate_tax_liability(&income, age, config).total;
        let refund = (corporate * config.corporate.dividend_refund_rate).min(person.rdtoh);
        estate += refund - tax;
    }
    estate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HouseholdBuilder, PersonBuilder};
    use crate::model::Province;

    #[test]
    fn std_dev_of_constant_series_is_zero() {
        assert_eq!(std_dev(&[1.0, 1.0, 1.0]), 0.0);
        assert!((std_dev(&[0.0, 1.0]) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tax_efficiency_scales_linearly() {
        assert_eq!(tax_efficiency(0.0).score, TAX_WEIGHT);
        assert!((tax_efficiency(0.20).score - 10.0).abs() < 1e-9);
        assert_eq!(tax_efficiency(0.55).score, 0.0);
    }

    #[test]
    fn estate_is_capped_at_target() {
        assert_eq!(estate_preservation(2_000_000.0, 50_000.0).score, ESTATE_WEIGHT);
        assert!((estate_preservation(250_000.0, 50_000.0).score - 10.0).abs() < 1e-9);
        assert_eq!(estate_preservation(-1.0, 50_000.0).score, 0.0);
    }

    #[test]
    fn benefit_band_depends_on_assets() {
        let modest = HouseholdBuilder::new()
            .person1(PersonBuilder::new(60).cpp_start_age(70).oas_start_age(70).rrsp(100_000.0))
            .build_unchecked();
        assert_eq!(benefit_optimization(&modest).score, 0.0);

        let wealthy = HouseholdBuilder::new()
            .person1(PersonBuilder::new(60).cpp_start_age(70).oas_start_age(70).rrsp(900_000.0))
            .build_unchecked();
        assert_eq!(benefit_optimization(&wealthy).score, BENEFIT_WEIGHT);
    }

    #[test]
    fn estate_taxes_registered_balances() {
        let input = HouseholdBuilder::new()
            .person1(PersonBuilder::new(80).rrif(200_000.0).tfsa(50_000.0, 0.0))
            .build_unchecked();
        let accounts = AccountModel::from_input(&input);
        let config = TaxConfig::for_province(Province::Ontario);
        let estate = after_tax_estate(&accounts, [Some(80), None], &config);
        assert!(estate < 250_000.0);
        assert!(estate > 150_000.0);
    }

    #[test]
    fn tfsa_only_estate_is_untaxed() {
        let input = HouseholdBuilder::new()
            .person1(PersonBuilder::new(80).tfsa(50_000.0, 0.0))
            .build_unchecked();
        let accounts = AccountModel::from_input(&input);
        let config = TaxConfig::default();
        assert_eq!(after_tax_estate(&accounts, [Some(80), None], &config), 50_000.0);
    }
}
