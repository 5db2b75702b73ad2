//! Personal income tax for one person in one year
//!
//! Incomes are never pooled between spouses; the only cross-person step is
//! pension splitting, which moves RRIF income before each person is taxed
//! separately.

use serde::{Deserialize, Serialize};

use crate::benefits::oas_clawback;
use crate::model::{JurisdictionTax, TaxBracket, TaxConfig, TaxResult};

/// Minimum age of the transferor for RRIF income to be split
pub const PENSION_SPLIT_MIN_AGE: u32 = 65;
/// Largest share of eligible income that can be attributed to a spouse
pub const PENSION_SPLIT_MAX_FRACTION: f64 = 0.5;

/// Income for one person in one year, by tax character
///
/// Dividends are actual amounts (gross-up is applied here) and capital gains are
/// realized gains before inclusion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeComposition {
    pub employment: f64,
    /// Interest, rental and other fully taxable income
    pub other: f64,
    /// Registered pension plan income
    pub pension: f64,
    pub rrif: f64,
    pub rrsp: f64,
    pub cpp: f64,
    pub oas: f64,
    pub eligible_dividends: f64,
    pub non_eligible_dividends: f64,
    pub capital_gains: f64,
    pub rrsp_contribution: f64,
    pub rrsp_unused_room: f64,
}

impl IncomeComposition {
    /// Income qualifying for the pension income credit
    #[must_use]
    pub fn eligible_pension_income(&self, age: u32) -> f64 {
        if age >= PENSION_SPLIT_MIN_AGE {
            self.pension + self.rrif
        } else {
            self.pension
        }
    }

    fn grossed_up(&self, config: &TaxConfig) -> (f64, f64) {
        (
            self.eligible_dividends.max(0.0) * (1.0 + config.eligible_dividend_gross_up),
            self.non_eligible_dividends.max(0.0) * (1.0 + config.non_eligible_dividend_gross_up),
        )
    }

    /// Total income before deductions
    #[must_use]
    pub fn total_income(&self, config: &TaxConfig) -> f64 {
        let (eligible, non_eligible) = self.grossed_up(config);
        self.employment
            + self.other
            + self.pension
            + self.rrif
            + self.rrsp
            + self.cpp
            + self.oas
            + eligible
            + non_eligible
            + self.capital_gains.max(0.0) * config.capital_gains_inclusion_rate
    }
}

/// Calculate income tax using progressive brackets
/// Returns the total tax owed on the given income
#[must_use]
pub fn calculate_bracket_tax(income: f64, brackets: &[TaxBracket]) -> f64 {
    if income <= 0.0 || brackets.is_empty() {
        return 0.0;
    }

    let mut tax = 0.0;
    let mut prev_threshold = 0.0;

    for (i, bracket) in brackets.iter().enumerate() {
        let next_threshold = brackets
            .get(i + 1)
            .map_or(f64::INFINITY, |b| b.threshold);

        if income <= bracket.threshold {
            break;
        }

        let taxable_in_bracket =
            (income.min(next_threshold) - bracket.threshold.max(prev_threshold)).max(0.0);
        tax += taxable_in_bracket * bracket.rate;
        prev_threshold = bracket.threshold;
    }

    tax
}

/// RRSP deduction limit for the year
#[must_use]
pub fn rrsp_deduction_limit(earned_income: f64, unused_room: f64, config: &TaxConfig) -> f64 {
    (earned_income.max(0.0) * config.rrsp_earned_income_rate).min(config.rrsp_annual_max)
        + unused_room.max(0.0)
}

struct TaxBase {
    taxable_income: f64,
    net_income: f64,
    pension_eligible: f64,
    grossed_eligible: f64,
    grossed_non_eligible: f64,
}

fn jurisdiction_tax(rules: &JurisdictionTax, base: &TaxBase, age: u32) -> f64 {
    let basic = calculate_bracket_tax(base.taxable_income, &rules.brackets);

    let mut credit_amounts = rules.basic_personal_amount;
    if age >= 65 {
        let reduction =
            rules.age_amount_reduction_rate * (base.net_income - rules.age_amount_threshold).max(0.0);
        credit_amounts += (rules.age_amount - reduction).max(0.0);
    }
    credit_amounts += base.pension_eligible.min(rules.pension_income_amount);

    let credits = credit_amounts * rules.credit_rate
        + base.grossed_eligible * rules.dividend_credit.eligible
        + base.grossed_non_eligible * rules.dividend_credit.non_eligible;

    let after_credits = (basic - credits).max(0.0);
    let surtax: f64 = rules
        .surtax
        .iter()
        .map(|s| s.rate * (after_credits - s.threshold).max(0.0))
        .sum();
    after_credits + surtax
}

/// Tax owed, without the marginal rate
#[must_use]
pub fn calculate_tax_liability(income: &IncomeComposition, age: u32, config: &TaxConfig) -> TaxResult {
    let earned = income.employment;
    let limit = rrsp_deduction_limit(earned, income.rrsp_unused_room, config);
    let contribution = income.rrsp_contribution.max(0.0);
    let rrsp_deduction = contribution.min(limit);
    let excess_rrsp_contribution = contribution - rrsp_deduction;

    let (grossed_eligible, grossed_non_eligible) = income.grossed_up(config);
    let net_income = (income.total_income(config) - rrsp_deduction).max(0.0);
    let base = TaxBase {
        taxable_income: net_income,
        net_income,
        pension_eligible: income.eligible_pension_income(age),
        grossed_eligible,
        grossed_non_eligible,
    };

    let federal = jurisdiction_tax(&config.federal, &base, age) * (1.0 - config.federal_abatement);
    let provincial = jurisdiction_tax(&config.provincial, &base, age);
    let clawback = oas_clawback(
        net_income,
        income.oas,
        config.oas_clawback_threshold,
        config.oas_clawback_rate,
    );

    TaxResult {
        federal,
        provincial,
        oas_clawback: clawback,
        total: federal + provincial + clawback,
        marginal_rate: 0.0,
        taxable_income: base.taxable_income,
        net_income,
        rrsp_deduction,
        excess_rrsp_contribution,
    }
}

/// Tax owed plus the combined marginal rate on the next $100 of ordinary income
#[must_use]
pub fn calculate_tax(income: &IncomeComposition, age: u32, config: &TaxConfig) -> TaxResult {
    const STEP: f64 = 100.0;
    let mut result = calculate_tax_liability(income, age, config);
    let bumped = IncomeComposition {
        other: income.other + STEP,
        ..*income
    };
    result.marginal_rate = (calculate_tax_liability(&bumped, age, config).total - result.total) / STEP;
    result
}

/// Attribute `fraction` of the transferor's RRIF income to the receiver
///
/// Returns the amount moved; nothing moves when the transferor is under 65.
pub fn split_pension_income(
    transferor: &mut IncomeComposition,
    transferor_age: u32,
    receiver: &mut IncomeComposition,
    fraction: f64,
) -> f64 {
    if transferor_age < PENSION_SPLIT_MIN_AGE || fraction <= 0.0 {
        return 0.0;
    }
    let amount = transferor.rrif.max(0.0) * fraction.min(PENSION_SPLIT_MAX_FRACTION);
    transferor.rrif -= amount;
    receiver.rrif += amount;
    amount
}

/// Per-person taxes for a household, after pension splitting
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HouseholdTax {
    pub persons: [Option<TaxResult>; 2],
    /// RRIF income received (positive) or given up (negative) per person
    pub split: [f64; 2],
}

impl HouseholdTax {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.persons.iter().flatten().map(|t| t.total).sum()
    }
}

/// Tax both spouses, splitting RRIF income from the higher-RRIF spouse when asked
#[must_use]
pub fn household_tax(
    persons: [Option<(u32, IncomeComposition)>; 2],
    split_fraction: f64,
    config: &TaxConfig,
    with_marginal: bool,
) -> HouseholdTax {
    let mut persons = persons;
    let mut split = [0.0; 2];

    if let [Some((age_a, a)), Some((age_b, b))] = &mut persons {
        let (from, moved) = if a.rrif >= b.rrif {
            (0, split_pension_income(a, *age_a, b, split_fraction))
        } else {
            (1, split_pension_income(b, *age_b, a, split_fraction))
        };
        split[from] = -moved;
        split[1 - from] = moved;
    }

    let tax = |(age, income): (u32, IncomeComposition)| {
        if with_marginal {
            calculate_tax(&income, age, config)
        } else {
            calculate_tax_liability(&income, age, config)
        }
    };

    HouseholdTax {
        persons: [persons[0].map(tax), persons[1].map(tax)],
        split,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Province;

    fn on() -> TaxConfig {
        TaxConfig::for_province(Province::Ontario)
    }

    fn other(amount: f64) -> IncomeComposition {
        IncomeComposition {
            other: amount,
            ..IncomeComposition::default()
        }
    }

    #[test]
    fn bracket_tax_is_progressive() {
        let config = on();
        let tax = calculate_bracket_tax(100_000.0, &config.federal.brackets);
        assert!((tax - 17_344.375).abs() < 1e-6);
        assert_eq!(calculate_bracket_tax(0.0, &config.federal.brackets), 0.0);
        assert_eq!(calculate_bracket_tax(-5.0, &config.federal.brackets), 0.0);
    }

    #[test]
    fn income_below_basic_personal_amount_is_untaxed() {
        let result = calculate_tax(&other(12_000.0), 60, &on());
        assert_eq!(result.total, 0.0);
    }

    #[test]
    fn credits_reduce_federal_tax() {
        let result = calculate_tax(&other(20_000.0), 60, &on());
        assert!((result.federal - (3_000.0 - 16_129.0 * 0.15)).abs() < 1e-6);
        assert!((result.provincial - (1_010.0 - 12_747.0 * 0.0505)).abs() < 1e-6);
    }

    #[test]
    fn marginal_rate_in_first_brackets() {
        let result = calculate_tax(&other(30_000.0), 60, &on());
        assert!((result.marginal_rate - 0.2005).abs() < 1e-6);
    }

    #[test]
    fn eligible_dividends_are_sheltered_by_credit() {
        let income = IncomeComposition {
            eligible_dividends: 50_000.0,
            ..IncomeComposition::default()
        };
        let result = calculate_tax(&income, 60, &on());
        assert!((result.taxable_income - 69_000.0).abs() < 1e-6);
        assert_eq!(result.federal, 0.0);
    }

    #[test]
    fn capital_gains_use_inclusion_rate() {
        let income = IncomeComposition {
            capital_gains: 20_000.0,
            ..IncomeComposition::default()
        };
        let result = calculate_tax(&income, 60, &on());
        assert!((result.taxable_income - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn oas_clawback_added_as_tax() {
        let income = IncomeComposition {
            oas: 8_000.0,
            other: 120_000.0,
            ..IncomeComposition::default()
        };
        let result = calculate_tax(&income, 70, &on());
        assert!((result.oas_clawback - 0.15 * (128_000.0 - 93_454.0)).abs() < 1e-6);
        assert!((result.total - result.federal - result.provincial - result.oas_clawback).abs() < 1e-9);
    }

    #[test]
    fn quebec_abatement_reduces_federal() {
        let income = other(80_000.0);
        let on_federal = calculate_tax(&income, 60, &on()).federal;
        let qc_federal = calculate_tax(&income, 60, &TaxConfig::for_province(Province::Quebec)).federal;
        assert!((qc_federal - on_federal * 0.835).abs() < 1e-6);
    }

    #[test]
    fn age_amount_applies_from_65() {
        let younger = calculate_tax(&other(30_000.0), 64, &on());
        let older = calculate_tax(&other(30_000.0), 65, &on());
        assert!(older.total < younger.total);
    }

    #[test]
    fn rrsp_limit_caps_at_annual_maximum() {
        let config = on();
        assert!((rrsp_deduction_limit(100_000.0, 0.0, &config) - 18_000.0).abs() < 1e-9);
        assert_eq!(rrsp_deduction_limit(300_000.0, 0.0, &config), 32_490.0);
        assert_eq!(rrsp_deduction_limit(0.0, 5_000.0, &config), 5_000.0);
    }

    #[test]
    fn excess_rrsp_contribution_is_flagged_not_blocked() {
        let income = IncomeComposition {
            employment: 100_000.0,
            rrsp_contribution: 40_000.0,
            ..IncomeComposition::default()
        };
        let result = calculate_tax(&income, 50, &on());
        assert!((result.rrsp_deduction - 18_000.0).abs() < 1e-9);
        assert!((result.excess_rrsp_contribution - 22_000.0).abs() < 1e-9);
        assert!((result.taxable_income - 82_000.0).abs() < 1e-9);
    }

    #[test]
    fn pension_splitting_lowers_household_tax() {
        let rich = IncomeComposition {
            rrif: 120_000.0,
            ..IncomeComposition::default()
        };
        let config = on();
        let unsplit = household_tax(
            [Some((70, rich)), Some((68, IncomeComposition::default()))],
            0.0,
            &config,
            false,
        );
        let split = household_tax(
            [Some((70, rich)), Some((68, IncomeComposition::default()))],
            0.5,
            &config,
            false,
        );
        assert!(split.total() < unsplit.total());
        assert_eq!(split.split, [-60_000.0, 60_000.0]);
    }

    #[test]
    fn pension_splitting_requires_transferor_65() {
        let mut a = IncomeComposition {
            rrif: 50_000.0,
            ..IncomeComposition::default()
        };
        let mut b = IncomeComposition::default();
        assert_eq!(split_pension_income(&mut a, 64, &mut b, 0.5), 0.0);
        assert_eq!(split_pension_income(&mut a, 65, &mut b, 0.9), 25_000.0);
        assert_eq!(b.rrif, 25_000.0);
    }

    #[test]
    fn single_person_household_has_no_phantom_spouse() {
        let result = household_tax([Some((70, other(50_000.0))), None], 0.5, &on(), true);
        assert!(result.persons[1].is_none());
        assert_eq!(result.split, [0.0, 0.0]);
    }
}
