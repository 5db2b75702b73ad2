//! Input validation
//!
//! Every problem is collected before returning so a caller can fix an input in
//! one pass.

use crate::error::{ValidationCode, ValidationError, ValidationErrors};
use crate::model::{BenefitConfig, HouseholdInput, IncomeStream, JurisdictionTax, Person, TaxBracket, TaxConfig};

pub const MAX_AGE: u32 = 120;
pub const CPP_AGE_RANGE: (u32, u32) = (60, 70);
pub const OAS_AGE_RANGE: (u32, u32) = (65, 70);
pub const CONVERSION_AGE_RANGE: (u32, u32) = (50, 71);
pub const YIELD_RANGE: (f64, f64) = (-0.95, 1.0);
pub const INFLATION_RANGE: (f64, f64) = (-0.05, 0.25);

#[derive(Default)]
struct Checker {
    errors: ValidationErrors,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>, code: ValidationCode) {
        self.errors.push(ValidationError::new(field, message, code));
    }

    fn amount(&mut self, field: &str, value: f64) {
        if !value.is_finite() {
            self.fail(field, "must be a finite number", ValidationCode::NotFinite);
        } else if value < 0.0 {
            self.fail(field, "must not be negative", ValidationCode::OutOfRange);
        }
    }

    fn rate(&mut self, field: &str, value: f64, (lo, hi): (f64, f64)) {
        if !value.is_finite() {
            self.fail(field, "must be a finite number", ValidationCode::NotFinite);
        } else if value < lo || value > hi {
            self.fail(
                field,
                format!("must be between {lo} and {hi}"),
                ValidationCode::OutOfRange,
            );
        }
    }

    fn age(&mut self, field: &str, value: u32, (lo, hi): (u32, u32)) {
        if value < lo || value > hi {
            self.fail(
                field,
                format!("must be between {lo} and {hi}"),
                ValidationCode::OutOfRange,
            );
        }
    }

    fn stream(&mut self, field: &str, stream: &IncomeStream) {
        self.amount(&format!("{field}.amount"), stream.amount);
        self.age(&format!("{field}.start_age"), stream.start_age, (0, MAX_AGE));
        if let Some(end) = stream.end_age
            && end < stream.start_age
        {
            self.fail(
                &format!("{field}.end_age"),
                "must not be before start_age",
                ValidationCode::Inconsistent,
            );
        }
    }

    fn age_window(&mut self, prefix: &str, name: &str, earliest: u32, latest: u32) {
        if earliest > latest {
            self.fail(
                &format!("{prefix}.{name}_latest_age"),
                format!("must not be before {name}_earliest_age"),
                ValidationCode::Inconsistent,
            );
        }
    }

    fn brackets(&mut self, field: &str, brackets: &[TaxBracket]) {
        let mut previous = None;
        for (i, b) in brackets.iter().enumerate() {
            self.amount(&format!("{field}[{i}].threshold"), b.threshold);
            self.rate(&format!("{field}[{i}].rate"), b.rate, (0.0, 1.0));
            if let Some(prev) = previous
                && b.threshold <= prev
            {
                self.fail(
                    &format!("{field}[{i}].threshold"),
                    "thresholds must be ascending",
                    ValidationCode::Inconsistent,
                );
            }
            previous = Some(b.threshold);
        }
    }

    fn jurisdiction(&mut self, prefix: &str, tax: &JurisdictionTax) {
        let f = |name: &str| format!("{prefix}.{name}");
        if tax.brackets.is_empty() {
            self.fail(&f("brackets"), "at least one bracket is required", ValidationCode::Missing);
        }
        self.brackets(&f("brackets"), &tax.brackets);
        self.brackets(&f("surtax"), &tax.surtax);
        for (name, value) in [
            ("basic_personal_amount", tax.basic_personal_amount),
            ("age_amount", tax.age_amount),
            ("age_amount_threshold", tax.age_amount_threshold),
            ("pension_income_amount", tax.pension_income_amount),
        ] {
            self.amount(&f(name), value);
        }
        for (name, value) in [
            ("age_amount_reduction_rate", tax.age_amount_reduction_rate),
            ("credit_rate", tax.credit_rate),
            ("dividend_credit.eligible", tax.dividend_credit.eligible),
            ("dividend_credit.non_eligible", tax.dividend_credit.non_eligible),
        ] {
            self.rate(&f(name), value, (0.0, 1.0));
        }
    }

    fn tax_config(&mut self, tax: &TaxConfig) {
        self.jurisdiction("tax_config.federal", &tax.federal);
        self.jurisdiction("tax_config.provincial", &tax.provincial);
        self.amount("tax_config.oas_clawback_threshold", tax.oas_clawback_threshold);
        self.amount("tax_config.rrsp_annual_max", tax.rrsp_annual_max);
        for (name, value) in [
            ("federal_abatement", tax.federal_abatement),
            ("eligible_dividend_gross_up", tax.eligible_dividend_gross_up),
            ("non_eligible_dividend_gross_up", tax.non_eligible_dividend_gross_up),
            ("capital_gains_inclusion_rate", tax.capital_gains_inclusion_rate),
            ("oas_clawback_rate", tax.oas_clawback_rate),
            ("rrsp_earned_income_rate", tax.rrsp_earned_income_rate),
            ("corporate.passive_income_rate", tax.corporate.passive_income_rate),
            ("corporate.refundable_rate", tax.corporate.refundable_rate),
            ("corporate.part_iv_rate", tax.corporate.part_iv_rate),
            ("corporate.dividend_refund_rate", tax.corporate.dividend_refund_rate),
        ] {
            self.rate(&format!("tax_config.{name}"), value, (0.0, 1.0));
        }
    }

    fn benefit_config(&mut self, b: &BenefitConfig) {
        const P: &str = "benefit_config";
        self.age_window(P, "cpp", b.cpp_earliest_age, b.cpp_latest_age);
        self.age_window(P, "oas", b.oas_earliest_age, b.oas_latest_age);
        for (name, value) in [
            ("cpp_max_at_65", b.cpp_max_at_65),
            ("oas_max_at_65", b.oas_max_at_65),
            ("gis_max_single", b.gis_max_single),
            ("gis_max_couple", b.gis_max_couple),
        ] {
            self.amount(&format!("{P}.{name}"), value);
        }
        for (name, value) in [
            ("cpp_early_reduction_per_month", b.cpp_early_reduction_per_month),
            ("cpp_late_increase_per_month", b.cpp_late_increase_per_month),
            ("oas_deferral_increase_per_month", b.oas_deferral_increase_per_month),
            ("oas_age_75_increase", b.oas_age_75_increase),
            ("gis_reduction_rate_single", b.gis_reduction_rate_single),
            ("gis_reduction_rate_couple", b.gis_reduction_rate_couple),
        ] {
            self.rate(&format!("{P}.{name}"), value, (0.0, 1.0));
        }
    }

    fn person(&mut self, prefix: &str, person: &Person, household_end_age: u32) {
        let f = |name: &str| format!("{prefix}.{name}");

        self.age(&f("start_age"), person.start_age, (18, MAX_AGE));
        let end_age = person.end_age_or(household_end_age);
        if end_age < person.start_age {
            self.fail(
                &f("end_age"),
                "must not be before start_age",
                ValidationCode::Inconsistent,
            );
        }
        self.age(&f("end_age"), end_age, (0, MAX_AGE));
        if let Some(retirement) = person.retirement_age {
            self.age(&f("retirement_age"), retirement, (0, MAX_AGE));
        }

        self.age(&f("cpp_start_age"), person.cpp_start_age, CPP_AGE_RANGE);
        self.age(&f("oas_start_age"), person.oas_start_age, OAS_AGE_RANGE);
        if let Some(cpp) = person.cpp_annual_at_start {
            self.amount(&f("cpp_annual_at_start"), cpp);
        }
        if let Some(oas) = person.oas_annual_at_start {
            self.amount(&f("oas_annual_at_start"), oas);
        }
        self.age(&f("age_rrsp_convert"), person.age_rrsp_convert, CONVERSION_AGE_RANGE);

        for (i, s) in person.pension_incomes.iter().enumerate() {
            self.stream(&f(&format!("pension_incomes[{i}]")), s);
        }
        for (i, s) in person.other_incomes.iter().enumerate() {
            self.stream(&f(&format!("other_incomes[{i}]")), s);
        }

        for (name, value) in [
            ("tfsa_balance", person.tfsa_balance),
            ("tfsa_room_start", person.tfsa_room_start),
            ("tfsa_room_annual_growth", person.tfsa_room_annual_growth),
            ("rrsp_balance", person.rrsp_balance),
            ("rrsp_annual_contribution", person.rrsp_annual_contribution),
            ("rrsp_unused_room", person.rrsp_unused_room),
            ("rrif_balance", person.rrif_balance),
            ("nonreg_cash", person.nonreg_cash),
            ("nonreg_gic", person.nonreg_gic),
            ("nonreg_invest", person.nonreg_invest),
            ("corp_cash", person.corp_cash),
            ("corp_gic", person.corp_gic),
            ("corp_invest", person.corp_invest),
            ("corp_rdtoh", person.corp_rdtoh),
        ] {
            self.amount(&f(name), value);
        }
        if let Some(acb) = person.nonreg_acb {
            self.amount(&f("nonreg_acb"), acb);
        }

        for (name, value) in [
            ("tfsa_yield", person.tfsa_yield),
            ("rrsp_yield", person.rrsp_yield),
            ("rrif_yield", person.rrif_yield),
            ("nonreg_cash_yield", person.nonreg_cash_yield),
            ("nonreg_gic_yield", person.nonreg_gic_yield),
            ("nonreg_invest_yield", person.nonreg_invest_yield),
            ("corp_cash_yield", person.corp_cash_yield),
            ("corp_gic_yield", person.corp_gic_yield),
            ("corp_invest_yield", person.corp_invest_yield),
        ] {
            self.rate(&f(name), value, YIELD_RANGE);
        }
        for (name, value) in [
            ("nonreg_invest_dividend_yield", person.nonreg_invest_dividend_yield),
            ("corp_invest_dividend_yield", person.corp_invest_dividend_yield),
        ] {
            self.rate(&f(name), value, (0.0, 0.5));
        }
    }
}

impl HouseholdInput {
    /// Check every field; returns all problems found
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut c = Checker::default();

        if self.person1.is_none() && self.person2.is_none() {
            c.fail(
                "person1",
                "at least one person is required",
                ValidationCode::Missing,
            );
        }
        if let Some(p) = &self.person1 {
            c.person("person1", p, self.end_age);
        }
        if let Some(p) = &self.person2 {
            c.person("person2", p, self.end_age);
        }

        c.age("end_age", self.end_age, (0, MAX_AGE));
        if let Some(year) = self.start_year
            && !(1900..=2200).contains(&year)
        {
            c.fail(
                "start_year",
                "must be between 1900 and 2200",
                ValidationCode::OutOfRange,
            );
        }

        c.amount("spending_go_go", self.spending_go_go);
        if let Some(v) = self.spending_slow_go {
            c.amount("spending_slow_go", v);
        }
        if let Some(v) = self.spending_no_go {
            c.amount("spending_no_go", v);
        }
        if self.no_go_start_age < self.slow_go_start_age {
            c.fail(
                "no_go_start_age",
                "must not be before slow_go_start_age",
                ValidationCode::Inconsistent,
            );
        }
        c.rate("spending_inflation", self.spending_inflation, INFLATION_RANGE);
        c.rate("general_inflation", self.general_inflation, INFLATION_RANGE);
        c.amount("gap_tolerance", self.gap_tolerance);
        c.rate(
            "income_split_rrif_fraction",
            self.income_split_rrif_fraction,
            (0.0, 0.5),
        );

        let w = &self.nonreg_reinvest_weights;
        c.amount("nonreg_reinvest_weights.cash", w.cash);
        c.amount("nonreg_reinvest_weights.gic", w.gic);
        c.amount("nonreg_reinvest_weights.invest", w.invest);

        if let Some(tax) = &self.tax_config {
            if tax.province != self.province {
                c.fail(
                    "tax_config.province",
                    "must match the household province",
                    ValidationCode::Inconsistent,
                );
            }
            c.tax_config(tax);
        }
        if let Some(benefits) = &self.benefit_config {
            c.benefit_config(benefits);
        }

        c.errors.into_result()
    }
}
