//! Household input schema
//!
//! `HouseholdInput` is the single canonical description of a plan. It is read-only
//! for the duration of a run; the engine copies what it needs into
//! `SimulationState`.

use serde::{Deserialize, Serialize};

use super::benefit_config::BenefitConfig;
use super::ids::PersonSlot;
use super::rrif::RrifTable;
use super::strategy::Strategy;
use super::tax_config::{Province, TaxConfig};
use crate::config::defaults;

/// Tax character of dividends paid out of a corporation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividendType {
    Eligible,
    #[default]
    NonEligible,
}

/// A recurring income source such as a defined-benefit pension or part-time work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncomeStream {
    #[serde(default)]
    pub name: String,
    /// Annual amount in base-year dollars
    pub amount: f64,
    pub start_age: u32,
    #[serde(default)]
    pub end_age: Option<u32>,
    #[serde(default = "defaults::yes")]
    pub inflation_indexed: bool,
    /// Employment income; stops at the person's retirement age and counts toward RRSP room
    #[serde(default)]
    pub earned: bool,
}

impl IncomeStream {
    /// Amount received in a year, given the owner's age that year
    #[must_use]
    pub fn amount_at(&self, age: u32, retirement_age: u32, index_factor: f64) -> f64 {
        if age < self.start_age || self.end_age.is_some_and(|end| age > end) {
            return 0.0;
        }
        if self.earned && age >= retirement_age {
            return 0.0;
        }
        if self.inflation_indexed {
            self.amount * index_factor
        } else {
            self.amount
        }
    }
}

/// One member of the household and the accounts they own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
    pub start_age: u32,
    /// Last simulated age; falls back to the household end age
    #[serde(default)]
    pub end_age: Option<u32>,
    /// Age at which earned income stops; defaults to `start_age`
    #[serde(default)]
    pub retirement_age: Option<u32>,

    #[serde(default = "defaults::cpp_start_age")]
    pub cpp_start_age: u32,
    /// CPP pension in the start year; computed from the statutory maximum when absent
    #[serde(default)]
    pub cpp_annual_at_start: Option<f64>,
    #[serde(default = "defaults::oas_start_age")]
    pub oas_start_age: u32,
    #[serde(default)]
    pub oas_annual_at_start: Option<f64>,

    #[serde(default)]
    pub pension_incomes: Vec<IncomeStream>,
    #[serde(default)]
    pub other_incomes: Vec<IncomeStream>,

    #[serde(default)]
    pub tfsa_balance: f64,
    #[serde(default = "defaults::registered_yield")]
    pub tfsa_yield: f64,
    #[serde(default)]
    pub tfsa_room_start: f64,
    #[serde(default = "defaults::tfsa_room_annual_growth")]
    pub tfsa_room_annual_growth: f64,

    #[serde(default)]
    pub rrsp_balance: f64,
    #[serde(default = "defaults::registered_yield")]
    pub rrsp_yield: f64,
    #[serde(default)]
    pub rrsp_annual_contribution: f64,
    #[serde(default)]
    pub rrsp_unused_room: f64,
    #[serde(default)]
    pub rrif_balance: f64,
    #[serde(default = "defaults::registered_yield")]
    pub rrif_yield: f64,
    #[serde(default = "defaults::rrsp_conversion_age")]
    pub age_rrsp_convert: u32,

    #[serde(default)]
    pub nonreg_cash: f64,
    #[serde(default = "defaults::cash_yield")]
    pub nonreg_cash_yield: f64,
    #[serde(default)]
    pub nonreg_gic: f64,
    #[serde(default = "defaults::gic_yield")]
    pub nonreg_gic_yield: f64,
    #[serde(default)]
    pub nonreg_invest: f64,
    /// Total return on the investment sub-bucket, distributions included
    #[serde(default = "defaults::invest_yield")]
    pub nonreg_invest_yield: f64,
    #[serde(default = "defaults::invest_dividend_yield")]
    pub nonreg_invest_dividend_yield: f64,
    /// Adjusted cost base of the investment sub-bucket; defaults to its balance
    #[serde(default)]
    pub nonreg_acb: Option<f64>,

    #[serde(default)]
    pub corp_cash: f64,
    #[serde(default = "defaults::cash_yield")]
    pub corp_cash_yield: f64,
    #[serde(default)]
    pub corp_gic: f64,
    #[serde(default = "defaults::gic_yield")]
    pub corp_gic_yield: f64,
    #[serde(default)]
    pub corp_invest: f64,
    #[serde(default = "defaults::invest_yield")]
    pub corp_invest_yield: f64,
    #[serde(default = "defaults::invest_dividend_yield")]
    pub corp_invest_dividend_yield: f64,
    #[serde(default)]
    pub corp_rdtoh: f64,
    #[serde(default)]
    pub corp_dividend_type: DividendType,
}

impl Person {
    #[must_use]
    pub fn end_age_or(&self, household_end_age: u32) -> u32 {
        self.end_age.unwrap_or(household_end_age)
    }

    #[must_use]
    pub fn retirement_age(&self) -> u32 {
        self.retirement_age.unwrap_or(self.start_age)
    }

    /// Sum of every starting balance the person owns
    #[must_use]
    pub fn investable_assets(&self) -> f64 {
        self.tfsa_balance
            + self.rrsp_balance
            + self.rrif_balance
            + self.nonreg_cash
            + self.nonreg_gic
            + self.nonreg_invest
            + self.corp_cash
            + self.corp_gic
            + self.corp_invest
    }
}

/// Spending phase, keyed on the oldest living person's age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendingPhase {
    GoGo,
    SlowGo,
    NoGo,
}

/// Split applied to surplus that lands in non-registered accounts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReinvestWeights {
    pub cash: f64,
    pub gic: f64,
    pub invest: f64,
}

impl Default for ReinvestWeights {
    fn default() -> Self {
        Self {
            cash: 0.0,
            gic: 0.0,
            invest: 1.0,
        }
    }
}

impl ReinvestWeights {
    /// Weights rescaled to sum to one; all-invest when every weight is zero
    #[must_use]
    pub fn normalized(&self) -> Self {
        let total = self.cash + self.gic + self.invest;
        if total <= 0.0 {
            return Self::default();
        }
        Self {
            cash: self.cash / total,
            gic: self.gic / total,
            invest: self.invest / total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HouseholdInput {
    #[serde(default)]
    pub person1: Option<Person>,
    #[serde(default)]
    pub person2: Option<Person>,
    #[serde(default)]
    pub province: Province,
    /// First simulated calendar year; defaults to the current year
    #[serde(default)]
    pub start_year: Option<i16>,
    #[serde(default = "defaults::end_age")]
    pub end_age: u32,
    #[serde(default)]
    pub strategy: Strategy,

    /// Annual after-tax spending in base-year dollars
    #[serde(default)]
    pub spending_go_go: f64,
    /// Falls back to the go-go amount
    #[serde(default)]
    pub spending_slow_go: Option<f64>,
    /// Falls back to the slow-go amount
    #[serde(default)]
    pub spending_no_go: Option<f64>,
    #[serde(default = "defaults::slow_go_start_age")]
    pub slow_go_start_age: u32,
    #[serde(default = "defaults::no_go_start_age")]
    pub no_go_start_age: u32,
    #[serde(default = "defaults::spending_inflation")]
    pub spending_inflation: f64,
    #[serde(default = "defaults::general_inflation")]
    pub general_inflation: f64,

    #[serde(default = "defaults::gap_tolerance")]
    pub gap_tolerance: f64,
    #[serde(default = "defaults::yes")]
    pub reinvest_nonreg_dist: bool,
    /// Share of the higher-RRIF spouse's RRIF income attributed to the other, at most 0.5
    #[serde(default)]
    pub income_split_rrif_fraction: f64,
    #[serde(default)]
    pub stop_on_fail: bool,
    #[serde(default)]
    pub nonreg_reinvest_weights: ReinvestWeights,

    #[serde(default)]
    pub tax_config: Option<TaxConfig>,
    #[serde(default)]
    pub benefit_config: Option<BenefitConfig>,
    #[serde(default)]
    pub rrif_table: Option<RrifTable>,
}

impl HouseholdInput {
    #[must_use]
    pub fn person(&self, slot: PersonSlot) -> Option<&Person> {
        match slot {
            PersonSlot::Person1 => self.person1.as_ref(),
            PersonSlot::Person2 => self.person2.as_ref(),
        }
    }

    pub fn person_mut(&mut self, slot: PersonSlot) -> Option<&mut Person> {
        match slot {
            PersonSlot::Person1 => self.person1.as_mut(),
            PersonSlot::Person2 => self.person2.as_mut(),
        }
    }

    /// Present persons, in slot order
    pub fn persons(&self) -> impl Iterator<Item = (PersonSlot, &Person)> {
        PersonSlot::ALL
            .into_iter()
            .filter_map(|slot| self.person(slot).map(|p| (slot, p)))
    }

    pub fn persons_mut(&mut self) -> impl Iterator<Item = &mut Person> {
        self.person1.iter_mut().chain(self.person2.iter_mut())
    }

    #[must_use]
    pub fn is_couple(&self) -> bool {
        self.person1.is_some() && self.person2.is_some()
    }

    #[must_use]
    pub fn person_end_age(&self, slot: PersonSlot) -> Option<u32> {
        self.person(slot).map(|p| p.end_age_or(self.end_age))
    }

    #[must_use]
    pub fn resolved_start_year(&self) -> i16 {
        self.start_year
            .unwrap_or_else(|| jiff::Zoned::now().year())
    }

    #[must_use]
    pub fn resolved_tax_config(&self) -> TaxConfig {
        self.tax_config
            .clone()
            .unwrap_or_else(|| TaxConfig::for_province(self.province))
    }

    #[must_use]
    pub fn resolved_benefit_config(&self) -> BenefitConfig {
        self.benefit_config.clone().unwrap_or_default()
    }

    #[must_use]
    pub fn resolved_rrif_table(&self) -> RrifTable {
        self.rrif_table.clone().unwrap_or_default()
    }

    /// Number of years until every present person passes their end age
    #[must_use]
    pub fn horizon_years(&self) -> u32 {
        self.persons()
            .map(|(_, p)| (p.end_age_or(self.end_age) + 1).saturating_sub(p.start_age))
            .max()
            .unwrap_or(0)
    }

    /// Spending phase and base-year amount for the oldest living person's age
    #[must_use]
    pub fn spending_for_age(&self, oldest_age: u32) -> (SpendingPhase, f64) {
        let slow_go = self.spending_slow_go.unwrap_or(self.spending_go_go);
        let no_go = self.spending_no_go.unwrap_or(slow_go);
        if oldest_age >= self.no_go_start_age {
            (SpendingPhase::NoGo, no_go)
        } else if oldest_age >= self.slow_go_start_age {
            (SpendingPhase::SlowGo, slow_go)
        } else {
            (SpendingPhase::GoGo, self.spending_go_go)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(amount: f64, start: u32, end: Option<u32>, indexed: bool) -> IncomeStream {
        IncomeStream {
            name: "test".into(),
            amount,
            start_age: start,
            end_age: end,
            inflation_indexed: indexed,
            earned: false,
        }
    }

    #[test]
    fn income_stream_respects_age_window() {
        let s = stream(10_000.0, 65, Some(70), false);
        assert_eq!(s.amount_at(64, 0, 1.0), 0.0);
        assert_eq!(s.amount_at(65, 0, 1.0), 10_000.0);
        assert_eq!(s.amount_at(70, 0, 1.0), 10_000.0);
        assert_eq!(s.amount_at(71, 0, 1.0), 0.0);
    }

    #[test]
    fn income_stream_indexing_is_optional() {
        assert_eq!(stream(1_000.0, 60, None, true).amount_at(61, 0, 1.02), 1_020.0);
        assert_eq!(stream(1_000.0, 60, None, false).amount_at(61, 0, 1.02), 1_000.0);
    }

    #[test]
    fn earned_income_stops_at_retirement() {
        let mut s = stream(50_000.0, 55, None, false);
        s.earned = true;
        assert_eq!(s.amount_at(59, 60, 1.0), 50_000.0);
        assert_eq!(s.amount_at(60, 60, 1.0), 0.0);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let input: HouseholdInput = serde_json::from_str(
            r#"{"person1": {"start_age": 65, "rrif_balance": 1000.0}, "spending_go_go": 40000}"#,
        )
        .unwrap();
        let p1 = input.person1.as_ref().unwrap();
        assert_eq!(p1.cpp_start_age, 65);
        assert_eq!(p1.age_rrsp_convert, 71);
        assert_eq!(input.end_age, 95);
        assert!(input.person2.is_none());
        assert!(input.reinvest_nonreg_dist);
        assert_eq!(input.strategy, Strategy::Balanced);
        assert_eq!(input.horizon_years(), 31);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_json::from_str::<HouseholdInput>(
            r#"{"person1": {"start_age": 65}, "spending": 1}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn spending_phases_fall_back_to_previous_amount() {
        let input: HouseholdInput =
            serde_json::from_str(r#"{"person1": {"start_age": 65}, "spending_go_go": 60000}"#)
                .unwrap();
        assert_eq!(input.spending_for_age(70), (SpendingPhase::GoGo, 60_000.0));
        assert_eq!(input.spending_for_age(75), (SpendingPhase::SlowGo, 60_000.0));
        assert_eq!(input.spending_for_age(90), (SpendingPhase::NoGo, 60_000.0));
    }
}
