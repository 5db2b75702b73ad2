//! Person Builder
//!
//! Fluent construction of a `Person` with every omitted field taken from
//! `config::defaults`, the same values serde uses for missing JSON fields.

use super::defaults;
use crate::model::{DividendType, IncomeStream, Person};

#[derive(Debug, Clone)]
pub struct PersonBuilder {
    person: Person,
}

impl PersonBuilder {
    #[must_use]
    pub fn new(start_age: u32) -> Self {
        Self {
            person: Person {
                name: None,
                start_age,
                end_age: None,
                retirement_age: None,
                cpp_start_age: defaults::CPP_START_AGE,
                cpp_annual_at_start: None,
                oas_start_age: defaults::OAS_START_AGE,
                oas_annual_at_start: None,
                pension_incomes: Vec::new(),
                other_incomes: Vec::new(),
                tfsa_balance: 0.0,
                tfsa_yield: defaults::REGISTERED_YIELD,
                tfsa_room_start: 0.0,
                tfsa_room_annual_growth: defaults::TFSA_ROOM_ANNUAL_GROWTH,
                rrsp_balance: 0.0,
                rrsp_yield: defaults::REGISTERED_YIELD,
                rrsp_annual_contribution: 0.0,
                rrsp_unused_room: 0.0,
                rrif_balance: 0.0,
                rrif_yield: defaults::REGISTERED_YIELD,
                age_rrsp_convert: defaults::RRSP_CONVERSION_AGE,
                nonreg_cash: 0.0,
                nonreg_cash_yield: defaults::CASH_YIELD,
                nonreg_gic: 0.0,
                nonreg_gic_yield: defaults::GIC_YIELD,
                nonreg_invest: 0.0,
                nonreg_invest_yield: defaults::INVEST_YIELD,
                nonreg_invest_dividend_yield: defaults::INVEST_DIVIDEND_YIELD,
                nonreg_acb: None,
                corp_cash: 0.0,
                corp_cash_yield: defaults::CASH_YIELD,
                corp_gic: 0.0,
                corp_gic_yield: defaults::GIC_YIELD,
                corp_invest: 0.0,
                corp_invest_yield: defaults::INVEST_YIELD,
                corp_invest_dividend_yield: defaults::INVEST_DIVIDEND_YIELD,
                corp_rdtoh: 0.0,
                corp_dividend_type: DividendType::default(),
            },
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.person.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn end_age(mut self, age: u32) -> Self {
        self.person.end_age = Some(age);
        self
    }

    #[must_use]
    pub fn retirement_age(mut self, age: u32) -> Self {
        self.person.retirement_age = Some(age);
        self
    }

    // =========================================================================
    // Government benefits
    // =========================================================================

    /// CPP start age with a known pension amount in the start year
    #[must_use]
    pub fn cpp(mut self, start_age: u32, annual_at_start: f64) -> Self {
        self.person.cpp_start_age = start_age;
        self.person.cpp_annual_at_start = Some(annual_at_start);
        self
    }

    /// CPP start age with the amount derived from the statutory maximum
    #[must_use]
    pub fn cpp_start_age(mut self, start_age: u32) -> Self {
        self.person.cpp_start_age = start_age;
        self
    }

    #[must_use]
    pub fn oas(mut self, start_age: u32, annual_at_start: f64) -> Self {
        self.person.oas_start_age = start_age;
        self.person.oas_annual_at_start = Some(annual_at_start);
        self
    }

    #[must_use]
    pub fn oas_start_age(mut self, start_age: u32) -> Self {
        self.person.oas_start_age = start_age;
        self
    }

    // =========================================================================
    // Income streams
    // =========================================================================

    #[must_use]
    pub fn pension(
        mut self,
        name: impl Into<String>,
        amount: f64,
        start_age: u32,
        inflation_indexed: bool,
    ) -> Self {
        self.person.pension_incomes.push(IncomeStream {
            name: name.into(),
            amount,
            start_age,
            end_age: None,
            inflation_indexed,
            earned: false,
        });
        self
    }

    #[must_use]
    pub fn other_income(mut self, stream: IncomeStream) -> Self {
        self.person.other_incomes.push(stream);
        self
    }

    /// Employment income from `start_age` until retirement
    #[must_use]
    pub fn employment(mut self, name: impl Into<String>, amount: f64) -> Self {
        let start_age = self.person.start_age;
        self.person.other_incomes.push(IncomeStream {
            name: name.into(),
            amount,
            start_age,
            end_age: None,
            inflation_indexed: true,
            earned: true,
        });
        self
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    #[must_use]
    pub fn tfsa(mut self, balance: f64, room: f64) -> Self {
        self.person.tfsa_balance = balance;
        self.person.tfsa_room_start = room;
        self
    }

    #[must_use]
    pub fn rrsp(mut self, balance: f64) -> Self {
        self.person.rrsp_balance = balance;
        self
    }

    #[must_use]
    pub fn rrsp_contributions(mut self, annual: f64, unused_room: f64) -> Self {
        self.person.rrsp_annual_contribution = annual;
        self.person.rrsp_unused_room = unused_room;
        self
    }

    #[must_use]
    pub fn rrif(mut self, balance: f64) -> Self {
        self.person.rrif_balance = balance;
        self
    }

    #[must_use]
    pub fn conversion_age(mut self, age: u32) -> Self {
        self.person.age_rrsp_convert = age;
        self
    }

    /// Same yield for TFSA, RRSP and RRIF
    #[must_use]
    pub fn registered_yield(mut self, rate: f64) -> Self {
        self.person.tfsa_yield = rate;
        self.person.rrsp_yield = rate;
        self.person.rrif_yield = rate;
        self
    }

    #[must_use]
    pub fn nonreg_cash(mut self, balance: f64) -> Self {
        self.person.nonreg_cash = balance;
        self
    }

    #[must_use]
    pub fn nonreg_gic(mut self, balance: f64) -> Self {
        self.person.nonreg_gic = balance;
        self
    }

    #[must_use]
    pub fn nonreg_invest(mut self, balance: f64, acb: f64) -> Self {
        self.person.nonreg_invest = balance;
        self.person.nonreg_acb = Some(acb);
        self
    }

    #[must_use]
    pub fn nonreg_yields(mut self, cash: f64, gic: f64, invest: f64, dividend: f64) -> Self {
        self.person.nonreg_cash_yield = cash;
        self.person.nonreg_gic_yield = gic;
        self.person.nonreg_invest_yield = invest;
        self.person.nonreg_invest_dividend_yield = dividend;
        self
    }

    #[must_use]
    pub fn corp_cash(mut self, balance: f64) -> Self {
        self.person.corp_cash = balance;
        self
    }

    #[must_use]
    pub fn corp_gic(mut self, balance: f64) -> Self {
        self.person.corp_gic = balance;
        self
    }

    #[must_use]
    pub fn corp_invest(mut self, balance: f64) -> Self {
        self.person.corp_invest = balance;
        self
    }

    #[must_use]
    pub fn corp_rdtoh(mut self, rdtoh: f64) -> Self {
        self.person.corp_rdtoh = rdtoh;
        self
    }

    #[must_use]
    pub fn corp_dividend_type(mut self, dividend_type: DividendType) -> Self {
        self.person.corp_dividend_type = dividend_type;
        self
    }

    /// Zero every yield so balances only move through flows
    #[must_use]
    pub fn no_growth(mut self) -> Self {
        let p = &mut self.person;
        p.tfsa_yield = 0.0;
        p.rrsp_yield = 0.0;
        p.rrif_yield = 0.0;
        p.nonreg_cash_yield = 0.0;
        p.nonreg_gic_yield = 0.0;
        p.nonreg_invest_yield = 0.0;
        p.nonreg_invest_dividend_yield = 0.0;
        p.corp_cash_yield = 0.0;
        p.corp_gic_yield = 0.0;
        p.corp_invest_yield = 0.0;
        p.corp_invest_dividend_yield = 0.0;
        self
    }

    /// The person without household-level validation
    #[must_use]
    pub fn build_person(self) -> Person {
        self.person
    }
}
