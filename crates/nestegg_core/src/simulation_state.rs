//! Mutable state for one simulation run
//!
//! Created from an immutable `HouseholdInput`, advanced one year at a time by
//! the loop in `simulation`, and dropped once the trace is built.

use crate::error::ComputationError;
use crate::model::{
    AccountModel, BenefitConfig, HouseholdInput, LifecyclePhase, Market, Person, PersonSlot,
    RrifTable, TaxConfig,
};

pub struct SimulationState<'a> {
    pub input: &'a HouseholdInput,
    pub market: &'a Market,
    pub accounts: AccountModel,
    /// Base-year tax tables; indexed per year with `tax_config`
    pub tax_base: TaxConfig,
    pub benefits: BenefitConfig,
    pub rrif_table: RrifTable,
    pub start_year: i16,
    pub year_index: u32,
    /// Each person's income other than OAS in the previous year, for the GIS estimate
    pub prior_income: Option<[f64; 2]>,
    /// Unused RRSP deduction room carried into the year
    pub rrsp_room: [f64; 2],
    pub phase: LifecyclePhase,
}

impl<'a> SimulationState<'a> {
    pub fn new(
        input: &'a HouseholdInput,
        market: &'a Market,
        start_year: i16,
    ) -> Result<Self, ComputationError> {
        if input.persons().next().is_none() {
            return Err(ComputationError::MissingPerson);
        }
        let mut state = Self {
            input,
            market,
            accounts: AccountModel::from_input(input),
            tax_base: input.resolved_tax_config(),
            benefits: input.resolved_benefit_config(),
            rrif_table: input.resolved_rrif_table(),
            start_year,
            year_index: 0,
            prior_income: None,
            rrsp_room: PersonSlot::ALL
                .map(|slot| input.person(slot).map_or(0.0, |p| p.rrsp_unused_room)),
            phase: LifecyclePhase::AccumulatingBenefitAges,
        };
        state.phase = state.current_phase();
        Ok(state)
    }

    #[must_use]
    pub fn year(&self) -> i16 {
        // horizon is bounded by validated ages, so this never exceeds i16
        self.start_year.saturating_add(i16::try_from(self.year_index).unwrap_or(i16::MAX))
    }

    /// Cumulative general inflation since the start year
    #[must_use]
    pub fn general_index(&self) -> f64 {
        index_factor(self.input.general_inflation, self.year_index)
    }

    #[must_use]
    pub fn spending_index(&self) -> f64 {
        index_factor(self.input.spending_inflation, self.year_index)
    }

    #[must_use]
    pub fn tax_config(&self) -> TaxConfig {
        self.tax_base.indexed(self.general_index())
    }

    /// Age this year, for a person still alive
    #[must_use]
    pub fn age(&self, slot: PersonSlot) -> Option<u32> {
        if !self.accounts.is_alive(slot) {
            return None;
        }
        self.input
            .person(slot)
            .map(|p| p.start_age + self.year_index)
    }

    /// Living persons with their age this year
    #[must_use]
    pub fn living(&self) -> Vec<(PersonSlot, &'a Person, u32)> {
        let input = self.input;
        PersonSlot::ALL
            .into_iter()
            .filter_map(|slot| {
                let age = self.age(slot)?;
                input.person(slot).map(|p| (slot, p, age))
            })
            .collect()
    }

    #[must_use]
    pub fn oldest_age(&self) -> Option<u32> {
        self.living().iter().map(|(_, _, age)| *age).max()
    }

    fn past_end(&self, slot: PersonSlot) -> bool {
        match (self.age(slot), self.input.person_end_age(slot)) {
            (Some(age), Some(end)) => age > end,
            _ => false,
        }
    }

    /// Remove persons past their end age, handing their accounts to a survivor
    ///
    /// Returns false when nobody is left to simulate.
    pub fn settle_deaths(&mut self) -> bool {
        for slot in PersonSlot::ALL {
            if !self.past_end(slot) {
                continue;
            }
            let survivor = slot.other();
            if self.age(survivor).is_some() && !self.past_end(survivor) {
                let moved = self.accounts.rollover_to_survivor(slot, survivor);
                tracing::debug!(
                    year = self.year(),
                    deceased = ?slot,
                    survivor = ?survivor,
                    moved,
                    "rolled accounts over to survivor"
                );
            } else {
                self.accounts.retire_person(slot);
            }
        }
        self.accounts.living().next().is_some()
    }

    /// Phase implied by the ages of the persons alive this year
    #[must_use]
    pub fn current_phase(&self) -> LifecyclePhase {
        let living = self.living();
        if living.is_empty() {
            return LifecyclePhase::Terminal;
        }
        let rrif_mandatory = living.iter().any(|(slot, p, age)| {
            let conversion = self
                .accounts
                .person(*slot)
                .map_or(p.age_rrsp_convert, |a| a.conversion_age);
            *age >= conversion
        });
        if rrif_mandatory {
            return LifecyclePhase::RrifMandatory;
        }
        let all_benefits = living.iter().all(|(_, p, age)| {
            *age >= p.cpp_start_age && *age >= p.oas_start_age.max(self.benefits.oas_earliest_age)
        });
        if all_benefits {
            LifecyclePhase::FullBenefits
        } else {
            LifecyclePhase::AccumulatingBenefitAges
        }
    }

    /// Update the phase for the current year, logging transitions
    pub fn update_phase(&mut self) {
        let next = self.current_phase();
        if next != self.phase {
            tracing::debug!(year = self.year(), from = ?self.phase, to = ?next, "phase transition");
            self.phase = next;
        }
    }

    pub fn advance(&mut self) {
        self.year_index += 1;
    }
}

#[must_use]
pub fn index_factor(rate: f64, years: u32) -> f64 {
    (1.0 + rate).powi(i32::try_from(years).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HouseholdBuilder, PersonBuilder};

    #[test]
    fn index_factor_compounds() {
        assert_eq!(index_factor(0.02, 0), 1.0);
        assert!((index_factor(0.02, 2) - 1.0404).abs() < 1e-12);
    }

    #[test]
    fn phases_follow_ages() {
        let input = HouseholdBuilder::new()
            .person1(PersonBuilder::new(63).cpp_start_age(65).oas_start_age(65))
            .spending(1.0)
            .start_year(2025)
            .build()
            .unwrap();
        let market = Market::deterministic();
        let mut state = SimulationState::new(&input, &market, 2025).unwrap();
        assert_eq!(state.phase, LifecyclePhase::AccumulatingBenefitAges);
        state.year_index = 2;
        state.update_phase();
        assert_eq!(state.phase, LifecyclePhase::FullBenefits);
        state.year_index = 8;
        state.update_phase();
        assert_eq!(state.phase, LifecyclePhase::RrifMandatory);
    }

    #[test]
    fn survivor_keeps_simulating() {
        let input = HouseholdBuilder::new()
            .person1(PersonBuilder::new(80).end_age(80).rrif(10_000.0))
            .person2(PersonBuilder::new(75))
            .spending(1.0)
            .start_year(2025)
            .build()
            .unwrap();
        let market = Market::deterministic();
        let mut state = SimulationState::new(&input, &market, 2025).unwrap();
        assert!(state.settle_deaths());
        assert_eq!(state.living().len(), 2);
        state.advance();
        state.accounts.begin_year();
        assert!(state.settle_deaths());
        assert_eq!(state.living().len(), 1);
        assert_eq!(state.age(PersonSlot::Person1), None);
        assert_eq!(state.oldest_age(), Some(76));
    }
}
