//! Account ledger for a household
//!
//! Every balance change goes through `AccountModel`, which records it in the
//! bucket's flow totals for the current year. `finish_year` turns those totals
//! into `BucketFlow` rows.

use serde::{Deserialize, Serialize};

use super::household::{DividendType, HouseholdInput, Person};
use super::ids::{BucketId, BucketKind, PersonSlot};
use super::results::BucketFlow;

/// Balance, cost base and return assumptions for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubBucket {
    pub balance: f64,
    /// Adjusted cost base; only meaningful for non-registered holdings
    pub acb: f64,
    /// Configured yearly total return
    pub yield_rate: f64,
    /// Part of the return paid out as dividends each year
    pub distribution_rate: f64,
}

impl SubBucket {
    #[must_use]
    pub fn new(balance: f64, yield_rate: f64) -> Self {
        Self {
            balance,
            acb: balance,
            yield_rate,
            distribution_rate: 0.0,
        }
    }

    #[must_use]
    pub fn unrealized_gain(&self) -> f64 {
        (self.balance - self.acb).max(0.0)
    }

    /// Share of each withdrawn dollar that is a capital gain
    #[must_use]
    pub fn gain_ratio(&self) -> f64 {
        if self.balance <= 0.0 {
            return 0.0;
        }
        (1.0 - self.acb / self.balance).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FlowTotals {
    start: f64,
    growth: f64,
    deposit: f64,
    withdrawal: f64,
    transfer_out: f64,
}

/// Amount actually taken from a bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Withdrawal {
    pub amount: f64,
    pub realized_gain: f64,
    /// Cost base that left the bucket with the withdrawal
    pub acb_removed: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonAccounts {
    buckets: [SubBucket; BucketKind::COUNT],
    flows: [FlowTotals; BucketKind::COUNT],
    pub tfsa_room: f64,
    pub tfsa_room_annual_growth: f64,
    /// TFSA withdrawals so far this year; re-added as room next year
    pub tfsa_withdrawn_ytd: f64,
    pub rdtoh: f64,
    pub dividend_type: DividendType,
    pub conversion_age: u32,
    pub alive: bool,
    reported: bool,
}

impl PersonAccounts {
    #[must_use]
    pub fn from_person(person: &Person) -> Self {
        let mut buckets = [SubBucket::default(); BucketKind::COUNT];
        buckets[BucketKind::Tfsa.index()] = SubBucket::new(person.tfsa_balance, person.tfsa_yield);
        buckets[BucketKind::Rrsp.index()] = SubBucket::new(person.rrsp_balance, person.rrsp_yield);
        buckets[BucketKind::Rrif.index()] = SubBucket::new(person.rrif_balance, person.rrif_yield);
        buckets[BucketKind::NonRegCash.index()] =
            SubBucket::new(person.nonreg_cash, person.nonreg_cash_yield);
        buckets[BucketKind::NonRegGic.index()] =
            SubBucket::new(person.nonreg_gic, person.nonreg_gic_yield);
        buckets[BucketKind::NonRegInvest.index()] = SubBucket {
            balance: person.nonreg_invest,
            acb: person.nonreg_acb.unwrap_or(person.nonreg_invest),
            yield_rate: person.nonreg_invest_yield,
            distribution_rate: person.nonreg_invest_dividend_yield,
        };
        buckets[BucketKind::CorpCash.index()] =
            SubBucket::new(person.corp_cash, person.corp_cash_yield);
        buckets[BucketKind::CorpGic.index()] =
            SubBucket::new(person.corp_gic, person.corp_gic_yield);
        buckets[BucketKind::CorpInvest.index()] = SubBucket {
            balance: person.corp_invest,
            acb: person.corp_invest,
            yield_rate: person.corp_invest_yield,
            distribution_rate: person.corp_invest_dividend_yield,
        };

        Self {
            buckets,
            flows: [FlowTotals::default(); BucketKind::COUNT],
            tfsa_room: person.tfsa_room_start,
            tfsa_room_annual_growth: person.tfsa_room_annual_growth,
            tfsa_withdrawn_ytd: 0.0,
            rdtoh: person.corp_rdtoh,
            dividend_type: person.corp_dividend_type,
            conversion_age: person.age_rrsp_convert,
            alive: true,
            reported: true,
        }
    }

    #[must_use]
    pub fn bucket(&self, kind: BucketKind) -> &SubBucket {
        &self.buckets[kind.index()]
    }

    #[must_use]
    pub fn balance(&self, kind: BucketKind) -> f64 {
        self.buckets[kind.index()].balance
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.buckets.iter().map(|b| b.balance).sum()
    }

    #[must_use]
    pub fn total_of(&self, kinds: &[BucketKind]) -> f64 {
        kinds.iter().map(|k| self.balance(*k)).sum()
    }

    /// Balance at the start of the current year
    #[must_use]
    pub fn start_balance(&self, kind: BucketKind) -> f64 {
        self.flows[kind.index()].start
    }
}

/// Balances of every present person
#[derive(Debug, Clone, PartialEq)]
pub struct AccountModel {
    persons: [Option<PersonAccounts>; 2],
}

impl AccountModel {
    #[must_use]
    pub fn from_input(input: &HouseholdInput) -> Self {
        Self {
            persons: [
                input.person1.as_ref().map(PersonAccounts::from_person),
                input.person2.as_ref().map(PersonAccounts::from_person),
            ],
        }
    }

    #[must_use]
    pub fn person(&self, slot: PersonSlot) -> Option<&PersonAccounts> {
        self.persons[slot.index()].as_ref()
    }

    pub fn person_mut(&mut self, slot: PersonSlot) -> Option<&mut PersonAccounts> {
        self.persons[slot.index()].as_mut()
    }

    /// Persons still alive, in slot order
    pub fn living(&self) -> impl Iterator<Item = (PersonSlot, &PersonAccounts)> {
        PersonSlot::ALL.into_iter().filter_map(|slot| {
            self.person(slot)
                .filter(|p| p.alive)
                .map(|p| (slot, p))
        })
    }

    #[must_use]
    pub fn is_alive(&self, slot: PersonSlot) -> bool {
        self.person(slot).is_some_and(|p| p.alive)
    }

    #[must_use]
    pub fn balance(&self, id: BucketId) -> f64 {
        self.person(id.person).map_or(0.0, |p| p.balance(id.kind))
    }

    #[must_use]
    pub fn bucket(&self, id: BucketId) -> Option<&SubBucket> {
        self.person(id.person).map(|p| p.bucket(id.kind))
    }

    #[must_use]
    pub fn net_worth(&self) -> f64 {
        self.persons.iter().flatten().map(PersonAccounts::total).sum()
    }

    /// Open the flow ledger for a new year
    pub fn begin_year(&mut self) {
        for p in self.persons.iter_mut().flatten() {
            p.reported = p.alive;
            for (flow, bucket) in p.flows.iter_mut().zip(p.buckets.iter()) {
                *flow = FlowTotals {
                    start: bucket.balance,
                    ..FlowTotals::default()
                };
            }
        }
    }

    /// Add last year's TFSA withdrawals and the annual limit to each person's room
    pub fn roll_tfsa_room(&mut self, first_year: bool) {
        for p in self.persons.iter_mut().flatten().filter(|p| p.alive) {
            if !first_year {
                p.tfsa_room += p.tfsa_room_annual_growth + p.tfsa_withdrawn_ytd;
            }
            p.tfsa_withdrawn_ytd = 0.0;
        }
    }

    /// Record investment growth (may be negative)
    ///
    /// `acb_increase` is the part of the growth already taxed this year, such as
    /// reinvested interest or distributions.
    pub fn grow(&mut self, id: BucketId, amount: f64, acb_increase: f64) {
        if let Some(p) = self.person_mut(id.person) {
            let i = id.kind.index();
            p.buckets[i].balance += amount;
            p.buckets[i].acb += acb_increase;
            p.flows[i].growth += amount;
        }
    }

    /// Add money to a bucket, raising its cost base by `acb_increase`
    pub fn deposit(&mut self, id: BucketId, amount: f64, acb_increase: f64) {
        if amount <= 0.0 {
            return;
        }
        if let Some(p) = self.person_mut(id.person) {
            let i = id.kind.index();
            p.buckets[i].balance += amount;
            p.buckets[i].acb += acb_increase;
            p.flows[i].deposit += amount;
        }
    }

    /// Take up to `amount` out of a bucket, realizing a proportional gain
    pub fn withdraw(&mut self, id: BucketId, amount: f64) -> Withdrawal {
        let Some(p) = self.person_mut(id.person) else {
            return Withdrawal::default();
        };
        let i = id.kind.index();
        let taken = take(&mut p.buckets[i], amount);
        p.flows[i].withdrawal += taken.amount;
        if id.kind == BucketKind::Tfsa {
            p.tfsa_withdrawn_ytd += taken.amount;
        }
        taken
    }

    fn transfer_out(&mut self, id: BucketId, amount: f64) -> Withdrawal {
        let Some(p) = self.person_mut(id.person) else {
            return Withdrawal::default();
        };
        let i = id.kind.index();
        let taken = take(&mut p.buckets[i], amount);
        p.flows[i].transfer_out += taken.amount;
        taken
    }

    /// Move the whole RRSP into the RRIF; returns the amount converted
    pub fn convert_rrsp_to_rrif(&mut self, slot: PersonSlot) -> f64 {
        let amount = self.balance(BucketId::new(slot, BucketKind::Rrsp));
        if amount <= 0.0 {
            return 0.0;
        }
        let moved = self.transfer_out(BucketId::new(slot, BucketKind::Rrsp), amount);
        self.deposit(BucketId::new(slot, BucketKind::Rrif), moved.amount, moved.amount);
        moved.amount
    }

    /// Transfer every bucket of `deceased` to the same bucket of `survivor`
    ///
    /// Cost base and RDTOH carry over. The deceased stays in the ledger for the
    /// rest of the year with zero balances.
    pub fn rollover_to_survivor(&mut self, deceased: PersonSlot, survivor: PersonSlot) -> f64 {
        let mut total = 0.0;
        for kind in BucketKind::ALL {
            let amount = self.balance(BucketId::new(deceased, kind));
            if amount <= 0.0 {
                continue;
            }
            let moved = self.transfer_out(BucketId::new(deceased, kind), amount);
            self.deposit(BucketId::new(survivor, kind), moved.amount, moved.acb_removed);
            total += moved.amount;
        }
        let rdtoh = self.person(deceased).map_or(0.0, |p| p.rdtoh);
        if let Some(p) = self.person_mut(deceased) {
            p.rdtoh = 0.0;
            p.alive = false;
        }
        if let Some(p) = self.person_mut(survivor) {
            p.rdtoh += rdtoh;
        }
        total
    }

    /// Mark a person as no longer simulated without moving any money
    pub fn retire_person(&mut self, slot: PersonSlot) {
        if let Some(p) = self.person_mut(slot) {
            p.alive = false;
        }
    }

    pub fn add_rdtoh(&mut self, slot: PersonSlot, amount: f64) {
        if let Some(p) = self.person_mut(slot) {
            p.rdtoh += amount;
        }
    }

    /// Release up to `requested` from RDTOH; returns the amount released
    pub fn release_rdtoh(&mut self, slot: PersonSlot, requested: f64) -> f64 {
        let Some(p) = self.person_mut(slot) else {
            return 0.0;
        };
        let refund = requested.max(0.0).min(p.rdtoh.max(0.0));
        p.rdtoh -= refund;
        refund
    }

    /// Use up TFSA contribution room; returns the amount accepted
    pub fn consume_tfsa_room(&mut self, slot: PersonSlot, requested: f64) -> f64 {
        let Some(p) = self.person_mut(slot) else {
            return 0.0;
        };
        let accepted = requested.max(0.0).min(p.tfsa_room.max(0.0));
        p.tfsa_room -= accepted;
        accepted
    }

    /// Close the year's ledger and return one flow per bucket of every reported person
    #[must_use]
    pub fn finish_year(&self) -> Vec<BucketFlow> {
        let mut flows = Vec::with_capacity(2 * BucketKind::COUNT);
        for slot in PersonSlot::ALL {
            let Some(p) = self.person(slot).filter(|p| p.reported) else {
                continue;
            };
            for kind in BucketKind::ALL {
                let f = p.flows[kind.index()];
                flows.push(BucketFlow {
                    person: slot,
                    bucket: kind,
                    start: f.start,
                    growth: f.growth,
                    deposit: f.deposit,
                    withdrawal: f.withdrawal,
                    transfer_out: f.transfer_out,
                    end: p.balance(kind),
                });
            }
        }
        flows
    }
}

fn take(bucket: &mut SubBucket, requested: f64) -> Withdrawal {
    let amount = requested.clamp(0.0, bucket.balance.max(0.0));
    if amount <= 0.0 {
        return Withdrawal::default();
    }
    let fraction = amount / bucket.balance;
    let acb_removed = bucket.acb * fraction;
    let realized_gain = (amount - acb_removed).max(0.0);
    bucket.balance -= amount;
    bucket.acb -= acb_removed;
    if bucket.balance <= 0.0 {
        bucket.balance = 0.0;
        bucket.acb = 0.0;
    }
    Withdrawal {
        amount,
        realized_gain,
        acb_removed,
    }
}
