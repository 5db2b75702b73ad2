//! Withdrawal planning across tiers and persons
//!
//! A `WithdrawalPlan` is a proposal: nothing leaves an account until the
//! simulation loop applies the plan. This lets the loop re-size withdrawals
//! against the tax engine without unwinding ledger entries.

use crate::model::{
    AccountModel, BucketId, BucketKind, DividendType, PersonSlot, Strategy, Tier,
};
use crate::taxes::IncomeComposition;

/// Amounts below this are treated as zero when walking tiers
const DUST: f64 = 1e-9;

/// Proposed withdrawal per bucket
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WithdrawalPlan {
    amounts: [[f64; BucketKind::COUNT]; 2],
}

impl WithdrawalPlan {
    #[must_use]
    pub fn get(&self, id: BucketId) -> f64 {
        self.amounts[id.person.index()][id.kind.index()]
    }

    pub fn add(&mut self, id: BucketId, amount: f64) {
        self.amounts[id.person.index()][id.kind.index()] += amount;
    }

    #[must_use]
    pub fn person_total(&self, slot: PersonSlot) -> f64 {
        self.amounts[slot.index()].iter().sum()
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        PersonSlot::ALL.iter().map(|s| self.person_total(*s)).sum()
    }

    /// Non-zero entries, in slot then bucket order
    pub fn entries(&self) -> impl Iterator<Item = (BucketId, f64)> + '_ {
        PersonSlot::ALL.into_iter().flat_map(move |slot| {
            BucketKind::ALL.into_iter().filter_map(move |kind| {
                let id = BucketId::new(slot, kind);
                let amount = self.get(id);
                (amount > 0.0).then_some((id, amount))
            })
        })
    }
}

/// Balance not yet claimed by the plan
#[must_use]
pub fn available(model: &AccountModel, plan: &WithdrawalPlan, id: BucketId) -> f64 {
    if !model.is_alive(id.person) {
        return 0.0;
    }
    (model.balance(id) - plan.get(id)).max(0.0)
}

/// Seed a plan with the forced RRIF minimums, capped at what is in the account
#[must_use]
pub fn forced_plan(model: &AccountModel, minimums: [f64; 2]) -> WithdrawalPlan {
    let mut plan = WithdrawalPlan::default();
    for (slot, _) in model.living() {
        let id = BucketId::new(slot, BucketKind::Rrif);
        let amount = minimums[slot.index()].min(model.balance(id));
        if amount > 0.0 {
            plan.add(id, amount);
        }
    }
    plan
}

/// Total still available in a tier across every living person
#[must_use]
pub fn tier_available(model: &AccountModel, plan: &WithdrawalPlan, tier: Tier) -> f64 {
    model
        .living()
        .map(|(slot, _)| person_tier_available(model, plan, slot, tier))
        .sum()
}

fn person_tier_available(
    model: &AccountModel,
    plan: &WithdrawalPlan,
    slot: PersonSlot,
    tier: Tier,
) -> f64 {
    tier.buckets()
        .iter()
        .map(|kind| available(model, plan, BucketId::new(slot, *kind)))
        .sum()
}

/// Add up to `amount` to the plan, walking the strategy's tiers in order
///
/// Within a tier every bucket of every living person contributes in
/// proportion to what it has left. Returns the amount actually added, which is
/// less than requested only when every tier is exhausted.
pub fn draw_from_tiers(
    model: &AccountModel,
    plan: &mut WithdrawalPlan,
    strategy: Strategy,
    amount: f64,
) -> f64 {
    let mut remaining = amount.max(0.0);
    for &tier in strategy.tiers() {
        if remaining <= DUST {
            break;
        }
        let shares: Vec<(BucketId, f64)> = model
            .living()
            .flat_map(|(slot, _)| {
                tier.buckets()
                    .iter()
                    .map(move |kind| BucketId::new(slot, *kind))
            })
            .map(|id| (id, available(model, plan, id)))
            .filter(|(_, a)| *a > 0.0)
            .collect();
        let tier_total: f64 = shares.iter().map(|(_, a)| a).sum();
        if tier_total <= DUST {
            continue;
        }
        let take = remaining.min(tier_total);
        let mut drawn = 0.0;
        for (id, bucket_available) in shares {
            let part = (take * bucket_available / tier_total).min(bucket_available);
            if part > 0.0 {
                plan.add(id, part);
                drawn += part;
            }
        }
        remaining -= drawn;
    }
    amount.max(0.0) - remaining
}

/// Tax character of a person's planned withdrawals
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WithdrawalIncome {
    pub rrsp: f64,
    pub rrif: f64,
    pub capital_gains: f64,
    pub eligible_dividends: f64,
    pub non_eligible_dividends: f64,
}

impl WithdrawalIncome {
    pub fn apply_to(&self, income: &mut IncomeComposition) {
        income.rrsp += self.rrsp;
        income.rrif += self.rrif;
        income.capital_gains += self.capital_gains;
        income.eligible_dividends += self.eligible_dividends;
        income.non_eligible_dividends += self.non_eligible_dividends;
    }
}

/// Taxable income the plan would generate for one person
///
/// Non-registered sales realize gains at the bucket's current gain ratio;
/// corporate withdrawals are paid out as dividends of the corporation's type.
#[must_use]
pub fn planned_income(
    model: &AccountModel,
    plan: &WithdrawalPlan,
    slot: PersonSlot,
) -> WithdrawalIncome {
    let Some(person) = model.person(slot) else {
        return WithdrawalIncome::default();
    };
    let mut income = WithdrawalIncome::default();
    for kind in BucketKind::ALL {
        let amount = plan.get(BucketId::new(slot, kind));
        if amount <= 0.0 {
            continue;
        }
        match kind {
            BucketKind::Rrsp => income.rrsp += amount,
            BucketKind::Rrif => income.rrif += amount,
            BucketKind::NonRegCash | BucketKind::NonRegGic | BucketKind::NonRegInvest => {
                income.capital_gains += amount * person.bucket(kind).gain_ratio();
            }
            BucketKind::CorpCash | BucketKind::CorpGic | BucketKind::CorpInvest => {
                match person.dividend_type {
                    DividendType::Eligible => income.eligible_dividends += amount,
                    DividendType::NonEligible => income.non_eligible_dividends += amount,
                }
            }
            BucketKind::Tfsa => {}
        }
    }
    income
}
