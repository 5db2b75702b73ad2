//! Routing of after-tax surplus back into accounts
//!
//! TFSA room is filled first, split evenly between living persons with any
//! overflow offered to the other. What is left goes to non-registered accounts
//! using the household's weights. Surplus never goes into an RRSP.

use crate::model::{AccountModel, BucketId, BucketKind, PersonSlot, ReinvestWeights};

const DUST: f64 = 1e-9;

/// Where one year's surplus went, per person slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reinvestment {
    pub tfsa: [f64; 2],
    pub nonreg: [f64; 2],
}

impl Reinvestment {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.tfsa.iter().chain(self.nonreg.iter()).sum()
    }
}

pub fn reinvest_surplus(
    model: &mut AccountModel,
    surplus: f64,
    weights: &ReinvestWeights,
) -> Reinvestment {
    let mut result = Reinvestment::default();
    if surplus <= DUST {
        return result;
    }
    let living: Vec<PersonSlot> = model.living().map(|(slot, _)| slot).collect();
    if living.is_empty() {
        return result;
    }

    let mut remaining = surplus;
    let has_room = |model: &AccountModel, slot: PersonSlot| {
        model.person(slot).is_some_and(|p| p.tfsa_room > DUST)
    };
    let mut open: Vec<PersonSlot> = living
        .iter()
        .copied()
        .filter(|s| has_room(&*model, *s))
        .collect();
    while remaining > DUST && !open.is_empty() {
        let share = remaining / open.len() as f64;
        for &slot in &open {
            let accepted = model.consume_tfsa_room(slot, share);
            model.deposit(BucketId::new(slot, BucketKind::Tfsa), accepted, accepted);
            result.tfsa[slot.index()] += accepted;
            remaining -= accepted;
        }
        open.retain(|s| has_room(&*model, *s));
    }

    if remaining > DUST {
        let w = weights.normalized();
        let share = remaining / living.len() as f64;
        for &slot in &living {
            for (kind, weight) in [
                (BucketKind::NonRegCash, w.cash),
                (BucketKind::NonRegGic, w.gic),
                (BucketKind::NonRegInvest, w.invest),
            ] {
                let amount = share * weight;
                model.deposit(BucketId::new(slot, kind), amount, amount);
            }
            result.nonreg[slot.index()] += share;
        }
    }

    tracing::trace!(
        surplus,
        tfsa = result.tfsa[0] + result.tfsa[1],
        nonreg = result.nonreg[0] + result.nonreg[1],
        "reinvested surplus"
    );
    result
}
