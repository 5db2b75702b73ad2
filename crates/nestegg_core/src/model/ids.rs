//! Identifiers for the people and account buckets in a household
//!
//! Each identifier is a small `Copy` enum so that per-person and per-bucket
//! state can live in fixed-size arrays instead of maps.

use serde::{Deserialize, Serialize};

/// Which of the (at most two) household members a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonSlot {
    Person1,
    Person2,
}

impl PersonSlot {
    pub const ALL: [PersonSlot; 2] = [PersonSlot::Person1, PersonSlot::Person2];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            PersonSlot::Person1 => 0,
            PersonSlot::Person2 => 1,
        }
    }

    #[must_use]
    pub const fn other(self) -> PersonSlot {
        match self {
            PersonSlot::Person1 => PersonSlot::Person2,
            PersonSlot::Person2 => PersonSlot::Person1,
        }
    }
}

/// A single balance-carrying bucket owned by one person
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
    Tfsa,
    Rrsp,
    Rrif,
    NonRegCash,
    NonRegGic,
    NonRegInvest,
    CorpCash,
    CorpGic,
    CorpInvest,
}

impl BucketKind {
    pub const COUNT: usize = 9;

    pub const ALL: [BucketKind; BucketKind::COUNT] = [
        BucketKind::Tfsa,
        BucketKind::Rrsp,
        BucketKind::Rrif,
        BucketKind::NonRegCash,
        BucketKind::NonRegGic,
        BucketKind::NonRegInvest,
        BucketKind::CorpCash,
        BucketKind::CorpGic,
        BucketKind::CorpInvest,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Asset class used to look up market returns for this bucket
    #[must_use]
    pub const fn asset_class(self) -> AssetClass {
        match self {
            BucketKind::NonRegCash | BucketKind::CorpCash => AssetClass::Cash,
            BucketKind::NonRegGic | BucketKind::CorpGic => AssetClass::Gic,
            BucketKind::Tfsa
            | BucketKind::Rrsp
            | BucketKind::Rrif
            | BucketKind::NonRegInvest
            | BucketKind::CorpInvest => AssetClass::Investment,
        }
    }

    #[must_use]
    pub const fn is_corporate(self) -> bool {
        matches!(
            self,
            BucketKind::CorpCash | BucketKind::CorpGic | BucketKind::CorpInvest
        )
    }

    #[must_use]
    pub const fn is_non_registered(self) -> bool {
        matches!(
            self,
            BucketKind::NonRegCash | BucketKind::NonRegGic | BucketKind::NonRegInvest
        )
    }
}

/// Coordinates of one bucket in the household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketId {
    pub person: PersonSlot,
    pub kind: BucketKind,
}

impl BucketId {
    #[must_use]
    pub const fn new(person: PersonSlot, kind: BucketKind) -> Self {
        Self { person, kind }
    }
}

/// Broad asset class, used to apply return shocks in Monte Carlo trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Cash,
    Gic,
    Investment,
}
