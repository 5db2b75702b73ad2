use serde::{Deserialize, Serialize};

use super::ids::BucketKind;

/// Named withdrawal strategy selecting the order in which account tiers are drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Draw registered money first to flatten lifetime taxable income
    MinimizeIncome,
    #[default]
    Balanced,
    CorporateOptimized,
    CapitalGainsOptimized,
    TfsaFirst,
}

/// Group of buckets that are drawn together at one position in a strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// RRSP then RRIF
    Registered,
    Corporate,
    NonRegistered,
    Tfsa,
}

impl Tier {
    /// Buckets drawn together, pro-rata by balance
    #[must_use]
    pub const fn buckets(self) -> &'static [BucketKind] {
        match self {
            Tier::Registered => &[BucketKind::Rrsp, BucketKind::Rrif],
            Tier::Corporate => &[
                BucketKind::CorpCash,
                BucketKind::CorpGic,
                BucketKind::CorpInvest,
            ],
            Tier::NonRegistered => &[
                BucketKind::NonRegCash,
                BucketKind::NonRegGic,
                BucketKind::NonRegInvest,
            ],
            Tier::Tfsa => &[BucketKind::Tfsa],
        }
    }
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::MinimizeIncome,
        Strategy::Balanced,
        Strategy::CorporateOptimized,
        Strategy::CapitalGainsOptimized,
        Strategy::TfsaFirst,
    ];

    /// Ordered tiers for this strategy
    #[must_use]
    pub const fn tiers(self) -> &'static [Tier; 4] {
        match self {
            Strategy::MinimizeIncome => &[
                Tier::Registered,
                Tier::Corporate,
                Tier::NonRegistered,
                Tier::Tfsa,
            ],
            Strategy::Balanced => &[
                Tier::NonRegistered,
                Tier::Registered,
                Tier::Corporate,
                Tier::Tfsa,
            ],
            Strategy::CorporateOptimized => &[
                Tier::Corporate,
                Tier::NonRegistered,
                Tier::Registered,
                Tier::Tfsa,
            ],
            Strategy::CapitalGainsOptimized => &[
                Tier::NonRegistered,
                Tier::Corporate,
                Tier::Registered,
                Tier::Tfsa,
            ],
            Strategy::TfsaFirst => &[
                Tier::Tfsa,
                Tier::NonRegistered,
                Tier::Corporate,
                Tier::Registered,
            ],
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Strategy::MinimizeIncome => "minimize-income",
            Strategy::Balanced => "balanced",
            Strategy::CorporateOptimized => "corporate-optimized",
            Strategy::CapitalGainsOptimized => "capital-gains-optimized",
            Strategy::TfsaFirst => "tfsa-first",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strategy_covers_every_tier_once() {
        for strategy in Strategy::ALL {
            let tiers = strategy.tiers();
            for tier in [
                Tier::Registered,
                Tier::Corporate,
                Tier::NonRegistered,
                Tier::Tfsa,
            ] {
                assert_eq!(
                    tiers.iter().filter(|t| **t == tier).count(),
                    1,
                    "{strategy} must list {tier:?} exactly once"
                );
            }
        }
    }

    #[test]
    fn strategy_names_round_trip_through_serde() {
        for strategy in Strategy::ALL {
            let json = serde_json::to_string(&strategy).unwrap();
            assert_eq!(json, format!("\"{}\"", strategy.name()));
        }
        let parsed: Strategy = serde_json::from_str("\"capital-gains-optimized\"").unwrap();
        assert_eq!(parsed, Strategy::CapitalGainsOptimized);
    }
}
