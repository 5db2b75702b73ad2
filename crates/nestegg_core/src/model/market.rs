use rand::{Rng, distr::Distribution};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::{AssetClass, BucketKind};
use crate::error::MarketError;

/// Lowest yearly return a bucket can experience
pub const RETURN_FLOOR: f64 = -0.95;

/// Distribution of the yearly deviation from a bucket's configured yield
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReturnProfile {
    #[default]
    None,
    Fixed {
        rate: f64,
    },
    Normal {
        mean: f64,
        std_dev: f64,
    },
    LogNormal {
        mean: f64,
        std_dev: f64,
    },
}

impl ReturnProfile {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, MarketError> {
        match self {
            ReturnProfile::None => Ok(0.0),
            ReturnProfile::Fixed { rate } => Ok(*rate),
            ReturnProfile::Normal { mean, std_dev } => rand_distr::Normal::new(*mean, *std_dev)
                .map(|d| d.sample(rng))
                .map_err(|_| MarketError::InvalidDistributionParameters {
                    profile_type: "Normal return",
                    mean: *mean,
                    std_dev: *std_dev,
                    reason: "std_dev must be non-negative and finite",
                }),
            ReturnProfile::LogNormal { mean, std_dev } => {
                rand_distr::LogNormal::new(*mean, *std_dev)
                    .map(|d| d.sample(rng) - 1.0)
                    .map_err(|_| MarketError::InvalidDistributionParameters {
                        profile_type: "LogNormal return",
                        mean: *mean,
                        std_dev: *std_dev,
                        reason: "std_dev must be positive and finite",
                    })
            }
        }
    }

    pub fn sample_sequence<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        num_years: usize,
    ) -> Result<Vec<f64>, MarketError> {
        (0..num_years).map(|_| self.sample(rng)).collect()
    }
}

/// Yearly return shocks added on top of each bucket's configured yield
///
/// A deterministic run uses an empty market, so every bucket earns exactly its
/// configured yield.
#[derive(Debug, Clone, Default)]
pub struct Market {
    shocks: FxHashMap<AssetClass, Vec<f64>>,
}

impl Market {
    #[must_use]
    pub fn deterministic() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn new(shocks: FxHashMap<AssetClass, Vec<f64>>) -> Self {
        Self { shocks }
    }

    /// Draw a shock series per asset class
    ///
    /// Classes are sampled in a fixed order so a given seed always produces the
    /// same market.
    pub fn from_profiles<R: Rng + ?Sized>(
        rng: &mut R,
        num_years: usize,
        profiles: &MarketProfiles,
    ) -> Result<Self, MarketError> {
        let mut shocks = FxHashMap::default();
        for (class, profile) in [
            (AssetClass::Cash, &profiles.cash),
            (AssetClass::Gic, &profiles.gic),
            (AssetClass::Investment, &profiles.investment),
        ] {
            if *profile != ReturnProfile::None {
                shocks.insert(class, profile.sample_sequence(rng, num_years)?);
            }
        }
        Ok(Self { shocks })
    }

    #[must_use]
    pub fn shock(&self, class: AssetClass, year_index: usize) -> f64 {
        self.shocks
            .get(&class)
            .and_then(|series| series.get(year_index))
            .copied()
            .unwrap_or(0.0)
    }

    /// Realized return for a bucket, never below `RETURN_FLOOR`
    #[must_use]
    pub fn rate(&self, kind: BucketKind, configured_yield: f64, year_index: usize) -> f64 {
        (configured_yield + self.shock(kind.asset_class(), year_index)).max(RETURN_FLOOR)
    }
}

/// Shock profile per asset class
///
/// Missing classes take their value from `MarketProfiles::default()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketProfiles {
    pub cash: ReturnProfile,
    pub gic: ReturnProfile,
    pub investment: ReturnProfile,
}

impl Default for MarketProfiles {
    fn default() -> Self {
        Self {
            cash: ReturnProfile::None,
            gic: ReturnProfile::None,
            investment: ReturnProfile::Normal {
                mean: 0.0,
                std_dev: 0.12,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn deterministic_market_has_no_shocks() {
        let market = Market::deterministic();
        assert_eq!(market.rate(BucketKind::Rrif, 0.05, 10), 0.05);
        assert_eq!(market.shock(AssetClass::Cash, 0), 0.0);
    }

    #[test]
    fn rate_is_floored() {
        let mut shocks = FxHashMap::default();
        shocks.insert(AssetClass::Investment, vec![-3.0]);
        let market = Market::new(shocks);
        assert_eq!(market.rate(BucketKind::Tfsa, 0.05, 0), RETURN_FLOOR);
        assert_eq!(market.rate(BucketKind::NonRegCash, 0.02, 0), 0.02);
    }

    #[test]
    fn same_seed_same_market() {
        let profiles = MarketProfiles::default();
        let a = Market::from_profiles(&mut SmallRng::seed_from_u64(7), 30, &profiles).unwrap();
        let b = Market::from_profiles(&mut SmallRng::seed_from_u64(7), 30, &profiles).unwrap();
        for year in 0..30 {
            assert_eq!(
                a.shock(AssetClass::Investment, year),
                b.shock(AssetClass::Investment, year)
            );
        }
    }

    #[test]
    fn invalid_std_dev_is_an_error() {
        let profile = ReturnProfile::Normal {
            mean: 0.0,
            std_dev: -1.0,
        };
        assert!(profile.sample(&mut SmallRng::seed_from_u64(1)).is_err());
    }

    #[test]
    fn profiles_parse_from_tagged_json() {
        let profiles: MarketProfiles = serde_json::from_str(
            r#"{"cash": {"type": "Fixed", "rate": -0.01}, "investment": {"type": "None"}}"#,
        )
        .unwrap();
        assert_eq!(profiles.cash, ReturnProfile::Fixed { rate: -0.01 });
        assert_eq!(profiles.gic, ReturnProfile::None);
        assert_eq!(profiles.investment, ReturnProfile::None);
    }
}
