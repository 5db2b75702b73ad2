//! Simulation results
//!
//! Contains the year-by-year trace, the post-hoc summary and the envelope
//! returned to callers of the non-panicking entry points.

use serde::{Deserialize, Serialize};

use super::household::SpendingPhase;
use super::ids::{BucketKind, PersonSlot};
use super::market::MarketProfiles;
use crate::error::{ComputationError, SimulationError, ValidationError};

/// Lifecycle phase of the household in a given year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// At least one person has not yet reached their CPP or OAS start age
    AccumulatingBenefitAges,
    FullBenefits,
    /// At least one person has passed the RRSP conversion age
    RrifMandatory,
    Terminal,
}

/// Movement of money through one bucket during one year
///
/// `end = start + growth + deposit - withdrawal - transfer_out` holds for every
/// flow the engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketFlow {
    pub person: PersonSlot,
    pub bucket: BucketKind,
    pub start: f64,
    pub growth: f64,
    pub deposit: f64,
    pub withdrawal: f64,
    pub transfer_out: f64,
    pub end: f64,
}

/// Absolute tolerance, scaled by the largest flow, for the conservation check
pub const CONSERVATION_TOLERANCE: f64 = 1e-6;

impl BucketFlow {
    #[must_use]
    pub fn expected_end(&self) -> f64 {
        self.start + self.growth + self.deposit - self.withdrawal - self.transfer_out
    }

    /// Check finiteness, non-negativity and conservation for this flow
    pub fn verify(&self, year: i16) -> Result<(), ComputationError> {
        let values = [
            ("start", self.start),
            ("growth", self.growth),
            ("deposit", self.deposit),
            ("withdrawal", self.withdrawal),
            ("transfer_out", self.transfer_out),
            ("end", self.end),
        ];
        if let Some((quantity, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ComputationError::NonFinite {
                year,
                person: Some(self.person),
                bucket: Some(self.bucket),
                quantity,
                value: *value,
            });
        }
        if self.end < -CONSERVATION_TOLERANCE {
            return Err(ComputationError::NegativeBalance {
                year,
                person: self.person,
                bucket: self.bucket,
                balance: self.end,
            });
        }
        let scale = values.iter().fold(1.0_f64, |acc, (_, v)| acc.max(v.abs()));
        if (self.end - self.expected_end()).abs() > CONSERVATION_TOLERANCE * scale {
            return Err(ComputationError::BalanceMismatch {
                year,
                person: self.person,
                bucket: self.bucket,
                expected: self.expected_end(),
                actual: self.end,
            });
        }
        Ok(())
    }
}

/// Per-person tax breakdown from the tax engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    pub federal: f64,
    pub provincial: f64,
    pub oas_clawback: f64,
    /// Federal + provincial + clawback
    pub total: f64,
    /// Combined rate on the next dollar of ordinary income
    pub marginal_rate: f64,
    pub taxable_income: f64,
    pub net_income: f64,
    pub rrsp_deduction: f64,
    /// Contribution above the deduction limit; reported, never blocked
    pub excess_rrsp_contribution: f64,
}

/// Withdrawals grouped by account family
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonWithdrawals {
    pub tfsa: f64,
    pub rrsp: f64,
    pub rrif: f64,
    pub nonreg: f64,
    pub corporate: f64,
}

impl PersonWithdrawals {
    pub fn add(&mut self, kind: BucketKind, amount: f64) {
        match kind {
            BucketKind::Tfsa => self.tfsa += amount,
            BucketKind::Rrsp => self.rrsp += amount,
            BucketKind::Rrif => self.rrif += amount,
            BucketKind::NonRegCash | BucketKind::NonRegGic | BucketKind::NonRegInvest => {
                self.nonreg += amount;
            }
            BucketKind::CorpCash | BucketKind::CorpGic | BucketKind::CorpInvest => {
                self.corporate += amount;
            }
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.tfsa + self.rrsp + self.rrif + self.nonreg + self.corporate
    }
}

/// One person's income, benefits and tax in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonYear {
    pub age: u32,
    pub cpp: f64,
    pub oas: f64,
    pub gis: f64,
    pub oas_clawback: f64,
    pub pension: f64,
    pub other_income: f64,
    /// Taxable interest and dividends from non-registered holdings
    pub nonreg_distributions: f64,
    pub rrif_minimum: f64,
    pub rrsp_contribution: f64,
    pub withdrawals: PersonWithdrawals,
    pub realized_capital_gains: f64,
    /// RRIF income received (positive) or attributed away (negative) by pension splitting
    pub pension_split: f64,
    pub tax: TaxResult,
}

/// Everything that happened to the household in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearResult {
    pub year: i16,
    pub year_index: u32,
    pub phase: LifecyclePhase,
    pub spending_phase: SpendingPhase,
    pub person1: Option<PersonYear>,
    pub person2: Option<PersonYear>,
    pub buckets: Vec<BucketFlow>,
    /// Gross income received by the household, withdrawals included
    pub total_income: f64,
    /// Personal tax plus corporate passive-income tax
    pub total_tax: f64,
    pub corporate_tax: f64,
    pub spending_need: f64,
    pub spending_met: f64,
    pub shortfall: f64,
    pub surplus_reinvested: f64,
    pub net_worth: f64,
    /// Net worth after tax on a deemed disposition of every account
    pub after_tax_estate: f64,
    pub funded: bool,
}

impl YearResult {
    #[must_use]
    pub fn person(&self, slot: PersonSlot) -> Option<&PersonYear> {
        match slot {
            PersonSlot::Person1 => self.person1.as_ref(),
            PersonSlot::Person2 => self.person2.as_ref(),
        }
    }

    pub fn persons(&self) -> impl Iterator<Item = (PersonSlot, &PersonYear)> {
        PersonSlot::ALL
            .into_iter()
            .filter_map(|slot| self.person(slot).map(|p| (slot, p)))
    }

    #[must_use]
    pub fn bucket(&self, person: PersonSlot, bucket: BucketKind) -> Option<&BucketFlow> {
        self.buckets
            .iter()
            .find(|f| f.person == person && f.bucket == bucket)
    }

    /// Personal tax only, excluding the corporation
    #[must_use]
    pub fn personal_tax(&self) -> f64 {
        self.total_tax - self.corporate_tax
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    FundingCoverage,
    TaxEfficiency,
    EstatePreservation,
    BenefitOptimization,
    RiskManagement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub score: f64,
    pub max: f64,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthRating {
    Excellent,
    Strong,
    Moderate,
    #[serde(rename = "Needs Attention")]
    NeedsAttention,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl HealthRating {
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            HealthRating::Excellent
        } else if score >= 70.0 {
            HealthRating::Strong
        } else if score >= 55.0 {
            HealthRating::Moderate
        } else if score >= 40.0 {
            HealthRating::NeedsAttention
        } else {
            HealthRating::AtRisk
        }
    }
}

/// Non-fatal condition surfaced alongside the trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationWarning {
    pub year: i16,
    pub kind: WarningKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarningKind {
    Shortfall { amount: f64 },
    ExcessRrspContribution { person: PersonSlot, amount: f64 },
    StoppedOnFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    /// Fraction of simulated years that were funded
    pub success_rate: f64,
    pub years_funded: u32,
    pub years_simulated: u32,
    pub first_shortfall_year: Option<i16>,
    pub total_shortfall: f64,
    pub total_tax: f64,
    pub average_effective_tax_rate: f64,
    pub final_net_worth: f64,
    pub final_estate_after_tax: f64,
    pub health_score: f64,
    pub health_rating: HealthRating,
    pub health_criteria: Vec<CriterionScore>,
    pub warnings: Vec<SimulationWarning>,
}

/// Adjusted minus baseline, field by field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryDiff {
    pub success_rate: f64,
    pub years_funded: i64,
    pub total_tax: f64,
    pub total_shortfall: f64,
    pub final_estate_after_tax: f64,
    pub health_score: f64,
}

impl SummaryDiff {
    #[must_use]
    pub fn between(baseline: &SimulationSummary, adjusted: &SimulationSummary) -> Self {
        Self {
            success_rate: adjusted.success_rate - baseline.success_rate,
            years_funded: i64::from(adjusted.years_funded) - i64::from(baseline.years_funded),
            total_tax: adjusted.total_tax - baseline.total_tax,
            total_shortfall: adjusted.total_shortfall - baseline.total_shortfall,
            final_estate_after_tax: adjusted.final_estate_after_tax
                - baseline.final_estate_after_tax,
            health_score: adjusted.health_score - baseline.health_score,
        }
    }
}

/// Typed result of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub summary: SimulationSummary,
    pub years: Vec<YearResult>,
}

/// Machine-readable detail attached to a failed response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<PersonSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<BucketKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Box<YearResult>>,
}

/// Envelope returned by `simulate`; never constructed from a panic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub success: bool,
    pub summary: Option<SimulationSummary>,
    pub year_by_year: Vec<YearResult>,
    pub error: Option<String>,
    pub error_details: Option<ErrorDetails>,
}

impl SimulationResponse {
    #[must_use]
    pub fn from_result(result: Result<SimulationOutcome, SimulationError>) -> Self {
        match result {
            Ok(outcome) => Self {
                success: true,
                summary: Some(outcome.summary),
                year_by_year: outcome.years,
                error: None,
                error_details: None,
            },
            Err(err) => Self {
                success: false,
                summary: None,
                year_by_year: Vec::new(),
                error: Some(err.to_string()),
                error_details: Some(err.details()),
            },
        }
    }
}

/// Configuration for a batch of randomized trials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonteCarloConfig {
    pub trials: usize,
    pub seed: u64,
    #[serde(default)]
    pub profiles: MarketProfiles,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            trials: 1_000,
            seed: 42,
            profiles: MarketProfiles::default(),
        }
    }
}

/// Headline numbers from one randomized trial
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialOutcome {
    pub seed: u64,
    pub success_rate: f64,
    pub fully_funded: bool,
    pub final_estate_after_tax: f64,
    pub health_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileValue {
    pub percentile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub trials: usize,
    pub probability_fully_funded: f64,
    pub mean_success_rate: f64,
    pub success_rate_percentiles: Vec<PercentileValue>,
    pub estate_percentiles: Vec<PercentileValue>,
    pub median_estate_after_tax: f64,
    pub mean_health_score: f64,
    pub outcomes: Vec<TrialOutcome>,
}
