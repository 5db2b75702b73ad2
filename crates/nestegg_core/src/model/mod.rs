mod accounts;
mod benefit_config;
mod household;
mod ids;
mod market;
mod results;
mod rrif;
mod strategy;
mod tax_config;

pub use accounts::{AccountModel, PersonAccounts, SubBucket, Withdrawal};
pub use benefit_config::BenefitConfig;
pub use household::{
    DividendType, HouseholdInput, IncomeStream, Person, ReinvestWeights, SpendingPhase,
};
pub use ids::{AssetClass, BucketId, BucketKind, PersonSlot};
pub use market::{Market, MarketProfiles, RETURN_FLOOR, ReturnProfile};
pub use results::{
    BucketFlow, CONSERVATION_TOLERANCE, Criterion, CriterionScore, ErrorDetails, HealthRating,
    LifecyclePhase, MonteCarloConfig, MonteCarloSummary, PercentileValue, PersonWithdrawals,
    PersonYear, SimulationOutcome, SimulationResponse, SimulationSummary, SimulationWarning,
    SummaryDiff, TaxResult, TrialOutcome, WarningKind, YearResult,
};
pub use rrif::{RrifTable, RrifTableEntry};
pub use strategy::{Strategy, Tier};
pub use tax_config::{
    CorporateTaxConfig, DividendCreditRates, JurisdictionTax, Province, TaxBracket, TaxConfig,
};
