//! Yearly simulation loop and Monte Carlo driver
//!
//! Each year runs in a fixed order: survivor rollover, RRSP conversion, TFSA
//! room, growth, benefits, withdrawal sizing against the tax engine, GIS
//! reconciliation, withdrawals, RDTOH refunds, reinvestment, then invariant
//! checks on every bucket.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::benefits::{MaritalStatus, age_based_benefits, gis_amount};
use crate::error::{
    ComputationError, SimulationError, ValidationCode, ValidationError, ValidationErrors,
};
use crate::health;
use crate::model::{
    BucketId, BucketKind, HouseholdInput, LifecyclePhase, Market, MonteCarloConfig,
    MonteCarloSummary, PercentileValue, PersonSlot, PersonWithdrawals, PersonYear,
    SimulationOutcome, SimulationResponse, SimulationWarning, TaxConfig, TrialOutcome,
    WarningKind, YearResult,
};
use crate::reinvest::reinvest_surplus;
use crate::simulation_state::SimulationState;
use crate::taxes::{HouseholdTax, IncomeComposition, household_tax, rrsp_deduction_limit};
use crate::withdrawal::{WithdrawalPlan, draw_from_tiers, forced_plan, planned_income};

/// Residual after-tax gap at which withdrawal sizing stops
pub const GAP_CONVERGENCE: f64 = 1.0;
pub const MAX_TAX_ITERATIONS: usize = 50;
/// Tolerance and cap for the GIS / tax reconciliation
pub const GIS_CONVERGENCE: f64 = 1.0;
pub const MAX_BENEFIT_PASSES: usize = 6;

const MAX_BATCH_SIZE: usize = 100;
const PERCENTILES: [f64; 5] = [0.05, 0.25, 0.50, 0.75, 0.95];
const DUST: f64 = 1e-9;

// ============================================================================
// Entry points
// ============================================================================

/// Run a household with every bucket earning its configured yield
pub fn run_simulation(input: &HouseholdInput) -> Result<SimulationOutcome, SimulationError> {
    run_with_market(input, &Market::deterministic())
}

/// Run a household against a given return series
pub fn run_with_market(
    input: &HouseholdInput,
    market: &Market,
) -> Result<SimulationOutcome, SimulationError> {
    input.validate()?;
    run_validated(input, market, input.resolved_start_year())
}

/// Response envelope for callers that want JSON-shaped results instead of `Result`
#[must_use]
pub fn simulate(input: &HouseholdInput) -> SimulationResponse {
    SimulationResponse::from_result(run_simulation(input))
}

fn run_validated(
    input: &HouseholdInput,
    market: &Market,
    start_year: i16,
) -> Result<SimulationOutcome, SimulationError> {
    let span = tracing::info_span!(
        "simulation",
        start_year,
        couple = input.is_couple(),
        strategy = %input.strategy
    );
    let _enter = span.enter();

    let mut state = SimulationState::new(input, market, start_year)?;
    let mut years = Vec::with_capacity(input.horizon_years() as usize);
    let mut warnings = Vec::new();

    loop {
        state.accounts.begin_year();
        if !state.settle_deaths() {
            break;
        }
        state.update_phase();

        let result = simulate_year(&mut state, &mut warnings)?;
        let stop = !result.funded && input.stop_on_fail;
        let year = result.year;
        years.push(result);
        if stop {
            tracing::info!(year, "stopping at first shortfall year");
            warnings.push(SimulationWarning {
                year,
                kind: WarningKind::StoppedOnFailure,
            });
            break;
        }
        state.advance();
    }
    state.phase = LifecyclePhase::Terminal;

    let summary = health::evaluate(input, &years, warnings);
    tracing::info!(
        years = summary.years_simulated,
        funded = summary.years_funded,
        score = summary.health_score,
        "simulation complete"
    );
    Ok(SimulationOutcome { summary, years })
}

// ============================================================================
// One year
// ============================================================================

/// Per-person income known before any withdrawal is sized
#[derive(Debug, Clone, Copy, Default)]
struct BaseIncome {
    age: u32,
    cpp: f64,
    oas: f64,
    pension: f64,
    other: f64,
    employment: f64,
    /// Taxable non-registered interest, whether paid out or reinvested
    interest: f64,
    /// Eligible dividends distributed by non-registered investments
    dividends: f64,
    /// Distributions paid out as cash instead of reinvested
    paid_out: f64,
    rrsp_contribution: f64,
    rrsp_room: f64,
    rrif_minimum: f64,
}

impl BaseIncome {
    fn composition(&self) -> IncomeComposition {
        IncomeComposition {
            employment: self.employment,
            other: self.other + self.interest,
            pension: self.pension,
            cpp: self.cpp,
            oas: self.oas,
            eligible_dividends: self.dividends,
            rrsp_contribution: self.rrsp_contribution,
            rrsp_unused_room: self.rrsp_room,
            ..IncomeComposition::default()
        }
    }

    /// Cash received before withdrawals and GIS
    fn cash(&self) -> f64 {
        self.cpp + self.oas + self.pension + self.other + self.employment + self.paid_out
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct GrowthIncome {
    interest: [f64; 2],
    dividends: [f64; 2],
    paid_out: [f64; 2],
    corporate_tax: f64,
}

/// Withdrawals and taxes sized for the year, not yet applied
struct SizedYear {
    plan: WithdrawalPlan,
    gis: [f64; 2],
}

fn simulate_year(
    state: &mut SimulationState<'_>,
    warnings: &mut Vec<SimulationWarning>,
) -> Result<YearResult, SimulationError> {
    let year = state.year();
    let tax_config = state.tax_config();

    // Conversion happens before the minimum is computed, so the RRIF minimum of
    // the conversion year applies to the converted balance.
    let mut minimums = [0.0; 2];
    for (slot, _, age) in state.living() {
        let conversion_age = state
            .accounts
            .person(slot)
            .map_or(u32::MAX, |p| p.conversion_age);
        if age >= conversion_age {
            let converted = state.accounts.convert_rrsp_to_rrif(slot);
            if converted > 0.0 {
                tracing::debug!(year, person = ?slot, converted, "converted RRSP to RRIF");
            }
        }
        let rrif = state.accounts.balance(BucketId::new(slot, BucketKind::Rrif));
        if rrif > 0.0 {
            minimums[slot.index()] = state.rrif_table.minimum_withdrawal(age, rrif);
        }
    }

    state.accounts.roll_tfsa_room(state.year_index == 0);
    let growth = apply_growth(state);
    let bases = base_incomes(state, &growth, minimums);

    let oldest = state.oldest_age().unwrap_or(0);
    let (spending_phase, base_spending) = state.input.spending_for_age(oldest);
    let spending_need = base_spending * state.spending_index();

    let sized = size_year(state, &bases, spending_need, minimums, &tax_config);

    // Final taxes on the sized plan, with marginal rates for the trace
    let taxes = household_tax(
        compositions(state, &bases, &sized.plan),
        state.input.income_split_rrif_fraction,
        &tax_config,
        true,
    );

    let mut withdrawals = [PersonWithdrawals::default(); 2];
    let mut realized = [0.0; 2];
    let mut refunds = 0.0;
    for (id, amount) in sized.plan.entries() {
        let i = id.person.index();
        let taken = state.accounts.withdraw(id, amount);
        withdrawals[i].add(id.kind, taken.amount);
        if id.kind.is_non_registered() {
            realized[i] += taken.realized_gain;
        }
        if id.kind.is_corporate() {
            let refund = state.accounts.release_rdtoh(
                id.person,
                taken.amount * tax_config.corporate.dividend_refund_rate,
            );
            state
                .accounts
                .deposit(BucketId::new(id.person, BucketKind::CorpCash), refund, refund);
            refunds += refund;
        }
    }

    let fixed_cash: f64 = bases.iter().flatten().map(BaseIncome::cash).sum();
    let contributions: f64 = bases.iter().flatten().map(|b| b.rrsp_contribution).sum();
    let personal_tax = taxes.total();
    let cash_in = fixed_cash + sized.gis.iter().sum::<f64>() + sized.plan.total();
    let gap = spending_need + personal_tax + contributions - cash_in;
    // A residual gap within tolerance is convergence noise, not a shortfall
    let shortfall = if gap > state.input.gap_tolerance { gap } else { 0.0 };
    let surplus = (-gap).max(0.0);
    let funded = shortfall == 0.0;

    for (slot, base) in PersonSlot::ALL.into_iter().zip(bases) {
        if let Some(base) = base {
            state.accounts.deposit(
                BucketId::new(slot, BucketKind::Rrsp),
                base.rrsp_contribution,
                base.rrsp_contribution,
            );
        }
    }
    let reinvested = reinvest_surplus(
        &mut state.accounts,
        surplus,
        &state.input.nonreg_reinvest_weights,
    );

    let mut persons: [Option<PersonYear>; 2] = [None, None];
    let mut total_income = 0.0;
    for slot in PersonSlot::ALL {
        let i = slot.index();
        let (Some(base), Some(tax)) = (bases[i], taxes.persons[i]) else {
            continue;
        };
        if tax.excess_rrsp_contribution > 0.0 {
            tracing::warn!(
                year,
                person = ?slot,
                excess = tax.excess_rrsp_contribution,
                "RRSP contribution exceeds deduction limit"
            );
            warnings.push(SimulationWarning {
                year,
                kind: WarningKind::ExcessRrspContribution {
                    person: slot,
                    amount: tax.excess_rrsp_contribution,
                },
            });
        }
        let limit = rrsp_deduction_limit(base.employment, base.rrsp_room, &tax_config);
        state.rrsp_room[i] = (limit - tax.rrsp_deduction).max(0.0);

        let record = PersonYear {
            age: base.age,
            cpp: base.cpp,
            oas: base.oas,
            gis: sized.gis[i],
            oas_clawback: tax.oas_clawback,
            pension: base.pension,
            other_income: base.other + base.employment,
            nonreg_distributions: base.interest + base.dividends,
            rrif_minimum: base.rrif_minimum,
            rrsp_contribution: base.rrsp_contribution,
            withdrawals: withdrawals[i],
            realized_capital_gains: realized[i],
            pension_split: taxes.split[i],
            tax,
        };
        total_income += record.cpp
            + record.oas
            + record.gis
            + record.pension
            + record.other_income
            + record.nonreg_distributions
            + record.withdrawals.total();
        persons[i] = Some(record);
    }
    state.prior_income = Some(PersonSlot::ALL.map(|slot| {
        let i = slot.index();
        match (bases[i], taxes.persons[i]) {
            (Some(base), Some(tax)) => (tax.net_income - base.oas).max(0.0),
            _ => 0.0,
        }
    }));

    let corporate_tax = growth.corporate_tax - refunds;
    let ages = PersonSlot::ALL.map(|slot| state.age(slot));
    let [person1, person2] = persons;
    let result = YearResult {
        year,
        year_index: state.year_index,
        phase: state.phase,
        spending_phase,
        person1,
        person2,
        buckets: state.accounts.finish_year(),
        total_income,
        total_tax: personal_tax + corporate_tax,
        corporate_tax,
        spending_need,
        spending_met: spending_need - shortfall.min(spending_need),
        shortfall,
        surplus_reinvested: reinvested.total(),
        net_worth: state.accounts.net_worth(),
        after_tax_estate: health::after_tax_estate(&state.accounts, ages, &tax_config),
        funded,
    };

    if let Err(source) = verify_year(&result) {
        tracing::error!(
            year,
            person = ?source.person(),
            bucket = ?source.bucket(),
            error = %source,
            "invariant violated"
        );
        return Err(SimulationError::Computation {
            source,
            snapshot: Some(Box::new(result)),
        });
    }

    if funded {
        tracing::debug!(
            year,
            phase = ?result.phase,
            need = spending_need,
            tax = result.total_tax,
            surplus = result.surplus_reinvested,
            net_worth = result.net_worth,
            "year funded"
        );
    } else {
        tracing::warn!(year, shortfall, need = spending_need, "spending shortfall");
        warnings.push(SimulationWarning {
            year,
            kind: WarningKind::Shortfall { amount: shortfall },
        });
    }
    Ok(result)
}

fn verify_year(result: &YearResult) -> Result<(), ComputationError> {
    for flow in &result.buckets {
        flow.verify(result.year)?;
    }
    for (quantity, value) in [
        ("total_tax", result.total_tax),
        ("total_income", result.total_income),
        ("spending_need", result.spending_need),
        ("surplus_reinvested", result.surplus_reinvested),
        ("after_tax_estate", result.after_tax_estate),
    ] {
        if !value.is_finite() {
            return Err(ComputationError::NonFinite {
                year: result.year,
                person: None,
                bucket: None,
                quantity,
                value,
            });
        }
    }
    Ok(())
}

/// Credit one year of returns to every living person's buckets
///
/// Non-registered interest and distributions are taxable this year. Corporate
/// passive income is taxed inside the corporation and feeds RDTOH.
fn apply_growth(state: &mut SimulationState<'_>) -> GrowthIncome {
    let year_index = state.year_index as usize;
    let reinvest = state.input.reinvest_nonreg_dist;
    let corp = state.tax_base.corporate;
    let slots: Vec<PersonSlot> = state.accounts.living().map(|(slot, _)| slot).collect();
    let mut out = GrowthIncome::default();

    for slot in slots {
        let i = slot.index();
        for kind in BucketKind::ALL {
            let id = BucketId::new(slot, kind);
            let Some(bucket) = state.accounts.bucket(id).copied() else {
                continue;
            };
            if bucket.balance <= 0.0 {
                continue;
            }
            let rate = state.market.rate(kind, bucket.yield_rate, year_index);
            let total = bucket.balance * rate;
            let distribution = (bucket.balance * bucket.distribution_rate)
                .clamp(0.0, (bucket.balance + total).max(0.0));

            match kind {
                BucketKind::Tfsa | BucketKind::Rrsp | BucketKind::Rrif => {
                    state.accounts.grow(id, total, 0.0);
                }
                BucketKind::NonRegCash | BucketKind::NonRegGic => {
                    if total <= 0.0 {
                        state.accounts.grow(id, total, 0.0);
                    } else {
                        out.interest[i] += total;
                        if reinvest {
                            state.accounts.grow(id, total, total);
                        } else {
                            out.paid_out[i] += total;
                        }
                    }
                }
                BucketKind::NonRegInvest => {
                    out.dividends[i] += distribution;
                    if reinvest {
                        state.accounts.grow(id, total, distribution);
                    } else {
                        state.accounts.grow(id, total - distribution, 0.0);
                        out.paid_out[i] += distribution;
                    }
                }
                BucketKind::CorpCash | BucketKind::CorpGic => {
                    if total <= 0.0 {
                        state.accounts.grow(id, total, 0.0);
                    } else {
                        let tax = total * corp.passive_income_rate;
                        state.accounts.add_rdtoh(slot, total * corp.refundable_rate);
                        state.accounts.grow(id, total - tax, 0.0);
                        out.corporate_tax += tax;
                    }
                }
                BucketKind::CorpInvest => {
                    let part_iv = distribution * corp.part_iv_rate;
                    state.accounts.add_rdtoh(slot, part_iv);
                    state.accounts.grow(id, total - part_iv, 0.0);
                    out.corporate_tax += part_iv;
                }
            }
        }
    }
    out
}

fn base_incomes(
    state: &SimulationState<'_>,
    growth: &GrowthIncome,
    minimums: [f64; 2],
) -> [Option<BaseIncome>; 2] {
    let index = state.general_index();
    let mut bases = [None, None];
    for (slot, person, age) in state.living() {
        let i = slot.index();
        let retirement_age = person.retirement_age();
        let benefits = age_based_benefits(person, age, index, &state.benefits);
        let pension = person
            .pension_incomes
            .iter()
            .map(|s| s.amount_at(age, retirement_age, index))
            .sum();
        let (mut other, mut employment) = (0.0, 0.0);
        for stream in &person.other_incomes {
            let amount = stream.amount_at(age, retirement_age, index);
            if stream.earned {
                employment += amount;
            } else {
                other += amount;
            }
        }
        let conversion_age = state
            .accounts
            .person(slot)
            .map_or(person.age_rrsp_convert, |a| a.conversion_age);
        let rrsp_contribution = if age < retirement_age && age < conversion_age {
            person.rrsp_annual_contribution
        } else {
            0.0
        };
        bases[i] = Some(BaseIncome {
            age,
            cpp: benefits.cpp,
            oas: benefits.oas,
            pension,
            other,
            employment,
            interest: growth.interest[i],
            dividends: growth.dividends[i],
            paid_out: growth.paid_out[i],
            rrsp_contribution,
            rrsp_room: state.rrsp_room[i],
            rrif_minimum: minimums[i],
        });
    }
    bases
}

fn compositions(
    state: &SimulationState<'_>,
    bases: &[Option<BaseIncome>; 2],
    plan: &WithdrawalPlan,
) -> [Option<(u32, IncomeComposition)>; 2] {
    PersonSlot::ALL.map(|slot| {
        bases[slot.index()].map(|base| {
            let mut income = base.composition();
            planned_income(&state.accounts, plan, slot).apply_to(&mut income);
            (base.age, income)
        })
    })
}

fn gis_for(
    state: &SimulationState<'_>,
    bases: &[Option<BaseIncome>; 2],
    income_excluding_oas: [f64; 2],
) -> [f64; 2] {
    let present = bases.iter().flatten().count();
    let status = if present == 2 {
        MaritalStatus::Couple
    } else {
        MaritalStatus::Single
    };
    let combined: f64 = PersonSlot::ALL
        .iter()
        .filter(|slot| bases[slot.index()].is_some())
        .map(|slot| income_excluding_oas[slot.index()])
        .sum();
    let index = state.general_index();
    PersonSlot::ALL.map(|slot| {
        let i = slot.index();
        let Some(base) = bases[i] else {
            return 0.0;
        };
        let basis = match status {
            MaritalStatus::Single => income_excluding_oas[i],
            MaritalStatus::Couple => combined,
        };
        gis_amount(basis, status, base.oas > 0.0, index, &state.benefits)
    })
}

/// Size withdrawals so after-tax cash covers the need, reconciling GIS with
/// the income the withdrawals create
fn size_year(
    state: &SimulationState<'_>,
    bases: &[Option<BaseIncome>; 2],
    spending_need: f64,
    minimums: [f64; 2],
    tax_config: &TaxConfig,
) -> SizedYear {
    // First pass estimates GIS from last year's income, or this year's
    // pre-withdrawal income in the first year.
    let estimate = state.prior_income.unwrap_or_else(|| {
        (*bases).map(|b| {
            b.map_or(0.0, |b| {
                (b.composition().total_income(tax_config) - b.oas).max(0.0)
            })
        })
    });
    let mut gis = gis_for(state, bases, estimate);
    let mut pass = 1;
    loop {
        let (plan, taxes) =
            size_withdrawals(state, bases, &gis, spending_need, minimums, tax_config);
        if bases.iter().flatten().all(|b| b.oas <= 0.0) {
            return SizedYear { plan, gis };
        }
        let incomes = PersonSlot::ALL.map(|slot| {
            let i = slot.index();
            match (bases[i], taxes.persons[i]) {
                (Some(base), Some(tax)) => (tax.net_income - base.oas).max(0.0),
                _ => 0.0,
            }
        });
        let next = gis_for(state, bases, incomes);
        let converged = next
            .iter()
            .zip(gis.iter())
            .all(|(a, b)| (a - b).abs() <= GIS_CONVERGENCE);
        if converged || pass >= MAX_BENEFIT_PASSES {
            if !converged {
                tracing::debug!(year = state.year(), ?gis, ?next, "GIS reconciliation hit its cap");
            }
            return SizedYear { plan, gis };
        }
        gis = next;
        pass += 1;
    }
}

/// Grow the plan until the after-tax gap is within `GAP_CONVERGENCE` or
/// nothing more can be drawn
fn size_withdrawals(
    state: &SimulationState<'_>,
    bases: &[Option<BaseIncome>; 2],
    gis: &[f64; 2],
    spending_need: f64,
    minimums: [f64; 2],
    tax_config: &TaxConfig,
) -> (WithdrawalPlan, HouseholdTax) {
    let mut plan = forced_plan(&state.accounts, minimums);
    let fixed_cash: f64 =
        bases.iter().flatten().map(BaseIncome::cash).sum::<f64>() + gis.iter().sum::<f64>();
    let contributions: f64 = bases.iter().flatten().map(|b| b.rrsp_contribution).sum();

    let mut iterations = 0;
    loop {
        let taxes = household_tax(
            compositions(state, bases, &plan),
            state.input.income_split_rrif_fraction,
            tax_config,
            false,
        );
        let gap = spending_need + taxes.total() + contributions - fixed_cash - plan.total();
        iterations += 1;
        if gap <= GAP_CONVERGENCE || iterations >= MAX_TAX_ITERATIONS {
            return (plan, taxes);
        }
        let drawn = draw_from_tiers(&state.accounts, &mut plan, state.input.strategy, gap);
        if drawn <= DUST {
            return (plan, taxes);
        }
    }
}

// ============================================================================
// Monte Carlo
// ============================================================================

/// Run `config.trials` randomized trials and aggregate them
pub fn monte_carlo_simulate(
    input: &HouseholdInput,
    config: &MonteCarloConfig,
) -> Result<MonteCarloSummary, SimulationError> {
    monte_carlo_simulate_with_cancel(input, config, &AtomicBool::new(false))
}

/// Same as `monte_carlo_simulate`, abandoning the batch once `cancel` is set
///
/// Trials are grouped in batches seeded from `config.seed`, so results depend
/// only on the seed and trial count, not on thread scheduling.
pub fn monte_carlo_simulate_with_cancel(
    input: &HouseholdInput,
    config: &MonteCarloConfig,
    cancel: &AtomicBool,
) -> Result<MonteCarloSummary, SimulationError> {
    input.validate()?;
    if config.trials == 0 {
        return Err(ValidationErrors::from(ValidationError::new(
            "trials",
            "must be at least 1",
            ValidationCode::OutOfRange,
        ))
        .into());
    }

    let span = tracing::info_span!("monte_carlo", trials = config.trials, seed = config.seed);
    let _enter = span.enter();

    let start_year = input.resolved_start_year();
    let horizon = input.horizon_years() as usize;
    let num_trials = config.trials;
    let num_batches = num_trials.div_ceil(MAX_BATCH_SIZE);

    let run_batch = |i: usize| -> Result<Vec<TrialOutcome>, SimulationError> {
        let mut rng = SmallRng::seed_from_u64(config.seed.wrapping_add(i as u64));
        let batch_size = if i == num_batches - 1 {
            num_trials - i * MAX_BATCH_SIZE
        } else {
            MAX_BATCH_SIZE
        };
        (0..batch_size)
            .map(|_| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(SimulationError::Cancelled);
                }
                run_trial(input, config, start_year, horizon, rng.next_u64())
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let batches: Vec<_> = (0..num_batches).into_par_iter().map(run_batch).collect();
    #[cfg(not(feature = "parallel"))]
    let batches: Vec<_> = (0..num_batches).map(run_batch).collect();

    let mut outcomes = Vec::with_capacity(num_trials);
    for batch in batches {
        outcomes.extend(batch?);
    }
    let summary = aggregate(outcomes);
    tracing::info!(
        probability_fully_funded = summary.probability_fully_funded,
        median_estate = summary.median_estate_after_tax,
        "monte carlo complete"
    );
    Ok(summary)
}

fn run_trial(
    input: &HouseholdInput,
    config: &MonteCarloConfig,
    start_year: i16,
    horizon: usize,
    seed: u64,
) -> Result<TrialOutcome, SimulationError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let market = Market::from_profiles(&mut rng, horizon, &config.profiles)?;
    let outcome = run_validated(input, &market, start_year)?;
    let summary = outcome.summary;
    Ok(TrialOutcome {
        seed,
        success_rate: summary.success_rate,
        fully_funded: summary.years_funded == summary.years_simulated,
        final_estate_after_tax: summary.final_estate_after_tax,
        health_score: summary.health_score,
    })
}

fn aggregate(outcomes: Vec<TrialOutcome>) -> MonteCarloSummary {
    let n = outcomes.len().max(1) as f64;
    let mut success: Vec<f64> = outcomes.iter().map(|o| o.success_rate).collect();
    let mut estates: Vec<f64> = outcomes.iter().map(|o| o.final_estate_after_tax).collect();
    success.sort_by(f64::total_cmp);
    estates.sort_by(f64::total_cmp);

    let percentiles = |sorted: &[f64]| {
        PERCENTILES
            .iter()
            .map(|&p| PercentileValue {
                percentile: p,
                value: percentile(sorted, p),
            })
            .collect::<Vec<_>>()
    };

    MonteCarloSummary {
        trials: outcomes.len(),
        probability_fully_funded: outcomes.iter().filter(|o| o.fully_funded).count() as f64 / n,
        mean_success_rate: success.iter().sum::<f64>() / n,
        success_rate_percentiles: percentiles(&success),
        estate_percentiles: percentiles(&estates),
        median_estate_after_tax: percentile(&estates, 0.5),
        mean_health_score: outcomes.iter().map(|o| o.health_score).sum::<f64>() / n,
        outcomes,
    }
}

/// Nearest-rank percentile of an ascending slice
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = ((sorted.len() - 1) as f64 * p.clamp(0.0, 1.0)).round() as usize;
    sorted[rank.min(sorted.len() - 1)]
}
