//! Strategy tier order, shortfalls and corporate refunds

use super::{bare_person, run};
use crate::config::HouseholdBuilder;
use crate::model::{BucketKind, HouseholdInput, PersonSlot, Strategy, WarningKind};

/// One of everything, so the first tier drawn is visible
fn diversified(strategy: Strategy) -> HouseholdInput {
    HouseholdBuilder::new()
        .start_year(2025)
        .person1(
            bare_person(65)
                .rrif(200_000.0)
                .corp_cash(100_000.0)
                .nonreg_cash(100_000.0)
                .tfsa(100_000.0, 0.0),
        )
        .spending(30_000.0)
        .strategy(strategy)
        .end_age(70)
        .build()
        .unwrap()
}

#[test]
fn test_minimize_income_draws_registered_first() {
    let outcome = run(&diversified(Strategy::MinimizeIncome));
    let w = outcome.years[0].person1.as_ref().unwrap().withdrawals;

    assert!(w.rrif > 8_000.0);
    assert_eq!(w.corporate, 0.0);
    assert_eq!(w.nonreg, 0.0);
    assert_eq!(w.tfsa, 0.0);
}

#[test]
fn test_tfsa_first_leaves_rrif_at_minimum() {
    let outcome = run(&diversified(Strategy::TfsaFirst));
    let p = outcome.years[0].person1.as_ref().unwrap();

    assert!((p.rrif_minimum - 8_000.0).abs() < 1e-9);
    assert!((p.withdrawals.rrif - p.rrif_minimum).abs() < 1e-9);
    assert!(p.withdrawals.tfsa > 0.0);
    assert_eq!(p.withdrawals.nonreg, 0.0);
    assert_eq!(p.withdrawals.corporate, 0.0);
}

#[test]
fn test_balanced_draws_non_registered_first() {
    let outcome = run(&diversified(Strategy::Balanced));
    let w = outcome.years[0].person1.as_ref().unwrap().withdrawals;

    assert!(w.nonreg > 0.0);
    assert!((w.rrif - 8_000.0).abs() < 1e-9);
    assert_eq!(w.corporate, 0.0);
    assert_eq!(w.tfsa, 0.0);
}

#[test]
fn test_corporate_optimized_draws_corporate_first() {
    let outcome = run(&diversified(Strategy::CorporateOptimized));
    let w = outcome.years[0].person1.as_ref().unwrap().withdrawals;

    assert!(w.corporate > 0.0);
    assert_eq!(w.nonreg, 0.0);
    assert_eq!(w.tfsa, 0.0);
}

#[test]
fn test_every_strategy_funds_the_first_year() {
    for strategy in Strategy::ALL {
        let outcome = run(&diversified(strategy));
        let first = &outcome.years[0];
        assert!(first.funded, "{strategy} left a shortfall");
        assert!((first.spending_met - 30_000.0).abs() < 1e-9);
    }
}

#[test]
fn test_capital_gains_are_realized_pro_rata() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(bare_person(65).nonreg_invest(100_000.0, 50_000.0))
        .spending(20_000.0)
        .strategy(Strategy::CapitalGainsOptimized)
        .end_age(66)
        .build()
        .unwrap();
    let outcome = run(&input);
    let p = outcome.years[0].person1.as_ref().unwrap();

    assert!(p.withdrawals.nonreg >= 20_000.0);
    assert!((p.realized_capital_gains - 0.5 * p.withdrawals.nonreg).abs() < 1e-6);
}

#[test]
fn test_exhausted_accounts_report_shortfall() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(bare_person(65).tfsa(10_000.0, 0.0))
        .spending(30_000.0)
        .end_age(67)
        .build()
        .unwrap();
    let outcome = run(&input);
    let first = &outcome.years[0];

    assert!((first.shortfall - 20_000.0).abs() < 1e-6);
    assert!(!first.funded);
    assert_eq!(first.person1.as_ref().unwrap().withdrawals.tfsa, 10_000.0);
    assert_eq!(outcome.summary.first_shortfall_year, Some(2025));
    assert!(
        outcome
            .summary
            .warnings
            .iter()
            .any(|w| w.year == 2025 && matches!(w.kind, WarningKind::Shortfall { .. }))
    );
    // Keeps going without stop_on_fail
    assert_eq!(outcome.years.len(), 3);
}

#[test]
fn test_stop_on_fail_ends_the_run() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(bare_person(65).tfsa(10_000.0, 0.0))
        .spending(30_000.0)
        .stop_on_fail(true)
        .build()
        .unwrap();
    let outcome = run(&input);

    assert_eq!(outcome.years.len(), 1);
    assert!(
        outcome
            .summary
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::StoppedOnFailure)
    );
}

#[test]
fn test_corporate_withdrawal_releases_rdtoh() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(bare_person(65).corp_cash(100_000.0).corp_rdtoh(10_000.0))
        .spending(30_000.0)
        .strategy(Strategy::CorporateOptimized)
        .end_age(66)
        .build()
        .unwrap();
    let outcome = run(&input);
    let first = &outcome.years[0];
    let cash = first.bucket(PersonSlot::Person1, BucketKind::CorpCash).unwrap();

    assert!(cash.deposit > 0.0);
    assert!(cash.deposit <= 10_000.0 + 1e-9);
    assert!(first.corporate_tax < 0.0);
    assert!((cash.end - cash.expected_end()).abs() < 1e-6);
}

fn distributing(reinvest: bool) -> HouseholdInput {
    HouseholdBuilder::new()
        .start_year(2025)
        .person1(
            bare_person(65)
                .tfsa(200_000.0, 0.0)
                .nonreg_invest(100_000.0, 60_000.0)
                .nonreg_yields(0.0, 0.0, 0.05, 0.04),
        )
        .spending(30_000.0)
        .strategy(Strategy::TfsaFirst)
        .reinvest_distributions(reinvest)
        .end_age(66)
        .build()
        .unwrap()
}

#[test]
fn test_paid_out_distributions_fund_spending() {
    let reinvested = run(&distributing(true));
    let paid_out = run(&distributing(false));
    let (r, p) = (&reinvested.years[0], &paid_out.years[0]);
    let (rp, pp) = (r.person1.as_ref().unwrap(), p.person1.as_ref().unwrap());

    // the 4,000 of dividends is taxable either way
    assert!((rp.nonreg_distributions - 4_000.0).abs() < 1e-9);
    assert!((pp.nonreg_distributions - 4_000.0).abs() < 1e-9);
    assert!(r.funded && p.funded);

    let saved = rp.withdrawals.tfsa - pp.withdrawals.tfsa;
    assert!((saved - 4_000.0).abs() < 2.0, "saved {saved}");

    let r_invest = r.bucket(PersonSlot::Person1, BucketKind::NonRegInvest).unwrap();
    let p_invest = p.bucket(PersonSlot::Person1, BucketKind::NonRegInvest).unwrap();
    assert!((r_invest.growth - 5_000.0).abs() < 1e-9);
    assert!((p_invest.growth - 1_000.0).abs() < 1e-9);
    assert_eq!(p_invest.withdrawal, 0.0);
    assert!((p_invest.end - 101_000.0).abs() < 1e-9);
}
