//! Full-household scenarios

use super::{retiree, run};
use crate::config::{HouseholdBuilder, PersonBuilder};
use crate::model::{
    BenefitConfig, BucketKind, LifecyclePhase, PersonSlot, Province, SpendingPhase, Strategy,
    TaxConfig,
};
use crate::simulation::{run_simulation, simulate};

#[test]
fn test_retiree_first_year_incomes() {
    let outcome = run(&retiree());
    let first = &outcome.years[0];
    let p = first.person1.as_ref().unwrap();

    assert_eq!(first.year, 2025);
    assert_eq!(p.age, 65);
    assert_eq!(p.pension, 24_000.0);
    assert_eq!(p.cpp, 10_000.0);
    assert_eq!(p.oas, 8_000.0);
    assert_eq!(p.gis, 0.0);
    assert!((p.rrif_minimum - 4_000.0).abs() < 1e-9);

    // Fixed income is 42,000 against 60,000 of spending, so the RRIF covers at
    // least the 18,000 gap plus tax.
    assert!(p.withdrawals.rrif >= 18_000.0);
    assert!(first.funded);
    assert!(first.total_tax > 0.0);
    assert!((first.spending_met - 60_000.0).abs() < 1e-9);
}

#[test]
fn test_retiree_rrif_conserves_balance() {
    let outcome = run(&retiree());
    let rrif = outcome.years[0]
        .bucket(PersonSlot::Person1, BucketKind::Rrif)
        .unwrap();

    assert_eq!(rrif.start, 100_000.0);
    assert!((rrif.growth - 5_000.0).abs() < 1e-9);
    assert!((rrif.end - (rrif.start + rrif.growth - rrif.withdrawal)).abs() < 1e-6);
}

#[test]
fn test_retiree_runs_to_end_age() {
    let outcome = run(&retiree());
    assert_eq!(outcome.years.len(), 31);
    assert_eq!(outcome.summary.years_simulated, 31);
    let last = outcome.years.last().unwrap();
    assert_eq!(last.person1.as_ref().unwrap().age, 95);
    assert_eq!(last.year, 2055);
}

#[test]
fn test_retiree_eventually_runs_short() {
    let outcome = run(&retiree());
    let summary = &outcome.summary;

    assert!(summary.years_funded < summary.years_simulated);
    let first_short = summary.first_shortfall_year.unwrap();
    assert!(first_short > 2025);
    assert!(summary.total_shortfall > 0.0);
    assert!(
        outcome
            .years
            .iter()
            .filter(|y| y.year < first_short)
            .all(|y| y.funded)
    );
}

#[test]
fn test_spending_phases_follow_oldest_age() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(PersonBuilder::new(73).rrif(2_000_000.0))
        .person2(PersonBuilder::new(70))
        .spending_phases(80_000.0, 60_000.0, 40_000.0)
        .inflation(0.0, 0.0)
        .end_age(90)
        .build()
        .unwrap();
    let outcome = run(&input);

    assert_eq!(outcome.years[0].spending_phase, SpendingPhase::GoGo);
    assert_eq!(outcome.years[0].spending_need, 80_000.0);
    assert_eq!(outcome.years[2].spending_phase, SpendingPhase::SlowGo);
    assert_eq!(outcome.years[2].spending_need, 60_000.0);
    assert_eq!(outcome.years[12].spending_phase, SpendingPhase::NoGo);
    assert_eq!(outcome.years[12].spending_need, 40_000.0);
}

#[test]
fn test_spending_is_inflated() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(PersonBuilder::new(65).rrif(1_000_000.0))
        .spending(50_000.0)
        .inflation(0.03, 0.02)
        .build()
        .unwrap();
    let outcome = run(&input);
    assert!((outcome.years[2].spending_need - 50_000.0 * 1.03_f64.powi(2)).abs() < 1e-6);
}

#[test]
fn test_pension_split_lowers_couple_tax() {
    let couple = |split: f64| {
        HouseholdBuilder::new()
            .start_year(2025)
            .person1(PersonBuilder::new(70).rrif(500_000.0))
            .person2(PersonBuilder::new(68))
            .spending(40_000.0)
            .income_split(split)
            .build()
            .unwrap()
    };
    let split = run(&couple(0.5));
    let unsplit = run(&couple(0.0));

    let year = &split.years[0];
    let p1 = year.person1.as_ref().unwrap();
    let p2 = year.person2.as_ref().unwrap();
    assert!(p1.pension_split < 0.0);
    assert!((p1.pension_split + p2.pension_split).abs() < 1e-9);
    assert!(year.personal_tax() < unsplit.years[0].personal_tax());
    assert_eq!(unsplit.years[0].person1.as_ref().unwrap().pension_split, 0.0);
}

#[test]
fn test_survivor_receives_accounts() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(PersonBuilder::new(80).end_age(82).rrif(200_000.0).tfsa(30_000.0, 0.0))
        .person2(PersonBuilder::new(78).tfsa(50_000.0, 0.0))
        .spending(30_000.0)
        .build()
        .unwrap();
    let outcome = run(&input);

    // Person 1 is past their end age in the fourth year
    let rollover = &outcome.years[3];
    assert!(rollover.person1.is_none());
    assert!(rollover.person2.is_some());

    for kind in [BucketKind::Rrif, BucketKind::Tfsa] {
        let out = rollover.bucket(PersonSlot::Person1, kind).unwrap();
        let into = rollover.bucket(PersonSlot::Person2, kind).unwrap();
        assert!(out.transfer_out > 0.0);
        assert_eq!(out.end, 0.0);
        assert!(into.deposit + 1e-6 >= out.transfer_out);
    }

    // The deceased disappears from the ledger the year after
    assert!(
        outcome.years[4]
            .bucket(PersonSlot::Person1, BucketKind::Rrif)
            .is_none()
    );
    // Person 2 is simulated from 78 through 95
    assert_eq!(outcome.years.len(), 18);
}

#[test]
fn test_lifecycle_phases() {
    let input = HouseholdBuilder::new()
        .start_year(2025)
        .person1(PersonBuilder::new(62).rrsp(800_000.0).end_age(75))
        .spending(40_000.0)
        .build()
        .unwrap();
    let outcome = run(&input);

    assert_eq!(outcome.years[0].phase, LifecyclePhase::AccumulatingBenefitAges);
    assert_eq!(outcome.years[3].phase, LifecyclePhase::FullBenefits);
    assert_eq!(outcome.years[9].phase, LifecyclePhase::RrifMandatory);
    assert!(
        outcome
            .years
            .iter()
            .all(|y| y.phase != LifecyclePhase::Terminal)
    );
}

#[test]
fn test_identical_input_gives_identical_output() {
    let input = retiree();
    assert_eq!(run_simulation(&input), run_simulation(&input));
}

#[test]
fn test_response_envelope() {
    let ok = simulate(&retiree());
    assert!(ok.success);
    assert_eq!(ok.year_by_year.len(), 31);
    assert!(ok.error.is_none());

    let mut bad = retiree();
    bad.spending_go_go = f64::NAN;
    let response = simulate(&bad);
    assert!(!response.success);
    assert!(response.summary.is_none());
    let details = response.error_details.unwrap();
    assert_eq!(details.code, "VALIDATION_ERROR");
    assert_eq!(details.validation[0].field, "spending_go_go");
}

#[test]
fn test_injected_configs_are_validated_before_the_run() {
    let mut reversed = retiree();
    reversed.benefit_config = Some(BenefitConfig {
        cpp_earliest_age: 70,
        cpp_latest_age: 60,
        ..BenefitConfig::default()
    });
    let response = simulate(&reversed);
    assert!(!response.success);
    let details = response.error_details.unwrap();
    assert_eq!(details.code, "VALIDATION_ERROR");
    assert_eq!(details.validation[0].field, "benefit_config.cpp_latest_age");

    let mut tax = TaxConfig::for_province(Province::Ontario);
    tax.corporate.refundable_rate = -0.5;
    let negative_refund = HouseholdBuilder::new()
        .start_year(2025)
        .person1(PersonBuilder::new(65).corp_cash(500_000.0))
        .spending(40_000.0)
        .strategy(Strategy::CorporateOptimized)
        .tax_config(tax)
        .build_unchecked();
    let response = simulate(&negative_refund);
    assert!(!response.success);
    let details = response.error_details.unwrap();
    assert_eq!(details.code, "VALIDATION_ERROR");
    assert_eq!(
        details.validation[0].field,
        "tax_config.corporate.refundable_rate"
    );
}

#[test]
fn test_response_serializes_to_json() {
    let response = simulate(&retiree());
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["year_by_year"][0]["person2"].is_null());
    assert!(json["summary"]["health_score"].is_number());
}
