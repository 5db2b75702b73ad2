//! Criterion benchmarks for nestegg_core simulation
//!
//! Run with: cargo bench -p nestegg_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nestegg_core::config::{HouseholdBuilder, PersonBuilder};
use nestegg_core::model::{HouseholdInput, MonteCarloConfig, Strategy};
use nestegg_core::simulation::{monte_carlo_simulate, run_simulation};
use nestegg_core::what_if::{WhatIfAdjustments, compare_what_if};

fn create_single(strategy: Strategy) -> HouseholdInput {
    HouseholdBuilder::new()
        .start_year(2025)
        .person1(
            PersonBuilder::new(65)
                .rrif(500_000.0)
                .tfsa(100_000.0, 7_000.0)
                .nonreg_invest(250_000.0, 150_000.0)
                .pension("Employer DB", 20_000.0, 65, true),
        )
        .spending(70_000.0)
        .strategy(strategy)
        .build_unchecked()
}

fn create_couple() -> HouseholdInput {
    HouseholdBuilder::new()
        .start_year(2025)
        .person1(
            PersonBuilder::new(62)
                .rrsp(700_000.0)
                .tfsa(95_000.0, 7_000.0)
                .corp_invest(600_000.0)
                .corp_rdtoh(25_000.0),
        )
        .person2(
            PersonBuilder::new(60)
                .rrsp(300_000.0)
                .tfsa(80_000.0, 7_000.0)
                .nonreg_cash(50_000.0),
        )
        .spending_phases(110_000.0, 90_000.0, 70_000.0)
        .income_split(0.5)
        .strategy(Strategy::CorporateOptimized)
        .build_unchecked()
}

fn bench_single_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_33yr");
    for strategy in Strategy::ALL {
        let input = create_single(strategy);
        group.bench_with_input(
            BenchmarkId::new("strategy", strategy.name()),
            &input,
            |b, input| b.iter(|| run_simulation(black_box(input))),
        );
    }
    group.finish();
}

fn bench_couple_simulation(c: &mut Criterion) {
    let input = create_couple();

    c.bench_function("couple_corporate_35yr", |b| {
        b.iter(|| run_simulation(black_box(&input)))
    });
}

fn bench_what_if(c: &mut Criterion) {
    let input = create_couple();
    let adjustments = WhatIfAdjustments {
        spending_multiplier: 1.1,
        cpp_start_age_shift: 3,
        ..WhatIfAdjustments::default()
    };

    c.bench_function("what_if_compare", |b| {
        b.iter(|| compare_what_if(black_box(&input), black_box(&adjustments)))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(10);
    let input = create_single(Strategy::Balanced);

    for trials in [100, 500, 1000].iter() {
        let mc_config = MonteCarloConfig {
            trials: *trials,
            seed: 42,
            ..MonteCarloConfig::default()
        };

        group.bench_with_input(BenchmarkId::new("trials", trials), trials, |b, _| {
            b.iter(|| monte_carlo_simulate(black_box(&input), black_box(&mc_config)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_simulation,
    bench_couple_simulation,
    bench_what_if,
    bench_monte_carlo
);
criterion_main!(benches);
