// Scenario tests for the analysis engine
//
// Realistic knapsack benchmark shapes: DP table-build time growing with n·W,
// greedy heuristics growing with n log n, heuristic values at or below the
// DP optimum.

use super::*;
use crate::error::AnalysisError;
use crate::table::{Metric, MetricColumn, TrialTable};
use std::collections::BTreeMap;

const SIZES: [u64; 3] = [10, 20, 30];

fn time_table(metric: Metric, averages: [f64; 3]) -> TrialTable {
    let rows = averages
        .iter()
        .map(|&a| vec![a * 0.95, a, a * 1.05])
        .collect();
    let mut metrics = BTreeMap::new();
    metrics.insert(metric, MetricColumn::from_trials(rows));
    TrialTable::new(SIZES.to_vec(), metrics).unwrap()
}

fn five_algorithms() -> Vec<(&'static str, TrialTable)> {
    vec![
        (
            "bottom_up",
            time_table(Metric::TableBuildTime, [0.010, 0.020, 0.031]),
        ),
        (
            "top_down_memoized",
            time_table(Metric::TableBuildTime, [0.015, 0.032, 0.047]),
        ),
        (
            "greatest_worth_first",
            time_table(Metric::ExecutionTime, [0.0001, 0.0003, 0.0005]),
        ),
        (
            "largest_value_first",
            time_table(Metric::ExecutionTime, [0.0001, 0.0002, 0.0004]),
        ),
        (
            "smallest_weight_first",
            time_table(Metric::ExecutionTime, [0.0002, 0.0003, 0.0006]),
        ),
    ]
}

/// Five algorithms at sizes [10, 20, 30] with increasing average times
#[test]
fn test_five_algorithm_descriptive_stats_are_finite() {
    for (name, table) in five_algorithms() {
        let stats = describe_all(&table).unwrap();
        for summary in stats.summaries() {
            assert!(summary.mean.is_finite() && summary.mean >= 0.0, "{}", name);
            assert!(summary.std.is_finite() && summary.std >= 0.0, "{}", name);
        }
        assert_eq!(stats.summaries().count(), 1, "{}", name);
    }
}

/// DP variants fit c·n·W, greedy heuristics fit c·n·log n
#[test]
fn test_per_family_complexity_fits() {
    let capacity = 1000.0;
    for (name, table) in five_algorithms() {
        let (model, metric) = if table.has_metric(&Metric::TableBuildTime) {
            (
                ComplexityModel::LinearCapacity { capacity },
                Metric::TableBuildTime,
            )
        } else {
            (ComplexityModel::NLogN, Metric::ExecutionTime)
        };

        let result = fit_table(&model, &table, &metric).unwrap();
        assert!(result.coefficient > 0.0, "{}", name);
        assert_eq!(result.predicted.len(), SIZES.len());
        assert!(result.r_squared.unwrap() > 0.8, "{}: {}", name, result.annotation());
    }
}

/// Time ANOVA across the three heuristics aligned by problem size
#[test]
fn test_greedy_time_anova() {
    let algorithms = five_algorithms();
    let greedy: Vec<(&str, &TrialTable)> = algorithms[2..]
        .iter()
        .map(|(name, table)| (*name, table))
        .collect();

    let groups = aligned_groups(&greedy, &Metric::ExecutionTime).unwrap();
    assert_eq!(groups.len(), 3);

    let result = one_way_anova(&groups).unwrap();
    assert!(result.f_statistic >= 0.0);
    assert!((0.0..=1.0).contains(&result.p_value));
    assert!((0.0..=1.0).contains(&result.effect_size));
}

/// Optimality ANOVA is distinct from the time ANOVA
#[test]
fn test_optimality_comparison_across_heuristics() {
    let optimal = MetricColumn::from_trials(vec![vec![500.0, 510.0, 505.0]; 3]);
    let worth = MetricColumn::from_trials(vec![vec![498.0, 507.0, 503.0]; 3]);
    let weight = MetricColumn::from_trials(vec![vec![350.0, 365.0, 340.0]; 3]);

    let worth_dist = analyze_columns(&SIZES, &optimal, &SIZES, &worth).unwrap();
    let weight_dist = analyze_columns(&SIZES, &optimal, &SIZES, &weight).unwrap();

    let worth_summary = worth_dist.summary().unwrap();
    let weight_summary = weight_dist.summary().unwrap();
    assert!(worth_summary.mean < weight_summary.mean);
    assert!(worth_summary.interval_lower >= 1.0);

    let coverage = worth_dist.coverage(&[0.95, 0.90]).unwrap();
    assert_eq!(coverage[0].fraction, 1.0);

    let anova = compare_optimality(&[
        ("greatest worth", &worth_dist),
        ("smallest weight", &weight_dist),
    ])
    .unwrap();
    assert!(anova.p_value < 0.05);
}

/// Equal value columns give a degenerate (zero-variance) optimality ANOVA
#[test]
fn test_perfect_heuristics_are_degenerate_for_anova() {
    let optimal = MetricColumn::from_trials(vec![vec![100.0, 100.0]; 3]);
    let a = analyze_columns(&SIZES, &optimal, &SIZES, &optimal).unwrap();
    let b = a.clone();

    assert!(matches!(
        compare_optimality(&[("a", &a), ("b", &b)]),
        Err(AnalysisError::DegenerateMetric(_))
    ));
}

/// Results are plain values that can cross thread boundaries
#[test]
fn test_results_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TrialTable>();
    assert_send_sync::<FitResult>();
    assert_send_sync::<GroupTestResult>();
    assert_send_sync::<RatioDistribution>();
    assert_send_sync::<DescriptiveStats>();
}

/// Independent fits may run on separate threads without coordination
#[test]
fn test_parallel_fits_match_sequential() {
    let algorithms = five_algorithms();
    let sequential: Vec<f64> = algorithms
        .iter()
        .map(|(_, t)| {
            let metric = t.metrics().next().unwrap().clone();
            fit_table(&ComplexityModel::NLogN, t, &metric)
                .unwrap()
                .coefficient
        })
        .collect();

    let parallel: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = algorithms
            .iter()
            .map(|(_, t)| {
                scope.spawn(move || {
                    let metric = t.metrics().next().unwrap().clone();
                    fit_table(&ComplexityModel::NLogN, t, &metric)
                        .unwrap()
                        .coefficient
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(sequential, parallel);
}
