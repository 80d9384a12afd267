/// Suite Analysis Benchmarks
///
/// Measures the full analysis pipeline and its most expensive stages
/// (complexity fitting and optimality ratios) as the number of problem sizes
/// grows.
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use knapstat::analysis::{analyze_tables, fit_table, ComplexityModel};
use knapstat::config::AnalysisConfig;
use knapstat::report::analyze_suite;
use knapstat::suite::{Algorithm, BenchmarkSuite};
use knapstat::table::{Metric, MetricColumn, TrialTable};
use std::collections::BTreeMap;

const TRIALS: usize = 10;

fn column(rows: usize, f: impl Fn(f64, usize) -> f64) -> MetricColumn {
    MetricColumn::from_trials(
        (1..=rows)
            .map(|i| (0..TRIALS).map(|t| f(i as f64 * 100.0, t)).collect())
            .collect(),
    )
}

fn table(rows: usize, exact: bool, quality: f64) -> TrialTable {
    let mut metrics = BTreeMap::new();
    let jitter = |t: usize| 1.0 + 0.01 * t as f64;
    if exact {
        metrics.insert(
            Metric::TableBuildTime,
            column(rows, |n, t| 1e-8 * n * 1000.0 * jitter(t)),
        );
    } else {
        metrics.insert(
            Metric::ExecutionTime,
            column(rows, |n, t| 1e-7 * n * n.ln() * jitter(t)),
        );
    }
    metrics.insert(
        Metric::AchievedValue,
        column(rows, |n, t| (1000.0 + n + t as f64) * quality),
    );
    let sizes = (1..=rows as u64).map(|i| i * 100).collect();
    TrialTable::new(sizes, metrics).unwrap()
}

fn suite(rows: usize) -> BenchmarkSuite {
    let mut suite = BenchmarkSuite::new();
    suite.insert(Algorithm::BottomUp, table(rows, true, 1.0));
    suite.insert(Algorithm::TopDownMemoized, table(rows, true, 1.0));
    suite.insert(Algorithm::GreatestWorthFirst, table(rows, false, 0.98));
    suite.insert(Algorithm::LargestValueFirst, table(rows, false, 0.85));
    suite.insert(Algorithm::SmallestWeightFirst, table(rows, false, 0.7));
    suite
}

fn bench_analyze_suite(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze_suite");
    let config = AnalysisConfig::default();

    for rows in [10, 100, 1000] {
        let suite = suite(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &suite, |b, suite| {
            b.iter(|| analyze_suite(black_box(suite), &config).unwrap());
        });
    }

    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_table");
    let model = ComplexityModel::NLogN;

    for rows in [10, 100, 1000] {
        let t = table(rows, false, 1.0);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &t, |b, t| {
            b.iter(|| fit_table(&model, black_box(t), &Metric::ExecutionTime).unwrap());
        });
    }

    group.finish();
}

fn bench_optimality(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimality_ratios");

    for rows in [10, 100, 1000] {
        let optimal = table(rows, true, 1.0);
        let heuristic = table(rows, false, 0.9);
        group.throughput(Throughput::Elements((rows * TRIALS) as u64));
        group.bench_function(BenchmarkId::from_parameter(rows), |b| {
            b.iter(|| {
                let dist = analyze_tables(black_box(&optimal), black_box(&heuristic)).unwrap();
                dist.summary().unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze_suite, bench_fit, bench_optimality);
criterion_main!(benches);
