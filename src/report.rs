// Suite analysis pipeline and text report
//
// Runs every analysis the loaded tables support:
// - descriptive statistics and a complexity fit per algorithm
// - time ANOVA across the heuristics, the exact solvers and all algorithms
// - approximation ratios of each heuristic against the exact optimum
// - cache efficiency of the memoized solver
//
// A failing analysis is recorded as a Failure and the others still run.

use crate::analysis::{
    aligned_groups, analyze_tables, describe_all, fit_table, one_way_anova, pairwise_welch,
    ratio_groups, trial_bands, DescriptiveStats, FitResult, GroupTestResult,
    PairwiseComparison, RatioDistribution, RatioSummary, SampleGroup, SizeRatio,
    ThresholdCoverage, TrialBand,
};
use crate::cache::{cache_efficiency, CacheEfficiency};
use crate::config::AnalysisConfig;
use crate::error::{self, AnalysisError};
use crate::suite::{Algorithm, BenchmarkSuite};
use crate::table::{shared_sizes, Metric, TrialTable};
use anyhow::Result;

/// An analysis that could not be completed
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// Which analysis failed (e.g. `"bottom_up: fit"`)
    pub scope: String,
    pub error: AnalysisError,
}

/// Per-algorithm results
#[derive(Debug, Clone, PartialEq)]
pub struct AlgorithmReport {
    pub algorithm: Algorithm,
    /// Number of problem sizes in the table
    pub rows: usize,
    pub descriptive: Option<DescriptiveStats>,
    pub fit: Option<FitResult>,
    /// Trial spread of the primary time metric; empty with a single trial
    pub bands: Vec<TrialBand>,
}

/// ANOVA across named groups, with optional post-hoc pairs
#[derive(Debug, Clone, PartialEq)]
pub struct GroupComparison {
    pub label: String,
    pub anova: GroupTestResult,
    pub pairwise: Vec<PairwiseComparison>,
}

/// Approximation quality of one heuristic
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalityReport {
    pub heuristic: Algorithm,
    /// Exact solver whose values were taken as the optimum
    pub reference: Algorithm,
    pub distribution: RatioDistribution,
    pub summary: Option<RatioSummary>,
    pub coverage: Vec<ThresholdCoverage>,
    pub by_size: Vec<SizeRatio>,
}

/// Everything computed for one benchmark suite
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteReport {
    pub algorithms: Vec<AlgorithmReport>,
    pub comparisons: Vec<GroupComparison>,
    pub optimality: Vec<OptimalityReport>,
    pub cache: Option<CacheEfficiency>,
    pub failures: Vec<Failure>,
    pub config: AnalysisConfig,
}

impl SuiteReport {
    /// Every successful complexity fit, in algorithm order
    pub fn fits(&self) -> impl Iterator<Item = (Algorithm, &FitResult)> {
        self.algorithms
            .iter()
            .filter_map(|a| a.fit.as_ref().map(|f| (a.algorithm, f)))
    }

    pub fn comparison(&self, label: &str) -> Option<&GroupComparison> {
        self.comparisons.iter().find(|c| c.label == label)
    }

    /// Number of data integrity warnings across all heuristics
    pub fn warning_count(&self) -> usize {
        self.optimality
            .iter()
            .map(|o| o.distribution.warnings.len())
            .sum()
    }

    /// Generate human-readable report
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        let alpha = self.config.significance_level;

        report.push_str(&format!(
            "📊 KNAPSACK BENCHMARK ANALYSIS ({} algorithms)\n\n",
            self.algorithms.len()
        ));
        report.push_str(&format!(
            "Significance level: {} ({}% confidence)\n",
            alpha,
            (1.0 - alpha) * 100.0
        ));
        report.push_str(&format!("Knapsack capacity (W): {}\n", self.config.capacity));

        // Descriptive statistics
        report.push_str("\n📈 Descriptive Statistics:\n");
        for entry in &self.algorithms {
            report.push_str(&format!("  {} ({} sizes)\n", entry.algorithm, entry.rows));
            let Some(stats) = &entry.descriptive else {
                report.push_str("    (unavailable)\n");
                continue;
            };
            for summary in stats.summaries() {
                let unit = if summary.metric.is_time() { " s" } else { "" };
                report.push_str(&format!(
                    "    {:<16} mean={:.6}{} std={:.6}{} cv={:.4}\n",
                    summary.metric.name(),
                    summary.mean,
                    unit,
                    summary.std,
                    unit,
                    summary.cv
                ));
            }
            for (metric, err) in stats.undefined() {
                report.push_str(&format!("    {:<16} undefined: {}\n", metric.name(), err));
            }
        }

        // Complexity fits
        let fits: Vec<_> = self.fits().collect();
        if !fits.is_empty() {
            report.push_str("\n📐 Complexity Fits:\n");
            for (algorithm, fit) in fits {
                report.push_str(&format!(
                    "  {} [{}] {}\n",
                    algorithm,
                    fit.model.big_o(),
                    fit.annotation()
                ));
            }
        }

        // Group comparisons
        if !self.comparisons.is_empty() {
            report.push_str("\n🔬 Group Comparisons (one-way ANOVA):\n");
            for comparison in &self.comparisons {
                let anova = &comparison.anova;
                let marker = if anova.is_significant(alpha) {
                    "❌ means differ"
                } else {
                    "✅ no significant difference"
                };
                report.push_str(&format!(
                    "  {}: F({}, {})={:.4} p={:.4} η²={:.4} ({}) {}\n",
                    comparison.label,
                    anova.df_between,
                    anova.df_within,
                    anova.f_statistic,
                    anova.p_value,
                    anova.effect_size,
                    anova.effect_label(),
                    marker
                ));
                for pair in &comparison.pairwise {
                    report.push_str(&format!(
                        "    {} vs {}: t={:.4} p={:.4}{}\n",
                        pair.first,
                        pair.second,
                        pair.t_statistic,
                        pair.p_value,
                        if pair.significant { " *" } else { "" }
                    ));
                }
            }
        }

        // Optimality
        if !self.optimality.is_empty() {
            report.push_str("\n🎯 Optimality (optimal / heuristic):\n");
            for entry in &self.optimality {
                report.push_str(&format!(
                    "  {} vs {} ({} trials, {} excluded)\n",
                    entry.heuristic,
                    entry.reference,
                    entry.distribution.samples.len(),
                    entry.distribution.excluded_count()
                ));
                if let Some(s) = &entry.summary {
                    report.push_str(&format!(
                        "    mean={:.4} median={:.4} std={:.4} 95% interval=[{:.4}, {:.4}] range={:.4}\n",
                        s.mean, s.median, s.std, s.interval_lower, s.interval_upper, s.range
                    ));
                }
                for c in &entry.coverage {
                    report.push_str(&format!(
                        "    >= {:.0}% of optimum: {:.1}% ({}/{})\n",
                        c.threshold * 100.0,
                        c.percent(),
                        c.covered,
                        c.total
                    ));
                }
            }
        }

        // Data integrity
        let warning_count = self.warning_count();
        if warning_count > 0 {
            report.push_str(&format!(
                "\n⚠️  Data integrity warnings ({}):\n",
                warning_count
            ));
            for entry in &self.optimality {
                for warning in &entry.distribution.warnings {
                    report.push_str(&format!("  - {}: {}\n", entry.heuristic, warning));
                }
            }
        }

        // Cache
        if let Some(cache) = &self.cache {
            report.push_str("\n💾 Memoization Cache Efficiency:\n");
            for point in &cache.points {
                report.push_str(&format!(
                    "  n={}: {:.2}% hits\n",
                    point.problem_size,
                    point.efficiency * 100.0
                ));
            }
            if let Some(mean) = cache.mean() {
                report.push_str(&format!("  mean: {:.2}%\n", mean * 100.0));
            }
        }

        // Failures
        if !self.failures.is_empty() {
            report.push_str(&format!(
                "\n⚠️  Skipped analyses ({}):\n",
                self.failures.len()
            ));
            for failure in &self.failures {
                report.push_str(&format!("  - {}: {}\n", failure.scope, failure.error));
            }
        }

        report
    }
}

/// Keep the value, or record the error against `scope`
fn record<T>(
    failures: &mut Vec<Failure>,
    scope: impl Into<String>,
    outcome: error::Result<T>,
) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(error) => {
            let scope = scope.into();
            tracing::warn!("Skipping {}: {}", scope, error);
            failures.push(Failure { scope, error });
            None
        }
    }
}

fn compare_groups(
    label: &str,
    groups: error::Result<Vec<SampleGroup>>,
    config: &AnalysisConfig,
    failures: &mut Vec<Failure>,
) -> Option<GroupComparison> {
    let groups = record(failures, label, groups)?;
    let anova = record(failures, label, one_way_anova(&groups))?;
    let pairwise = post_hoc(label, &groups, config, failures);

    tracing::info!(
        comparison = label,
        f = anova.f_statistic,
        p = anova.p_value,
        "group comparison complete"
    );

    Some(GroupComparison {
        label: label.to_string(),
        anova,
        pairwise,
    })
}

fn post_hoc(
    label: &str,
    groups: &[SampleGroup],
    config: &AnalysisConfig,
    failures: &mut Vec<Failure>,
) -> Vec<PairwiseComparison> {
    if !config.pairwise {
        return Vec::new();
    }
    record(
        failures,
        format!("{}: pairwise", label),
        pairwise_welch(groups, config.significance_level),
    )
    .unwrap_or_default()
}

/// Groups aligned on shared sizes, each algorithm using its own time metric
fn primary_time_groups(tables: &[(Algorithm, &TrialTable)]) -> error::Result<Vec<SampleGroup>> {
    let refs: Vec<&TrialTable> = tables.iter().map(|(_, t)| *t).collect();
    let sizes = shared_sizes(&refs);

    tables
        .iter()
        .map(|(algorithm, table)| {
            Ok(SampleGroup::new(
                algorithm.slug(),
                table.averages_at(&algorithm.time_metric(), &sizes)?,
            ))
        })
        .collect()
}

pub const HEURISTIC_TIME: &str = "heuristic execution time";
pub const EXACT_TIME: &str = "exact solver table-build time";
pub const ALL_TIME: &str = "all algorithms primary time";
pub const OPTIMALITY: &str = "approximation ratio";

/// Run every analysis the suite supports
///
/// Fails only on an invalid configuration or an empty suite; individual
/// analyses that cannot be completed end up in [`SuiteReport::failures`].
///
/// # Example
/// ```
/// use knapstat::config::AnalysisConfig;
/// use knapstat::report::analyze_suite;
/// use knapstat::suite::BenchmarkSuite;
///
/// // An empty suite has nothing to analyze
/// assert!(analyze_suite(&BenchmarkSuite::new(), &AnalysisConfig::default()).is_err());
/// ```
pub fn analyze_suite(suite: &BenchmarkSuite, config: &AnalysisConfig) -> Result<SuiteReport> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;
    if suite.is_empty() {
        anyhow::bail!("No trial tables to analyze");
    }

    // Files rejected at load time were already logged by the loader
    let mut failures: Vec<Failure> = suite
        .skipped()
        .iter()
        .map(|s| Failure {
            scope: format!("{}: load", s.algorithm.slug()),
            error: AnalysisError::InvalidTable(s.reason.clone()),
        })
        .collect();

    let (eligible, short) = suite.split_by_rows(config.min_rows);
    for (algorithm, rows) in short {
        record::<()>(
            &mut failures,
            algorithm.slug(),
            Err(AnalysisError::InsufficientSample {
                context: format!("{} table rows", algorithm.slug()),
                required: config.min_rows,
                actual: rows,
            }),
        );
    }

    // Step 1: per-algorithm statistics and fits
    let mut algorithms = Vec::new();

    for (algorithm, table) in eligible.iter() {
        let slug = algorithm.slug();
        let descriptive = record(
            &mut failures,
            format!("{}: descriptive", slug),
            describe_all(table),
        );
        let metric = algorithm.time_metric();
        let model = algorithm.default_model(config.capacity);
        let fit = record(
            &mut failures,
            format!("{}: fit", slug),
            fit_table(&model, table, &metric),
        );
        let bands = match trial_bands(table, &metric) {
            Ok(bands) => bands,
            Err(e) => {
                tracing::debug!(algorithm = slug, error = %e, "no trial bands");
                Vec::new()
            }
        };

        tracing::info!(algorithm = slug, rows = table.len(), "algorithm analyzed");
        algorithms.push(AlgorithmReport {
            algorithm,
            rows: table.len(),
            descriptive,
            fit,
            bands,
        });
    }

    // Step 2: time comparisons
    let mut comparisons = Vec::new();

    let heuristics: Vec<(&str, &TrialTable)> = eligible
        .heuristics()
        .filter(|(_, t)| t.has_metric(&Metric::ExecutionTime))
        .map(|(a, t)| (a.slug(), t))
        .collect();
    if heuristics.len() >= 2 {
        comparisons.extend(compare_groups(
            HEURISTIC_TIME,
            aligned_groups(&heuristics, &Metric::ExecutionTime),
            config,
            &mut failures,
        ));
    }

    let exact: Vec<(&str, &TrialTable)> = eligible
        .exact_solvers()
        .filter(|(_, t)| t.has_metric(&Metric::TableBuildTime))
        .map(|(a, t)| (a.slug(), t))
        .collect();
    if exact.len() >= 2 {
        comparisons.extend(compare_groups(
            EXACT_TIME,
            aligned_groups(&exact, &Metric::TableBuildTime),
            config,
            &mut failures,
        ));
    }

    let timed: Vec<(Algorithm, &TrialTable)> = eligible
        .iter()
        .filter(|(a, t)| t.has_metric(&a.time_metric()))
        .collect();
    let mixed = timed.iter().any(|(a, _)| a.is_exact()) && timed.iter().any(|(a, _)| !a.is_exact());
    if mixed {
        comparisons.extend(compare_groups(
            ALL_TIME,
            primary_time_groups(&timed),
            config,
            &mut failures,
        ));
    }

    // Step 3: optimality against the exact solver
    let mut optimality = Vec::new();
    let rated: Vec<(Algorithm, &TrialTable)> = eligible
        .heuristics()
        .filter(|(_, t)| t.has_metric(&Metric::AchievedValue))
        .collect();

    match eligible.optimum_reference() {
        Some((reference, optimum)) => {
            for (heuristic, table) in &rated {
                let scope = format!("{}: optimality", heuristic.slug());
                let Some(distribution) =
                    record(&mut failures, scope.as_str(), analyze_tables(optimum, table))
                else {
                    continue;
                };
                let summary = record(
                    &mut failures,
                    format!("{} summary", scope),
                    distribution.summary(),
                );
                let coverage = record(
                    &mut failures,
                    format!("{} coverage", scope),
                    distribution.coverage(&config.thresholds),
                )
                .unwrap_or_default();

                optimality.push(OptimalityReport {
                    heuristic: *heuristic,
                    reference,
                    by_size: distribution.by_size(),
                    distribution,
                    summary,
                    coverage,
                });
            }
        }
        None if !rated.is_empty() => {
            record::<()>(
                &mut failures,
                "optimality",
                Err(AnalysisError::InvalidTable(
                    "no exact solver table with an achieved-value column".to_string(),
                )),
            );
        }
        None => {}
    }

    if optimality.len() >= 2 {
        let named: Vec<(&str, &RatioDistribution)> = optimality
            .iter()
            .map(|o| (o.heuristic.slug(), &o.distribution))
            .collect();
        comparisons.extend(compare_groups(
            OPTIMALITY,
            Ok(ratio_groups(&named)),
            config,
            &mut failures,
        ));
    }

    // Step 4: memoization cache
    let cache = eligible
        .get(Algorithm::TopDownMemoized)
        .filter(|t| t.has_metric(&Metric::CacheHits) && t.has_metric(&Metric::CacheMisses))
        .and_then(|t| {
            record(
                &mut failures,
                format!("{}: cache efficiency", Algorithm::TopDownMemoized.slug()),
                cache_efficiency(t),
            )
        });

    Ok(SuiteReport {
        algorithms,
        comparisons,
        optimality,
        cache,
        failures,
        config: config.clone(),
    })
}
