// Statistical benchmark analysis engine
//
// Pure functions from TrialTables to result values:
// - descriptive: mean / sample std / CV per metric column (statrs, f64)
// - complexity: closed-form least-squares fit of c in f(n, c) = c * g(n)
// - hypothesis: one-way ANOVA with eta-squared (statrs F distribution) and
//   pairwise Welch t-tests (aprender)
// - optimality: optimal/heuristic ratio distribution, coverage, consistency
//
// No component keeps state between calls; all inputs and results are
// Send + Sync and may be analyzed in parallel by the caller.

mod complexity;
mod descriptive;
mod hypothesis;
mod optimality;

pub use complexity::{fit, fit_table, ComplexityModel, FitResult};
pub use descriptive::{
    describe, describe_all, summarize_series, trial_bands, DescriptiveStats, MetricEntry,
    MetricSummary, TrialBand,
};
pub use hypothesis::{
    aligned_groups, one_way_anova, pairwise_welch, GroupSummary, GroupTestResult,
    PairwiseComparison, SampleGroup,
};
pub use optimality::{
    analyze_columns, analyze_tables, compare_optimality, ratio_groups, DataIntegrityWarning,
    ExcludedTrial, RatioDistribution, RatioSample, RatioSummary, SizeRatio, ThresholdCoverage,
};

#[cfg(test)]
mod tests;
