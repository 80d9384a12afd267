// Cross-algorithm hypothesis testing
//
// - One-way ANOVA across k >= 2 named groups of unequal size, p-value from the
//   F(k-1, N-k) survival function (statrs)
// - Eta-squared effect size: F(k-1) / (F(k-1) + (N-k))
// - Post-hoc pairwise Welch t-tests (aprender's ttest_ind with unequal
//   variances) with Bonferroni-adjusted significance

use crate::error::{AnalysisError, Result};
use crate::table::{shared_sizes, Metric, TrialTable};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

/// Named sample group (one per algorithm)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleGroup {
    pub name: String,
    pub samples: Vec<f64>,
}

impl SampleGroup {
    pub fn new(name: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    fn mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

/// Per-group figures reported next to the test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub n: usize,
    pub mean: f64,
}

/// One-way ANOVA result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTestResult {
    pub groups: Vec<GroupSummary>,
    pub f_statistic: f64,
    pub p_value: f64,
    /// Eta-squared
    pub effect_size: f64,
    pub df_between: usize,
    pub df_within: usize,
    pub ss_between: f64,
    pub ss_within: f64,
}

impl GroupTestResult {
    /// True when the common-mean null hypothesis is rejected at `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Conventional magnitude label for eta-squared
    pub fn effect_label(&self) -> &'static str {
        match self.effect_size {
            e if e >= 0.14 => "large",
            e if e >= 0.06 => "medium",
            e if e >= 0.01 => "small",
            _ => "negligible",
        }
    }
}

fn validate_groups(groups: &[SampleGroup]) -> Result<()> {
    if groups.len() < 2 {
        return Err(AnalysisError::InsufficientGroup {
            required: 2,
            actual: groups.len(),
        });
    }

    for group in groups {
        if group.samples.len() < 2 {
            return Err(AnalysisError::InsufficientSample {
                context: format!("group '{}'", group.name),
                required: 2,
                actual: group.samples.len(),
            });
        }
        if group.samples.iter().any(|v| !v.is_finite()) {
            return Err(AnalysisError::InvalidDomain(format!(
                "group '{}' contains a non-finite sample",
                group.name
            )));
        }
    }

    Ok(())
}

/// One-way ANOVA testing whether all groups share a common mean
///
/// # Example
/// ```
/// use knapstat::analysis::{one_way_anova, SampleGroup};
///
/// let groups = vec![
///     SampleGroup::new("greatest worth", vec![1.0, 1.1, 0.9, 1.0]),
///     SampleGroup::new("largest value", vec![5.0, 5.2, 4.9, 5.1]),
///     SampleGroup::new("smallest weight", vec![9.0, 9.1, 8.8, 9.2]),
/// ];
///
/// let result = one_way_anova(&groups).unwrap();
/// assert!(result.p_value < 0.05);
/// ```
pub fn one_way_anova(groups: &[SampleGroup]) -> Result<GroupTestResult> {
    validate_groups(groups)?;

    let k = groups.len();
    let total: usize = groups.iter().map(|g| g.samples.len()).sum();
    let grand_mean = groups.iter().flat_map(|g| &g.samples).sum::<f64>() / total as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    let mut summaries = Vec::with_capacity(k);

    for group in groups {
        let mean = group.mean();
        ss_between += group.samples.len() as f64 * (mean - grand_mean).powi(2);
        ss_within += group
            .samples
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>();
        summaries.push(GroupSummary {
            name: group.name.clone(),
            n: group.samples.len(),
            mean,
        });
    }

    let df_between = k - 1;
    let df_within = total - k;

    if ss_within == 0.0 {
        return Err(AnalysisError::DegenerateMetric(
            "F statistic undefined: zero within-group variance".to_string(),
        ));
    }

    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;
    let f_statistic = ms_between / ms_within;

    let distribution = FisherSnedecor::new(df_between as f64, df_within as f64)
        .map_err(|e| AnalysisError::InvalidDomain(format!("F distribution: {}", e)))?;
    let p_value = distribution.sf(f_statistic).clamp(0.0, 1.0);

    let explained = f_statistic * df_between as f64;
    let effect_size = explained / (explained + df_within as f64);

    tracing::debug!(
        groups = k,
        samples = total,
        f_statistic,
        p_value,
        effect_size,
        "one-way ANOVA"
    );

    Ok(GroupTestResult {
        groups: summaries,
        f_statistic,
        p_value,
        effect_size,
        df_between,
        df_within,
        ss_between,
        ss_within,
    })
}

/// Welch t-test between two groups
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseComparison {
    pub first: String,
    pub second: String,
    pub mean_difference: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub df: f64,
    /// Significant at the Bonferroni-adjusted level
    pub significant: bool,
}

/// Welch t-tests for every pair of groups
///
/// Significance uses `alpha / m` where `m` is the number of pairs. Pairs the
/// t-test cannot handle (e.g. two zero-variance groups) are skipped with a
/// warning.
///
/// The t-test runs in f32, so each pair is shifted by its combined mean
/// before narrowing. Welch's t and df do not change under a common shift,
/// and only the spread around the pair's centre has to fit in f32.
pub fn pairwise_welch(groups: &[SampleGroup], alpha: f64) -> Result<Vec<PairwiseComparison>> {
    validate_groups(groups)?;

    let pairs = groups.len() * (groups.len() - 1) / 2;
    let adjusted_alpha = alpha / pairs as f64;

    let mut comparisons = Vec::with_capacity(pairs);
    for i in 0..groups.len() {
        for j in (i + 1)..groups.len() {
            let (first, second) = centered_pair(&groups[i], &groups[j]);
            match aprender::stats::hypothesis::ttest_ind(&first, &second, false) {
                Ok(test) => {
                    let p_value = test.pvalue as f64;
                    comparisons.push(PairwiseComparison {
                        first: groups[i].name.clone(),
                        second: groups[j].name.clone(),
                        mean_difference: groups[i].mean() - groups[j].mean(),
                        t_statistic: test.statistic as f64,
                        p_value,
                        df: test.df as f64,
                        significant: p_value < adjusted_alpha,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to compare {} and {}: {}",
                        groups[i].name,
                        groups[j].name,
                        e
                    );
                }
            }
        }
    }

    Ok(comparisons)
}

/// Both groups as f32, offset by the mean of their pooled samples
fn centered_pair(a: &SampleGroup, b: &SampleGroup) -> (Vec<f32>, Vec<f32>) {
    let count = (a.samples.len() + b.samples.len()) as f64;
    let centre = a.samples.iter().chain(&b.samples).sum::<f64>() / count;
    let shift = |g: &SampleGroup| g.samples.iter().map(|&v| (v - centre) as f32).collect();
    (shift(a), shift(b))
}

/// Build one group per table from `metric`'s per-size averages
///
/// Only problem sizes present in every table are used, so the groups are
/// aligned size by size.
pub fn aligned_groups(tables: &[(&str, &TrialTable)], metric: &Metric) -> Result<Vec<SampleGroup>> {
    let refs: Vec<&TrialTable> = tables.iter().map(|(_, t)| *t).collect();
    let sizes = shared_sizes(&refs);

    tables
        .iter()
        .map(|(name, table)| {
            Ok(SampleGroup::new(
                *name,
                table.averages_at(metric, &sizes)?,
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MetricColumn;
    use std::collections::BTreeMap;

    #[test]
    fn test_identical_groups_have_no_effect() {
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        let groups = vec![
            SampleGroup::new("a", samples.clone()),
            SampleGroup::new("b", samples.clone()),
            SampleGroup::new("c", samples),
        ];

        let result = one_way_anova(&groups).unwrap();
        assert!(result.f_statistic.abs() < 1e-12);
        assert!((result.p_value - 1.0).abs() < 1e-9);
        assert!(result.effect_size.abs() < 1e-12);
        assert!(!result.is_significant(0.05));
        assert_eq!(result.effect_label(), "negligible");
    }

    #[test]
    fn test_separated_groups_are_significant() {
        let groups = vec![
            SampleGroup::new("a", vec![1.0, 1.1, 0.9, 1.0, 1.05]),
            SampleGroup::new("b", vec![5.0, 5.2, 4.9, 5.1, 5.0]),
            SampleGroup::new("c", vec![9.0, 9.1, 8.8, 9.2, 9.0]),
        ];

        let result = one_way_anova(&groups).unwrap();
        assert!(result.f_statistic > 100.0);
        assert!(result.p_value < 0.05);
        assert!(result.effect_size > 0.9);
        assert_eq!(result.effect_label(), "large");
        assert_eq!(result.df_between, 2);
        assert_eq!(result.df_within, 12);
    }

    #[test]
    fn test_matches_reference_f_statistic() {
        // groups [1,2,3] and [4,5,6]: SSB = 13.5, SSW = 4, F = 13.5 / (4/4) = 13.5
        let groups = vec![
            SampleGroup::new("x", vec![1.0, 2.0, 3.0]),
            SampleGroup::new("y", vec![4.0, 5.0, 6.0]),
        ];
        let result = one_way_anova(&groups).unwrap();
        assert!((result.ss_between - 13.5).abs() < 1e-12);
        assert!((result.ss_within - 4.0).abs() < 1e-12);
        assert!((result.f_statistic - 13.5).abs() < 1e-12);
        // eta² = SSB / (SSB + SSW)
        assert!((result.effect_size - 13.5 / 17.5).abs() < 1e-12);
        // F(1, 4) = 13.5 -> p ≈ 0.0213
        assert!((result.p_value - 0.0213).abs() < 1e-3);
    }

    #[test]
    fn test_unequal_group_sizes() {
        let groups = vec![
            SampleGroup::new("short", vec![1.0, 2.0]),
            SampleGroup::new("long", vec![1.5, 2.5, 1.0, 2.0, 3.0]),
        ];
        let result = one_way_anova(&groups).unwrap();
        assert_eq!(result.groups[0].n, 2);
        assert_eq!(result.groups[1].n, 5);
        assert_eq!(result.df_within, 5);
    }

    #[test]
    fn test_insufficient_groups() {
        let err = one_way_anova(&[SampleGroup::new("only", vec![1.0, 2.0])]).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientGroup {
                required: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_insufficient_samples() {
        let groups = vec![
            SampleGroup::new("a", vec![1.0, 2.0]),
            SampleGroup::new("b", vec![3.0]),
        ];
        assert!(matches!(
            one_way_anova(&groups),
            Err(AnalysisError::InsufficientSample { .. })
        ));
    }

    #[test]
    fn test_zero_within_variance_is_degenerate() {
        let groups = vec![
            SampleGroup::new("a", vec![1.0, 1.0]),
            SampleGroup::new("b", vec![2.0, 2.0]),
        ];
        assert!(matches!(
            one_way_anova(&groups),
            Err(AnalysisError::DegenerateMetric(_))
        ));
    }

    #[test]
    fn test_group_order_is_preserved() {
        let groups = vec![
            SampleGroup::new("zeta", vec![1.0, 2.0]),
            SampleGroup::new("alpha", vec![3.0, 4.0]),
        ];
        let result = one_way_anova(&groups).unwrap();
        assert_eq!(result.groups[0].name, "zeta");
        assert_eq!(result.groups[1].name, "alpha");
    }

    #[test]
    fn test_pairwise_welch_detects_separated_pair() {
        let groups = vec![
            SampleGroup::new("fast", vec![10.0, 12.0, 11.0, 13.0, 10.0]),
            SampleGroup::new("slow", vec![25.0, 27.0, 26.0, 28.0, 25.0]),
            SampleGroup::new("fast2", vec![11.0, 13.0, 10.0, 12.0, 11.0]),
        ];

        let comparisons = pairwise_welch(&groups, 0.05).unwrap();
        assert_eq!(comparisons.len(), 3);

        let fast_slow = &comparisons[0];
        assert_eq!(fast_slow.first, "fast");
        assert_eq!(fast_slow.second, "slow");
        assert!(fast_slow.significant);
        assert!(fast_slow.mean_difference < 0.0);

        let fast_fast2 = &comparisons[1];
        assert_eq!(fast_fast2.second, "fast2");
        assert!(!fast_fast2.significant);
    }

    #[test]
    fn test_pairwise_welch_on_large_counters() {
        // Cache counters near 1e8 are spaced closer than f32 can resolve
        let groups = vec![
            SampleGroup::new("a", (100_000_001..=100_000_005).map(|v| v as f64).collect()),
            SampleGroup::new("b", (100_000_011..=100_000_015).map(|v| v as f64).collect()),
        ];

        let comparisons = pairwise_welch(&groups, 0.05).unwrap();
        assert_eq!(comparisons.len(), 1);

        let pair = &comparisons[0];
        assert!((pair.mean_difference + 10.0).abs() < 1e-9);
        assert!((pair.t_statistic.abs() - 10.0).abs() < 1e-3);
        assert!((pair.df - 8.0).abs() < 1e-3);
        assert!(pair.significant);
    }

    #[test]
    fn test_aligned_groups_use_shared_sizes() {
        let make = |sizes: Vec<u64>, values: Vec<f64>| {
            let mut metrics = BTreeMap::new();
            metrics.insert(
                Metric::ExecutionTime,
                MetricColumn::from_trials(values.into_iter().map(|v| vec![v]).collect()),
            );
            TrialTable::new(sizes, metrics).unwrap()
        };
        let a = make(vec![10, 20, 30], vec![1.0, 2.0, 3.0]);
        let b = make(vec![20, 30], vec![5.0, 6.0]);

        let groups = aligned_groups(&[("a", &a), ("b", &b)], &Metric::ExecutionTime).unwrap();
        assert_eq!(groups[0].samples, vec![2.0, 3.0]);
        assert_eq!(groups[1].samples, vec![5.0, 6.0]);
    }
}
