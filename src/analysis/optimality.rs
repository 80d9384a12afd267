// Heuristic solution quality against the exact DP optimum
//
// For every (problem size, trial) shared by the optimal and heuristic
// value columns:
//
//     ratio      = optimal / heuristic   (approximation ratio, 1.0 = optimal)
//     efficiency = heuristic / optimal   (fraction of the optimum reached)
//
// Threshold coverage is expressed on the efficiency scale ("reached at least
// 95% of the optimum"). A heuristic value of zero excludes the trial; a
// heuristic value above the optimum is a data-integrity warning.

use crate::analysis::descriptive::{percentile, sample_moments};
use crate::analysis::hypothesis::{one_way_anova, GroupTestResult, SampleGroup};
use crate::error::{AnalysisError, Result};
use crate::table::{Metric, MetricColumn, TrialTable};
use serde::Serialize;

/// One included (size, trial) observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioSample {
    pub problem_size: u64,
    pub trial: usize,
    pub optimal: f64,
    pub heuristic: f64,
    pub ratio: f64,
}

impl RatioSample {
    pub fn efficiency(&self) -> f64 {
        self.heuristic / self.optimal
    }
}

/// A trial left out of the distribution because the heuristic value was zero
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedTrial {
    pub problem_size: u64,
    pub trial: usize,
    pub optimal: f64,
}

/// Non-fatal inconsistency between the exact and heuristic measurements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataIntegrityWarning {
    /// Heuristic reported a higher value than the exact optimum
    HeuristicExceedsOptimum {
        problem_size: u64,
        trial: usize,
        optimal: f64,
        heuristic: f64,
    },
}

impl std::fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataIntegrityWarning::HeuristicExceedsOptimum {
                problem_size,
                trial,
                optimal,
                heuristic,
            } => write!(
                f,
                "n={} trial {}: heuristic value {} exceeds optimum {}",
                problem_size,
                trial + 1,
                heuristic,
                optimal
            ),
        }
    }
}

/// Summary of the approximation-ratio distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    /// 2.5th percentile
    pub interval_lower: f64,
    /// 97.5th percentile
    pub interval_upper: f64,
    pub min: f64,
    pub max: f64,
    pub range: f64,
    pub cv: f64,
}

/// Fraction of trials reaching at least `threshold` of the optimum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCoverage {
    pub threshold: f64,
    pub covered: usize,
    pub total: usize,
    pub fraction: f64,
}

impl ThresholdCoverage {
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

/// Mean ratio at one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeRatio {
    pub problem_size: u64,
    pub trials: usize,
    pub mean_ratio: f64,
}

/// Optimal/heuristic ratios over every shared (size, trial)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioDistribution {
    pub samples: Vec<RatioSample>,
    pub excluded: Vec<ExcludedTrial>,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl RatioDistribution {
    pub fn ratios(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.ratio).collect()
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn require_samples(&self, required: usize) -> Result<()> {
        if self.samples.len() < required {
            return Err(AnalysisError::InsufficientSample {
                context: "optimality ratios".to_string(),
                required,
                actual: self.samples.len(),
            });
        }
        Ok(())
    }

    /// Mean, median, spread and 95% empirical interval of the ratios
    pub fn summary(&self) -> Result<RatioSummary> {
        self.require_samples(2)?;

        let mut sorted = self.ratios();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let (mean, std) = sample_moments("optimality ratios", &sorted)?;
        if mean == 0.0 {
            return Err(AnalysisError::DegenerateMetric(
                "coefficient of variation undefined: mean ratio is zero".to_string(),
            ));
        }

        let min = sorted[0];
        let max = sorted[sorted.len() - 1];

        Ok(RatioSummary {
            count: sorted.len(),
            mean,
            median: percentile(&sorted, 50.0),
            std,
            interval_lower: percentile(&sorted, 2.5),
            interval_upper: percentile(&sorted, 97.5),
            min,
            max,
            range: max - min,
            cv: std / mean,
        })
    }

    /// Coverage for each threshold, in the order given
    pub fn coverage(&self, thresholds: &[f64]) -> Result<Vec<ThresholdCoverage>> {
        self.require_samples(1)?;

        let total = self.samples.len();
        thresholds
            .iter()
            .map(|&threshold| {
                if !(threshold.is_finite() && threshold > 0.0) {
                    return Err(AnalysisError::InvalidDomain(format!(
                        "coverage threshold must be positive and finite, got {}",
                        threshold
                    )));
                }
                let covered = self
                    .samples
                    .iter()
                    .filter(|s| s.efficiency() >= threshold)
                    .count();
                Ok(ThresholdCoverage {
                    threshold,
                    covered,
                    total,
                    fraction: covered as f64 / total as f64,
                })
            })
            .collect()
    }

    /// Mean ratio per problem size, in increasing size order
    pub fn by_size(&self) -> Vec<SizeRatio> {
        let mut out: Vec<SizeRatio> = Vec::new();
        for sample in &self.samples {
            match out.last_mut() {
                Some(last) if last.problem_size == sample.problem_size => {
                    last.mean_ratio += sample.ratio;
                    last.trials += 1;
                }
                _ => out.push(SizeRatio {
                    problem_size: sample.problem_size,
                    trials: 1,
                    mean_ratio: sample.ratio,
                }),
            }
        }
        for size in &mut out {
            size.mean_ratio /= size.trials as f64;
        }
        out
    }
}

/// Elementwise optimal/heuristic ratios over rows with matching problem size
pub fn analyze_columns(
    optimal_sizes: &[u64],
    optimal: &MetricColumn,
    heuristic_sizes: &[u64],
    heuristic: &MetricColumn,
) -> Result<RatioDistribution> {
    let mut samples = Vec::new();
    let mut excluded = Vec::new();
    let mut warnings = Vec::new();
    let mut shared_rows = 0usize;

    for (i, &n) in optimal_sizes.iter().enumerate() {
        let Ok(j) = heuristic_sizes.binary_search(&n) else {
            continue;
        };
        shared_rows += 1;

        let (Some(opt_row), Some(heu_row)) = (optimal.rows().get(i), heuristic.rows().get(j)) else {
            return Err(AnalysisError::InvalidTable(format!(
                "value column is shorter than its problem sizes at n={}",
                n
            )));
        };
        if opt_row.trials.len() != heu_row.trials.len() {
            return Err(AnalysisError::InvalidTable(format!(
                "n={}: {} optimal trials but {} heuristic trials",
                n,
                opt_row.trials.len(),
                heu_row.trials.len()
            )));
        }

        for (trial, (&opt, &heu)) in opt_row.trials.iter().zip(&heu_row.trials).enumerate() {
            if heu == 0.0 {
                tracing::debug!(n, trial, "heuristic value is zero, trial excluded");
                excluded.push(ExcludedTrial {
                    problem_size: n,
                    trial,
                    optimal: opt,
                });
                continue;
            }

            if heu > opt {
                let warning = DataIntegrityWarning::HeuristicExceedsOptimum {
                    problem_size: n,
                    trial,
                    optimal: opt,
                    heuristic: heu,
                };
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }

            samples.push(RatioSample {
                problem_size: n,
                trial,
                optimal: opt,
                heuristic: heu,
                ratio: opt / heu,
            });
        }
    }

    if shared_rows == 0 {
        return Err(AnalysisError::InvalidTable(
            "optimal and heuristic tables share no problem sizes".to_string(),
        ));
    }

    Ok(RatioDistribution {
        samples,
        excluded,
        warnings,
    })
}

/// Compare the achieved-value columns of an exact solver and a heuristic
pub fn analyze_tables(optimal: &TrialTable, heuristic: &TrialTable) -> Result<RatioDistribution> {
    analyze_columns(
        optimal.problem_sizes(),
        optimal.column(&Metric::AchievedValue)?,
        heuristic.problem_sizes(),
        heuristic.column(&Metric::AchievedValue)?,
    )
}

/// One ratio group per heuristic, in the order given
pub fn ratio_groups(distributions: &[(&str, &RatioDistribution)]) -> Vec<SampleGroup> {
    distributions
        .iter()
        .map(|(name, dist)| SampleGroup::new(*name, dist.ratios()))
        .collect()
}

/// ANOVA over the heuristics' ratio sequences (one group per heuristic)
pub fn compare_optimality(distributions: &[(&str, &RatioDistribution)]) -> Result<GroupTestResult> {
    one_way_anova(&ratio_groups(distributions))
}
