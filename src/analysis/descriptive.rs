// Descriptive statistics over TrialTable metric columns
//
// Mean, sample standard deviation and coefficient of variation (CV = std / mean)
// of a metric's per-row average series. Moments stay in f64: cache counters
// reach n·W (around 1e8), past the range where f32 keeps integer precision.

use crate::error::{AnalysisError, Result};
use crate::table::{Metric, TrialTable};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Mean / sample std / CV of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub metric: Metric,
    /// Number of observations (table rows)
    pub n: usize,
    pub mean: f64,
    /// Sample (Bessel-corrected) standard deviation
    pub std: f64,
    /// Coefficient of variation (std / mean)
    pub cv: f64,
}

/// Outcome of summarizing one requested metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricEntry {
    pub metric: Metric,
    pub outcome: Result<MetricSummary>,
}

/// Per-metric summaries for one table, in the order they were requested
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DescriptiveStats {
    pub entries: Vec<MetricEntry>,
}

impl DescriptiveStats {
    pub fn get(&self, metric: &Metric) -> Option<&Result<MetricSummary>> {
        self.entries
            .iter()
            .find(|e| &e.metric == metric)
            .map(|e| &e.outcome)
    }

    /// Successfully computed summaries
    pub fn summaries(&self) -> impl Iterator<Item = &MetricSummary> {
        self.entries.iter().filter_map(|e| e.outcome.as_ref().ok())
    }

    /// Metrics whose summary is undefined, with the reason
    pub fn undefined(&self) -> impl Iterator<Item = (&Metric, &AnalysisError)> {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.as_ref().err().map(|err| (&e.metric, err)))
    }
}

/// Per-row trial dispersion band (average ± sample std across the row's trials)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialBand {
    pub problem_size: u64,
    pub average: f64,
    pub std: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Mean and sample (n - 1) standard deviation in f64
pub(crate) fn sample_moments(context: &str, values: &[f64]) -> Result<(f64, f64)> {
    if values.len() < 2 {
        return Err(AnalysisError::InsufficientSample {
            context: context.to_string(),
            required: 2,
            actual: values.len(),
        });
    }

    let mean = values.iter().mean();
    let std = values.iter().std_dev();
    if !(mean.is_finite() && std.is_finite()) {
        return Err(AnalysisError::DegenerateMetric(format!(
            "{}: moments are not finite",
            context
        )));
    }

    Ok((mean, std))
}

/// Linear-interpolated percentile of sorted data (`pct` in 0..=100)
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let weight = index - lower as f64;
        sorted[lower] * (1.0 - weight) + sorted[upper] * weight
    }
}

/// Summarize a single series; fails when the CV is undefined (zero mean)
pub fn summarize_series(metric: &Metric, values: &[f64]) -> Result<MetricSummary> {
    let (mean, std) = sample_moments(metric.name(), values)?;

    if mean == 0.0 {
        return Err(AnalysisError::DegenerateMetric(format!(
            "coefficient of variation undefined for '{}': mean is zero",
            metric
        )));
    }

    Ok(MetricSummary {
        metric: metric.clone(),
        n: values.len(),
        mean,
        std,
        cv: std / mean,
    })
}

/// Summarize the per-row averages of each requested metric
///
/// Unknown metrics and an empty request are hard errors. Per-metric failures
/// (zero mean, fewer than two rows) are recorded in that metric's entry so the
/// remaining metrics are still reported.
pub fn describe(table: &TrialTable, metrics: &[Metric]) -> Result<DescriptiveStats> {
    if metrics.is_empty() {
        return Err(AnalysisError::InsufficientSample {
            context: "metric list".to_string(),
            required: 1,
            actual: 0,
        });
    }

    let mut entries = Vec::with_capacity(metrics.len());
    for metric in metrics {
        let averages = table.averages(metric)?;
        let outcome = summarize_series(metric, &averages);
        if let Err(ref e) = outcome {
            tracing::debug!(metric = %metric, error = %e, "metric summary undefined");
        }
        entries.push(MetricEntry {
            metric: metric.clone(),
            outcome,
        });
    }

    Ok(DescriptiveStats { entries })
}

/// Summarize every metric present in the table
pub fn describe_all(table: &TrialTable) -> Result<DescriptiveStats> {
    let metrics: Vec<Metric> = table.metrics().cloned().collect();
    describe(table, &metrics)
}

/// Per-row `average ± std` across the trials of `metric`
pub fn trial_bands(table: &TrialTable, metric: &Metric) -> Result<Vec<TrialBand>> {
    let column = table.column(metric)?;

    table
        .problem_sizes()
        .iter()
        .zip(column.rows())
        .map(|(&n, row)| {
            let (_, std) = sample_moments(&format!("{} trials at n={}", metric, n), &row.trials)?;
            Ok(TrialBand {
                problem_size: n,
                average: row.average,
                std,
                lower: row.average - std,
                upper: row.average + std,
            })
        })
        .collect()
}
