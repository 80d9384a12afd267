//! JSON output format for suite reports
//!
//! `--format json`: the whole [`SuiteReport`] as one pretty-printed document.

use crate::analysis::{
    DataIntegrityWarning, FitResult, GroupTestResult, MetricEntry, PairwiseComparison,
    RatioSummary, SizeRatio, ThresholdCoverage, TrialBand,
};
use crate::cache::CacheEfficiency;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::report::SuiteReport;
use serde::Serialize;

/// An error in machine-readable form
#[derive(Debug, Clone, Serialize)]
pub struct JsonError {
    /// Error kind (e.g. "degenerate_metric")
    pub kind: String,
    pub message: String,
}

impl From<&AnalysisError> for JsonError {
    fn from(error: &AnalysisError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Summary of one metric, or why it is undefined
#[derive(Debug, Clone, Serialize)]
pub struct JsonMetric {
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl From<&MetricEntry> for JsonMetric {
    fn from(entry: &MetricEntry) -> Self {
        match &entry.outcome {
            Ok(s) => Self {
                metric: entry.metric.name().to_string(),
                n: Some(s.n),
                mean: Some(s.mean),
                std: Some(s.std),
                cv: Some(s.cv),
                error: None,
            },
            Err(e) => Self {
                metric: entry.metric.name().to_string(),
                n: None,
                mean: None,
                std: None,
                cv: None,
                error: Some(e.into()),
            },
        }
    }
}

/// Per-algorithm section
#[derive(Debug, Clone, Serialize)]
pub struct JsonAlgorithm {
    /// Algorithm identifier (e.g. "bottom_up")
    pub algorithm: String,
    pub name: String,
    pub exact: bool,
    pub rows: usize,
    pub metrics: Vec<JsonMetric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit: Option<JsonFit>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<TrialBand>,
}

/// Complexity fit
#[derive(Debug, Clone, Serialize)]
pub struct JsonFit {
    /// Model formula (e.g. "c·n·log n")
    pub model: String,
    pub big_o: String,
    pub coefficient: f64,
    /// `null` when the observed series is constant
    pub r_squared: Option<f64>,
    pub rmse: f64,
    pub problem_sizes: Vec<u64>,
    pub observed: Vec<f64>,
    pub predicted: Vec<f64>,
}

impl From<&FitResult> for JsonFit {
    fn from(fit: &FitResult) -> Self {
        Self {
            model: fit.model.to_string(),
            big_o: fit.model.big_o().to_string(),
            coefficient: fit.coefficient,
            r_squared: fit.r_squared,
            rmse: fit.rmse,
            problem_sizes: fit.problem_sizes.clone(),
            observed: fit.observed.clone(),
            predicted: fit.predicted.clone(),
        }
    }
}

/// One ANOVA with its post-hoc pairs
#[derive(Debug, Clone, Serialize)]
pub struct JsonComparison {
    pub label: String,
    pub significant: bool,
    pub anova: GroupTestResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pairwise: Vec<PairwiseComparison>,
}

/// Approximation quality of one heuristic
#[derive(Debug, Clone, Serialize)]
pub struct JsonOptimality {
    pub heuristic: String,
    pub reference: String,
    pub trials: usize,
    pub excluded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RatioSummary>,
    pub coverage: Vec<ThresholdCoverage>,
    pub by_size: Vec<SizeRatio>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<DataIntegrityWarning>,
}

/// An analysis that was skipped
#[derive(Debug, Clone, Serialize)]
pub struct JsonFailure {
    pub scope: String,
    pub error: JsonError,
}

/// Complete JSON document
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub format: String,
    pub config: AnalysisConfig,
    pub algorithms: Vec<JsonAlgorithm>,
    pub comparisons: Vec<JsonComparison>,
    pub optimality: Vec<JsonOptimality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheEfficiency>,
    pub failures: Vec<JsonFailure>,
}

impl JsonOutput {
    /// Build the document from a finished report
    pub fn from_report(report: &SuiteReport) -> Self {
        let alpha = report.config.significance_level;

        let algorithms = report
            .algorithms
            .iter()
            .map(|a| JsonAlgorithm {
                algorithm: a.algorithm.slug().to_string(),
                name: a.algorithm.display_name().to_string(),
                exact: a.algorithm.is_exact(),
                rows: a.rows,
                metrics: a
                    .descriptive
                    .as_ref()
                    .map(|d| d.entries.iter().map(JsonMetric::from).collect())
                    .unwrap_or_default(),
                fit: a.fit.as_ref().map(JsonFit::from),
                bands: a.bands.clone(),
            })
            .collect();

        let comparisons = report
            .comparisons
            .iter()
            .map(|c| JsonComparison {
                label: c.label.clone(),
                significant: c.anova.is_significant(alpha),
                anova: c.anova.clone(),
                pairwise: c.pairwise.clone(),
            })
            .collect();

        let optimality = report
            .optimality
            .iter()
            .map(|o| JsonOptimality {
                heuristic: o.heuristic.slug().to_string(),
                reference: o.reference.slug().to_string(),
                trials: o.distribution.samples.len(),
                excluded: o.distribution.excluded_count(),
                summary: o.summary.clone(),
                coverage: o.coverage.clone(),
                by_size: o.by_size.clone(),
                warnings: o.distribution.warnings.clone(),
            })
            .collect();

        let failures = report
            .failures
            .iter()
            .map(|f| JsonFailure {
                scope: f.scope.clone(),
                error: (&f.error).into(),
            })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "knapstat-json-v1".to_string(),
            config: report.config.clone(),
            algorithms,
            comparisons,
            optimality,
            cache: report.cache.clone(),
            failures,
        }
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
