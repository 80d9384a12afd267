//! In-memory representation of one algorithm's benchmark run
//!
//! A [`TrialTable`] has one row per problem size. Each named [`Metric`] column
//! stores, for every row, the independent trial measurements and their
//! per-row average. Tables are validated once at construction and are
//! immutable afterwards.

use crate::error::{AnalysisError, Result};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Semantic name of a measured quantity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    /// Time to fill the DP table (seconds)
    TableBuildTime,
    /// Time to reconstruct the chosen items from the DP table (seconds)
    BacktrackTime,
    /// Total running time of a greedy heuristic (seconds)
    ExecutionTime,
    /// Memoization cache hits (top-down DP only)
    CacheHits,
    /// Memoization cache misses (top-down DP only)
    CacheMisses,
    /// Total value of the knapsack produced by the algorithm
    AchievedValue,
    /// Any other named column
    Other(String),
}

impl Metric {
    pub fn name(&self) -> &str {
        match self {
            Metric::TableBuildTime => "table-build time",
            Metric::BacktrackTime => "backtrack time",
            Metric::ExecutionTime => "execution time",
            Metric::CacheHits => "cache hits",
            Metric::CacheMisses => "cache misses",
            Metric::AchievedValue => "achieved value",
            Metric::Other(name) => name,
        }
    }

    /// True for the wall-clock metrics (reported in seconds)
    pub fn is_time(&self) -> bool {
        matches!(
            self,
            Metric::TableBuildTime | Metric::BacktrackTime | Metric::ExecutionTime
        )
    }

    /// Map a raw CSV column prefix (e.g. `"cache miss"` from `"cache miss 2"`)
    pub fn from_column_prefix(prefix: &str) -> Self {
        match prefix.trim().to_ascii_lowercase().as_str() {
            "trial" => Metric::ExecutionTime,
            "table" => Metric::TableBuildTime,
            "backtrack" => Metric::BacktrackTime,
            "cache miss" => Metric::CacheMisses,
            "cache hit" => Metric::CacheHits,
            "value" => Metric::AchievedValue,
            other => Metric::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Trial measurements for one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRow {
    pub trials: Vec<f64>,
    pub average: f64,
}

impl TrialRow {
    /// Build a row whose average is the arithmetic mean of `trials`
    pub fn from_trials(trials: Vec<f64>) -> Self {
        let average = if trials.is_empty() {
            f64::NAN
        } else {
            trials.iter().sum::<f64>() / trials.len() as f64
        };
        Self { trials, average }
    }
}

/// One metric's rows, aligned with the owning table's problem sizes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricColumn {
    rows: Vec<TrialRow>,
}

impl MetricColumn {
    pub fn new(rows: Vec<TrialRow>) -> Self {
        Self { rows }
    }

    /// Build a column from raw trials, computing each row's average
    pub fn from_trials(trials: Vec<Vec<f64>>) -> Self {
        Self::new(trials.into_iter().map(TrialRow::from_trials).collect())
    }

    pub fn rows(&self) -> &[TrialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Per-row average series
    pub fn averages(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.average).collect()
    }

    /// Trials per row (equal for every row of a validated column)
    pub fn trial_count(&self) -> usize {
        self.rows.first().map_or(0, |r| r.trials.len())
    }

    fn validate(&self, metric: &Metric, expected_rows: usize) -> Result<()> {
        if self.rows.len() != expected_rows {
            return Err(AnalysisError::InvalidTable(format!(
                "column '{}' has {} rows, expected {}",
                metric,
                self.rows.len(),
                expected_rows
            )));
        }

        let trials = self.trial_count();
        if trials == 0 {
            return Err(AnalysisError::InvalidTable(format!(
                "column '{}' has no trial measurements",
                metric
            )));
        }

        for (i, row) in self.rows.iter().enumerate() {
            if row.trials.len() != trials {
                return Err(AnalysisError::InvalidTable(format!(
                    "column '{}' row {} has {} trials, expected {}",
                    metric,
                    i,
                    row.trials.len(),
                    trials
                )));
            }
            if !row.average.is_finite() || row.trials.iter().any(|v| !v.is_finite()) {
                return Err(AnalysisError::InvalidTable(format!(
                    "column '{}' row {} contains a non-finite value",
                    metric, i
                )));
            }
        }

        Ok(())
    }
}

/// One algorithm's benchmark run: problem sizes plus named metric columns
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialTable {
    problem_sizes: Vec<u64>,
    metrics: BTreeMap<Metric, MetricColumn>,
}

impl TrialTable {
    /// Validate and build a table
    ///
    /// Problem sizes must be positive and strictly increasing; every column
    /// must have one row per size, an equal trial count on every row, and only
    /// finite values.
    pub fn new(problem_sizes: Vec<u64>, metrics: BTreeMap<Metric, MetricColumn>) -> Result<Self> {
        if problem_sizes.is_empty() {
            return Err(AnalysisError::InvalidTable(
                "table has no problem sizes".to_string(),
            ));
        }
        if problem_sizes.contains(&0) {
            return Err(AnalysisError::InvalidTable(
                "problem sizes must be positive".to_string(),
            ));
        }
        if let Some(pair) = problem_sizes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(AnalysisError::InvalidTable(format!(
                "problem sizes must be strictly increasing ({} followed by {})",
                pair[0], pair[1]
            )));
        }

        for (metric, column) in &metrics {
            column.validate(metric, problem_sizes.len())?;
        }

        Ok(Self {
            problem_sizes,
            metrics,
        })
    }

    pub fn problem_sizes(&self) -> &[u64] {
        &self.problem_sizes
    }

    pub fn len(&self) -> usize {
        self.problem_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problem_sizes.is_empty()
    }

    pub fn has_metric(&self, metric: &Metric) -> bool {
        self.metrics.contains_key(metric)
    }

    /// Metric names present in this table, in canonical order
    pub fn metrics(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.keys()
    }

    pub fn column(&self, metric: &Metric) -> Result<&MetricColumn> {
        self.metrics.get(metric).ok_or_else(|| {
            AnalysisError::InvalidTable(format!("metric '{}' not present in table", metric))
        })
    }

    /// Per-row averages of `metric`
    pub fn averages(&self, metric: &Metric) -> Result<Vec<f64>> {
        Ok(self.column(metric)?.averages())
    }

    /// Row index of a problem size, if present
    pub fn row_of(&self, problem_size: u64) -> Option<usize> {
        self.problem_sizes.binary_search(&problem_size).ok()
    }

    /// Averages of `metric` at the given sizes (all of which must be present)
    pub fn averages_at(&self, metric: &Metric, sizes: &[u64]) -> Result<Vec<f64>> {
        let column = self.column(metric)?;
        sizes
            .iter()
            .map(|&n| {
                self.row_of(n)
                    .map(|i| column.rows()[i].average)
                    .ok_or_else(|| {
                        AnalysisError::InvalidTable(format!("problem size {} not in table", n))
                    })
            })
            .collect()
    }
}

/// Problem sizes present in every table, in increasing order
pub fn shared_sizes(tables: &[&TrialTable]) -> Vec<u64> {
    let Some((first, rest)) = tables.split_first() else {
        return Vec::new();
    };

    first
        .problem_sizes()
        .iter()
        .copied()
        .filter(|&n| rest.iter().all(|t| t.row_of(n).is_some()))
        .collect()
}
