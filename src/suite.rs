//! The five benchmarked knapsack algorithms and their trial tables

use crate::analysis::ComplexityModel;
use crate::table::{Metric, TrialTable};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A benchmarked 0/1 knapsack algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Exact: bottom-up tabulation
    BottomUp,
    /// Exact: top-down recursion with a memoization cache
    TopDownMemoized,
    /// Greedy by value/weight density
    GreatestWorthFirst,
    /// Greedy by value
    LargestValueFirst,
    /// Greedy by weight
    SmallestWeightFirst,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::BottomUp,
        Algorithm::TopDownMemoized,
        Algorithm::GreatestWorthFirst,
        Algorithm::LargestValueFirst,
        Algorithm::SmallestWeightFirst,
    ];

    /// Identifier used in file names and machine-readable output
    pub fn slug(&self) -> &'static str {
        match self {
            Algorithm::BottomUp => "bottom_up",
            Algorithm::TopDownMemoized => "top_down_memoized",
            Algorithm::GreatestWorthFirst => "greatest_worth_first",
            Algorithm::LargestValueFirst => "largest_value_first",
            Algorithm::SmallestWeightFirst => "smallest_weight_first",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Algorithm::BottomUp => "Bottom-up DP",
            Algorithm::TopDownMemoized => "Top-down memoized DP",
            Algorithm::GreatestWorthFirst => "Greatest Worth First",
            Algorithm::LargestValueFirst => "Largest Value First",
            Algorithm::SmallestWeightFirst => "Smallest Weight First",
        }
    }

    /// CSV file written by the benchmark harness
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.slug())
    }

    /// Exact DP solver (as opposed to a greedy heuristic)
    pub fn is_exact(&self) -> bool {
        matches!(self, Algorithm::BottomUp | Algorithm::TopDownMemoized)
    }

    /// Theoretical running-time model for this algorithm
    pub fn default_model(&self, capacity: f64) -> ComplexityModel {
        if self.is_exact() {
            ComplexityModel::LinearCapacity { capacity }
        } else {
            ComplexityModel::NLogN
        }
    }

    /// The time column compared across algorithms
    pub fn time_metric(&self) -> Metric {
        if self.is_exact() {
            Metric::TableBuildTime
        } else {
            Metric::ExecutionTime
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Trial tables of one benchmark run, keyed by algorithm
/// A results file that was present but could not be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTable {
    pub algorithm: Algorithm,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenchmarkSuite {
    tables: BTreeMap<Algorithm, TrialTable>,
    skipped: Vec<SkippedTable>,
}

impl BenchmarkSuite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, algorithm: Algorithm, table: TrialTable) {
        self.tables.insert(algorithm, table);
    }

    /// Record a table that was found but rejected
    pub fn skip(&mut self, algorithm: Algorithm, reason: impl Into<String>) {
        self.skipped.push(SkippedTable {
            algorithm,
            reason: reason.into(),
        });
    }

    pub fn skipped(&self) -> &[SkippedTable] {
        &self.skipped
    }

    pub fn get(&self, algorithm: Algorithm) -> Option<&TrialTable> {
        self.tables.get(&algorithm)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in algorithm order
    pub fn iter(&self) -> impl Iterator<Item = (Algorithm, &TrialTable)> {
        self.tables.iter().map(|(a, t)| (*a, t))
    }

    pub fn heuristics(&self) -> impl Iterator<Item = (Algorithm, &TrialTable)> {
        self.iter().filter(|(a, _)| !a.is_exact())
    }

    pub fn exact_solvers(&self) -> impl Iterator<Item = (Algorithm, &TrialTable)> {
        self.iter().filter(|(a, _)| a.is_exact())
    }

    /// Exact solver whose achieved values serve as the optimum
    ///
    /// Bottom-up is preferred; the memoized solver is used when bottom-up has
    /// no value column.
    pub fn optimum_reference(&self) -> Option<(Algorithm, &TrialTable)> {
        self.exact_solvers()
            .find(|(_, t)| t.has_metric(&Metric::AchievedValue))
    }

    /// Split off tables with fewer than `min_rows` problem sizes
    ///
    /// Returns the remaining suite and the `(algorithm, rows)` of each table
    /// that was left out.
    pub fn split_by_rows(&self, min_rows: usize) -> (BenchmarkSuite, Vec<(Algorithm, usize)>) {
        let mut kept = BenchmarkSuite::new();
        let mut short = Vec::new();
        for (algorithm, table) in self.iter() {
            if table.len() < min_rows {
                short.push((algorithm, table.len()));
            } else {
                kept.insert(algorithm, table.clone());
            }
        }
        (kept, short)
    }
}
