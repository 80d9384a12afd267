//! Memoization cache efficiency of the top-down DP solver
//!
//! Efficiency at each problem size is `hits / (hits + misses)` over the
//! per-row averages. Rows without any cache access have no defined
//! efficiency and are skipped.

use crate::error::Result;
use crate::table::{Metric, TrialTable};
use serde::Serialize;

/// Cache behaviour at one problem size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachePoint {
    pub problem_size: u64,
    pub hits: f64,
    pub misses: f64,
    pub efficiency: f64,
}

/// Cache efficiency series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEfficiency {
    pub points: Vec<CachePoint>,
    /// Problem sizes with zero recorded accesses
    pub skipped: Vec<u64>,
}

impl CacheEfficiency {
    /// Mean efficiency over the defined points
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        Some(self.points.iter().map(|p| p.efficiency).sum::<f64>() / self.points.len() as f64)
    }
}

/// Compute the efficiency series from a table's cache-hit and cache-miss columns
pub fn cache_efficiency(table: &TrialTable) -> Result<CacheEfficiency> {
    let hits = table.averages(&Metric::CacheHits)?;
    let misses = table.averages(&Metric::CacheMisses)?;

    let mut points = Vec::new();
    let mut skipped = Vec::new();

    for ((&n, &h), &m) in table.problem_sizes().iter().zip(&hits).zip(&misses) {
        let total = h + m;
        if total <= 0.0 {
            skipped.push(n);
            continue;
        }
        points.push(CachePoint {
            problem_size: n,
            hits: h,
            misses: m,
            efficiency: h / total,
        });
    }

    Ok(CacheEfficiency { points, skipped })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MetricColumn;
    use std::collections::BTreeMap;

    fn table(hits: Vec<f64>, misses: Vec<f64>) -> TrialTable {
        let sizes = (1..=hits.len() as u64).map(|i| i * 100).collect();
        let mut metrics = BTreeMap::new();
        metrics.insert(
            Metric::CacheHits,
            MetricColumn::from_trials(hits.into_iter().map(|v| vec![v]).collect()),
        );
        metrics.insert(
            Metric::CacheMisses,
            MetricColumn::from_trials(misses.into_iter().map(|v| vec![v]).collect()),
        );
        TrialTable::new(sizes, metrics).unwrap()
    }

    #[test]
    fn test_efficiency() {
        let eff = cache_efficiency(&table(vec![30.0, 75.0], vec![70.0, 25.0])).unwrap();
        assert_eq!(eff.points.len(), 2);
        assert_eq!(eff.points[0].efficiency, 0.3);
        assert_eq!(eff.points[1].efficiency, 0.75);
        assert!((eff.mean().unwrap() - 0.525).abs() < 1e-12);
    }

    #[test]
    fn test_zero_access_rows_skipped() {
        let eff = cache_efficiency(&table(vec![0.0, 10.0], vec![0.0, 10.0])).unwrap();
        assert_eq!(eff.skipped, vec![100]);
        assert_eq!(eff.points.len(), 1);
    }

    #[test]
    fn test_requires_cache_columns() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            Metric::TableBuildTime,
            MetricColumn::from_trials(vec![vec![1.0]]),
        );
        let t = TrialTable::new(vec![10], metrics).unwrap();
        assert!(cache_efficiency(&t).is_err());
    }
}
