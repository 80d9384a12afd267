//! Analysis configuration
//!
//! Settings can come from a TOML file (`knapstat.toml`) and be overridden by
//! command-line flags.
//!
//! # Example knapstat.toml
//!
//! ```toml
//! significance_level = 0.01
//! capacity = 1000
//! thresholds = [0.99, 0.95, 0.90]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for a suite analysis
///
/// # Example
/// ```
/// use knapstat::config::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.capacity, 1000.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Significance level (alpha) for ANOVA and pairwise tests
    pub significance_level: f64,

    /// Knapsack capacity W used by the c·n·W model of the DP solvers
    ///
    /// Default: 1000, the capacity used by the benchmark harness
    pub capacity: f64,

    /// Optimality coverage thresholds (fraction of the optimum reached),
    /// reported in the order given
    pub thresholds: Vec<f64>,

    /// Minimum number of rows a table needs before it is analyzed
    pub min_rows: usize,

    /// Run post-hoc pairwise Welch t-tests next to each ANOVA
    pub pairwise: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            capacity: 1000.0,
            thresholds: vec![0.95, 0.90, 0.85, 0.80],
            min_rows: 2,
            pairwise: true,
        }
    }
}

impl AnalysisConfig {
    /// 99% confidence and tighter coverage thresholds
    pub fn strict() -> Self {
        Self {
            significance_level: 0.01,
            thresholds: vec![0.99, 0.975, 0.95],
            min_rows: 5,
            ..Self::default()
        }
    }

    /// 90% confidence and looser coverage thresholds
    pub fn permissive() -> Self {
        Self {
            significance_level: 0.10,
            thresholds: vec![0.90, 0.80, 0.70, 0.60],
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parse configuration from a TOML string; unspecified fields keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            return Err(format!(
                "capacity must be positive, got {}",
                self.capacity
            ));
        }

        if let Some(t) = self
            .thresholds
            .iter()
            .find(|t| !(t.is_finite() && **t > 0.0 && **t <= 1.0))
        {
            return Err(format!("thresholds must be in (0, 1], got {}", t));
        }

        if self.min_rows < 2 {
            return Err(format!(
                "min_rows must be >= 2 for sample statistics, got {}",
                self.min_rows
            ));
        }

        Ok(())
    }
}
