//! CLI argument parsing for knapstat

use crate::config::AnalysisConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the suite report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text report (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV of the fitted complexity series
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "knapstat")]
#[command(version)]
#[command(
    about = "Statistical analysis of 0/1 knapsack benchmark results",
    long_about = None
)]
pub struct Cli {
    /// Directory holding the per-algorithm benchmark CSVs
    #[arg(value_name = "RESULTS_DIR")]
    pub results_dir: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file (flags override its values)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Optimality coverage thresholds (e.g. --threshold 0.99,0.95)
    #[arg(
        short = 't',
        long = "threshold",
        value_name = "T",
        value_delimiter = ','
    )]
    pub thresholds: Option<Vec<f64>>,

    /// Knapsack capacity W used by the DP complexity model
    #[arg(short = 'W', long = "capacity", value_name = "W")]
    pub capacity: Option<f64>,

    /// Significance level for ANOVA and pairwise tests
    #[arg(short = 'a', long = "alpha", value_name = "ALPHA")]
    pub alpha: Option<f64>,

    /// Skip post-hoc pairwise Welch t-tests
    #[arg(long = "no-pairwise")]
    pub no_pairwise: bool,

    /// Write the report to FILE instead of stdout
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides on top of a base configuration
    pub fn apply_overrides(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(thresholds) = &self.thresholds {
            config.thresholds = thresholds.clone();
        }
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(alpha) = self.alpha {
            config.significance_level = alpha;
        }
        if self.no_pairwise {
            config.pairwise = false;
        }
        config
    }
}
