//! knapstat - Statistical analysis of 0/1 knapsack benchmark results
//!
//! This library turns the per-algorithm trial tables produced by a knapsack
//! benchmark harness into descriptive statistics, complexity fits, ANOVA
//! comparisons and approximation-ratio distributions.

pub mod analysis;
pub mod cache;
pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod ingest;
pub mod json_output;
pub mod report;
pub mod suite;
pub mod table;
