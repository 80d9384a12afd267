//! Error taxonomy for the analysis engine
//!
//! Every hard failure of the core is one of these variants. Non-fatal
//! conditions (e.g. a heuristic beating the reported optimum) are returned as
//! [`crate::analysis::DataIntegrityWarning`] values next to the result instead.

use thiserror::Error;

/// Errors raised by the statistical analysis engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input violates a mathematical precondition of a model
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    /// Statistic undefined because of a zero denominator
    #[error("Degenerate metric: {0}")]
    DegenerateMetric(String),

    #[error("Insufficient samples for {context}: need at least {required}, got {actual}")]
    InsufficientSample {
        context: String,
        required: usize,
        actual: usize,
    },

    #[error("Insufficient groups: need at least {required}, got {actual}")]
    InsufficientGroup { required: usize, actual: usize },

    /// Numerical solve failed to produce a parameter estimate
    #[error("Fit did not converge: {0}")]
    FitConvergence(String),

    /// Table shape or content violates the TrialTable invariants
    #[error("Invalid trial table: {0}")]
    InvalidTable(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    /// Short machine-readable kind, used by the JSON report
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidDomain(_) => "invalid_domain",
            Self::DegenerateMetric(_) => "degenerate_metric",
            Self::InsufficientSample { .. } => "insufficient_sample",
            Self::InsufficientGroup { .. } => "insufficient_group",
            Self::FitConvergence(_) => "fit_convergence",
            Self::InvalidTable(_) => "invalid_table",
        }
    }
}
