// Empirical vs. theoretical complexity fitting
//
// Every model in the family is linear in its single scale constant c:
//
//     f(n, c) = c * g(n)
//
// so the least-squares estimate has the closed form
//
//     c = sum(g(n) * y) / sum(g(n)^2)
//
// which needs no starting point and cannot fail to converge except when the
// basis is identically zero.

use crate::error::{AnalysisError, Result};
use crate::table::{Metric, TrialTable};
use serde::Serialize;
use std::fmt;

/// Theoretical running-time model with one free scale constant
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ComplexityModel {
    /// `c * n * W` for the exact DP solvers (W = knapsack capacity)
    LinearCapacity { capacity: f64 },
    /// `c * n * ln(n)` for the sorting-based greedy heuristics
    NLogN,
    /// `c * n^2`
    Quadratic,
}

impl ComplexityModel {
    /// Basis function g(n) = f(n, 1)
    pub fn basis(&self, n: u64) -> Result<f64> {
        if n == 0 {
            return Err(AnalysisError::InvalidDomain(format!(
                "problem size 0 is outside the domain of {}",
                self
            )));
        }
        let x = n as f64;

        match *self {
            ComplexityModel::LinearCapacity { capacity } => {
                if !(capacity.is_finite() && capacity > 0.0) {
                    return Err(AnalysisError::InvalidDomain(format!(
                        "capacity must be positive and finite, got {}",
                        capacity
                    )));
                }
                Ok(x * capacity)
            }
            ComplexityModel::NLogN => Ok(x * x.ln()),
            ComplexityModel::Quadratic => Ok(x * x),
        }
    }

    /// Evaluate f(n, c)
    pub fn evaluate(&self, n: u64, coefficient: f64) -> Result<f64> {
        Ok(coefficient * self.basis(n)?)
    }

    /// Big-O label, e.g. `O(nW)`
    pub fn big_o(&self) -> &'static str {
        match self {
            ComplexityModel::LinearCapacity { .. } => "O(nW)",
            ComplexityModel::NLogN => "O(n log n)",
            ComplexityModel::Quadratic => "O(n^2)",
        }
    }
}

impl fmt::Display for ComplexityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexityModel::LinearCapacity { capacity } => write!(f, "c·n·W (W={})", capacity),
            ComplexityModel::NLogN => f.write_str("c·n·log n"),
            ComplexityModel::Quadratic => f.write_str("c·n²"),
        }
    }
}

/// Result of fitting one model to one observed series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitResult {
    pub model: ComplexityModel,
    pub problem_sizes: Vec<u64>,
    pub observed: Vec<f64>,
    /// Fitted scale constant c
    pub coefficient: f64,
    /// f(n, c) at every observed n
    pub predicted: Vec<f64>,
    /// `1 - SS_res / SS_tot`; `None` when the observed series is constant
    pub r_squared: Option<f64>,
    /// Root mean squared residual
    pub rmse: f64,
}

impl FitResult {
    /// observed - predicted at every n
    pub fn residuals(&self) -> Vec<f64> {
        self.observed
            .iter()
            .zip(&self.predicted)
            .map(|(y, p)| y - p)
            .collect()
    }

    /// R², failing when it is undefined
    pub fn require_r_squared(&self) -> Result<f64> {
        self.r_squared.ok_or_else(|| {
            AnalysisError::DegenerateMetric(
                "R² undefined: observed series has zero total variance".to_string(),
            )
        })
    }

    /// One-line annotation for chart titles and text reports
    pub fn annotation(&self) -> String {
        let r2 = match self.r_squared {
            Some(r2) => format!("{:.4}", r2),
            None => "undefined".to_string(),
        };
        format!("{}: c = {:.4e}, R² = {}", self.model, self.coefficient, r2)
    }
}

/// Fit `model` to `observed` measured at `sizes` by least squares
pub fn fit(model: &ComplexityModel, sizes: &[u64], observed: &[f64]) -> Result<FitResult> {
    if sizes.len() != observed.len() {
        return Err(AnalysisError::InvalidDomain(format!(
            "{} problem sizes but {} observations",
            sizes.len(),
            observed.len()
        )));
    }
    if sizes.is_empty() {
        return Err(AnalysisError::InsufficientSample {
            context: format!("{} fit", model),
            required: 1,
            actual: 0,
        });
    }
    if let Some(bad) = observed.iter().find(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidDomain(format!(
            "observed value {} is not finite",
            bad
        )));
    }

    let basis: Vec<f64> = sizes
        .iter()
        .map(|&n| model.basis(n))
        .collect::<Result<_>>()?;

    let gg: f64 = basis.iter().map(|g| g * g).sum();
    let gy: f64 = basis.iter().zip(observed).map(|(g, y)| g * y).sum();

    if gg == 0.0 || !gg.is_finite() {
        return Err(AnalysisError::FitConvergence(format!(
            "{} basis is degenerate over sizes {:?}",
            model, sizes
        )));
    }

    let coefficient = gy / gg;
    if !coefficient.is_finite() {
        return Err(AnalysisError::FitConvergence(format!(
            "{} produced a non-finite coefficient",
            model
        )));
    }

    let predicted: Vec<f64> = basis.iter().map(|g| coefficient * g).collect();

    let ss_res: f64 = observed
        .iter()
        .zip(&predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();

    let r_squared = if ss_tot == 0.0 {
        None
    } else {
        Some(1.0 - ss_res / ss_tot)
    };
    let rmse = (ss_res / observed.len() as f64).sqrt();

    tracing::debug!(
        model = %model,
        coefficient,
        r_squared = ?r_squared,
        points = sizes.len(),
        "complexity fit"
    );

    Ok(FitResult {
        model: *model,
        problem_sizes: sizes.to_vec(),
        observed: observed.to_vec(),
        coefficient,
        predicted,
        r_squared,
        rmse,
    })
}

/// Fit `model` to the per-row averages of `metric`
pub fn fit_table(model: &ComplexityModel, table: &TrialTable, metric: &Metric) -> Result<FitResult> {
    let observed = table.averages(metric)?;
    fit(model, table.problem_sizes(), &observed)
}
