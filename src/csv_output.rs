//! CSV output format for fitted complexity series
//!
//! One row per (algorithm, problem size): the observed average next to the
//! fitted model's prediction, ready for plotting in a spreadsheet.

use crate::analysis::FitResult;
use crate::report::SuiteReport;
use crate::suite::Algorithm;
use anyhow::Context;
use serde::Serialize;

/// CSV record for one fitted point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CsvFitRow {
    pub algorithm: String,
    pub model: String,
    pub n: u64,
    pub observed: f64,
    pub predicted: f64,
}

/// CSV output formatter
#[derive(Debug, Default)]
pub struct CsvOutput {
    rows: Vec<CsvFitRow>,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the fitted series of every algorithm in the report
    pub fn from_report(report: &SuiteReport) -> Self {
        let mut output = Self::new();
        for (algorithm, fit) in report.fits() {
            output.add_fit(algorithm, fit);
        }
        output
    }

    /// Add every point of one fit
    pub fn add_fit(&mut self, algorithm: Algorithm, fit: &FitResult) {
        let model = fit.model.to_string();
        for ((&n, &observed), &predicted) in fit
            .problem_sizes
            .iter()
            .zip(&fit.observed)
            .zip(&fit.predicted)
        {
            self.rows.push(CsvFitRow {
                algorithm: algorithm.slug().to_string(),
                model: model.clone(),
                n,
                observed,
                predicted,
            });
        }
    }

    pub fn rows(&self) -> &[CsvFitRow] {
        &self.rows
    }

    /// Generate CSV output as string (header always present)
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(["algorithm", "model", "n", "observed", "predicted"])?;
        for row in &self.rows {
            writer.serialize(row)?;
        }

        let bytes = writer.into_inner().context("Failed to flush CSV output")?;
        String::from_utf8(bytes).context("CSV output is not valid UTF-8")
    }
}
