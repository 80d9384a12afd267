//! Benchmark CSV ingestion
//!
//! The benchmark harness writes one CSV per algorithm:
//!
//! ```text
//! n,table 1,table 2,table 3,average,backtrack 1,backtrack 2,backtrack 3,average
//! ```
//!
//! Each group of `"<prefix> <k>"` trial columns may be closed by an `average`
//! column (pandas re-exports them as `average.1`, `average.2`, ...). The
//! positional averages are resolved to the semantic metric of the group they
//! close, e.g. the third group of the memoized solver becomes `cache misses`.

use crate::suite::{Algorithm, BenchmarkSuite};
use crate::table::{Metric, MetricColumn, TrialRow, TrialTable};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Column layout of one metric group
#[derive(Debug, Clone, PartialEq)]
struct ColumnGroup {
    metric: Metric,
    trials: Vec<usize>,
    average: Option<usize>,
}

fn is_average_header(header: &str) -> bool {
    match header.strip_prefix("average") {
        Some("") => true,
        Some(suffix) => suffix
            .strip_prefix('.')
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

/// Split `"cache miss 2"` into `("cache miss", 2)`
fn split_trial_header(header: &str) -> Option<(&str, usize)> {
    let (prefix, index) = header.rsplit_once(' ')?;
    let index = index.parse().ok()?;
    Some((prefix.trim(), index))
}

/// Resolve the header row into the size column and metric groups
fn parse_layout(headers: &csv::StringRecord) -> Result<(usize, Vec<ColumnGroup>)> {
    let size_col = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("n"))
        .context("Missing problem size column 'n'")?;

    let mut groups: Vec<ColumnGroup> = Vec::new();
    let mut current: Option<ColumnGroup> = None;

    for (i, raw) in headers.iter().enumerate() {
        if i == size_col {
            continue;
        }
        let header = raw.trim().to_ascii_lowercase();

        if is_average_header(&header) {
            match current.take() {
                Some(mut group) => {
                    group.average = Some(i);
                    groups.push(group);
                }
                None => bail!(
                    "Column {} ('{}') is an average without preceding trial columns",
                    i + 1,
                    raw
                ),
            }
        } else if let Some((prefix, _)) = split_trial_header(&header) {
            let metric = Metric::from_column_prefix(prefix);
            match current.as_mut() {
                Some(group) if group.metric == metric => group.trials.push(i),
                _ => {
                    if let Some(group) = current.take() {
                        groups.push(group);
                    }
                    current = Some(ColumnGroup {
                        metric,
                        trials: vec![i],
                        average: None,
                    });
                }
            }
        } else {
            bail!("Unrecognized column {} ('{}')", i + 1, raw);
        }
    }
    if let Some(group) = current {
        groups.push(group);
    }

    if groups.is_empty() {
        bail!("No trial columns found");
    }
    for (i, group) in groups.iter().enumerate() {
        if groups[..i].iter().any(|g| g.metric == group.metric) {
            bail!("Metric '{}' appears in more than one column group", group.metric);
        }
    }

    Ok((size_col, groups))
}

fn parse_size(field: &str) -> Result<u64> {
    let field = field.trim();
    if let Ok(n) = field.parse::<u64>() {
        return Ok(n);
    }
    let value: f64 = field
        .parse()
        .with_context(|| format!("Invalid problem size '{}'", field))?;
    if value.fract() != 0.0 || value < 0.0 || !value.is_finite() {
        bail!("Problem size '{}' is not a non-negative integer", field);
    }
    Ok(value as u64)
}

fn parse_value(field: &str) -> Result<f64> {
    let value: f64 = field
        .trim()
        .parse()
        .with_context(|| format!("Invalid number '{}'", field))?;
    if !value.is_finite() {
        bail!("Non-finite value '{}'", field);
    }
    Ok(value)
}

fn cell<'r>(record: &'r csv::StringRecord, i: usize, source: &str, line: u64) -> Result<&'r str> {
    record
        .get(i)
        .with_context(|| format!("{}:{}: missing column {}", source, line, i + 1))
}

/// Read a trial table from CSV data
///
/// `source` names the data in error messages.
pub fn read_table<R: Read>(reader: R, source: &str) -> Result<TrialTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .with_context(|| format!("{}: failed to read header", source))?
        .clone();
    let (size_col, groups) =
        parse_layout(&headers).with_context(|| format!("{}: invalid header", source))?;

    let mut sizes = Vec::new();
    let mut rows: Vec<Vec<TrialRow>> = vec![Vec::new(); groups.len()];

    for record in csv_reader.records() {
        let record = record.with_context(|| format!("{}: malformed record", source))?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |i: usize| cell(&record, i, source, line);

        let n = parse_size(field(size_col)?).with_context(|| format!("{}:{}", source, line))?;
        sizes.push(n);

        for (group, out) in groups.iter().zip(rows.iter_mut()) {
            let trials = group
                .trials
                .iter()
                .map(|&i| parse_value(field(i)?))
                .collect::<Result<Vec<f64>>>()
                .with_context(|| format!("{}:{}: column group '{}'", source, line, group.metric))?;

            let row = match group.average {
                Some(i) => TrialRow {
                    trials,
                    average: parse_value(field(i)?)
                        .with_context(|| format!("{}:{}: '{}' average", source, line, group.metric))?,
                },
                None => TrialRow::from_trials(trials),
            };
            out.push(row);
        }
    }

    let metrics: BTreeMap<Metric, MetricColumn> = groups
        .into_iter()
        .zip(rows)
        .map(|(group, rows)| (group.metric, MetricColumn::new(rows)))
        .collect();

    let table = TrialTable::new(sizes, metrics).with_context(|| format!("{}: invalid table", source))?;
    tracing::debug!(
        source,
        rows = table.len(),
        metrics = table.metrics().count(),
        "loaded trial table"
    );
    Ok(table)
}

/// Load a trial table from a CSV file
pub fn load_table<P: AsRef<Path>>(path: P) -> Result<TrialTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    read_table(file, &path.display().to_string())
}

/// Load every algorithm's CSV found in `dir`
///
/// Missing files are skipped with a warning. Files that fail to parse are
/// skipped too and listed in [`BenchmarkSuite::skipped`]. A directory with no
/// loadable file is an error.
pub fn load_suite<P: AsRef<Path>>(dir: P) -> Result<BenchmarkSuite> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        bail!("Results directory {} does not exist", dir.display());
    }

    let mut suite = BenchmarkSuite::new();
    for algorithm in Algorithm::ALL {
        let path = dir.join(algorithm.file_name());
        if !path.exists() {
            tracing::warn!("Skipping {}: {} not found", algorithm, path.display());
            continue;
        }
        match load_table(&path) {
            Ok(table) => {
                tracing::info!("Loaded {} ({} sizes)", algorithm, table.len());
                suite.insert(algorithm, table);
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                tracing::warn!("Skipping {}: {}", algorithm, reason);
                suite.skip(algorithm, reason);
            }
        }
    }

    if suite.is_empty() && !suite.skipped().is_empty() {
        let reasons: Vec<&str> = suite.skipped().iter().map(|s| s.reason.as_str()).collect();
        bail!(
            "No loadable benchmark CSV files in {}: {}",
            dir.display(),
            reasons.join("; ")
        );
    }
    if suite.is_empty() {
        bail!(
            "No benchmark CSV files found in {} (expected e.g. {})",
            dir.display(),
            Algorithm::BottomUp.file_name()
        );
    }

    Ok(suite)
}
