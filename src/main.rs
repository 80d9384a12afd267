use anyhow::{Context, Result};
use clap::Parser;
use knapstat::cli::{Cli, OutputFormat};
use knapstat::config::AnalysisConfig;
use knapstat::csv_output::CsvOutput;
use knapstat::ingest::load_suite;
use knapstat::json_output::JsonOutput;
use knapstat::report::analyze_suite;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Base configuration: the config file when given, defaults otherwise
fn load_config(args: &Cli) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };

    let config = args.apply_overrides(base);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = load_config(&args)?;
    let suite = load_suite(&args.results_dir)?;
    tracing::info!(tables = suite.len(), "benchmark suite loaded");

    let report = analyze_suite(&suite, &config)?;

    let rendered = match args.format {
        OutputFormat::Text => report.to_report_string(),
        OutputFormat::Json => JsonOutput::from_report(&report).to_json()?,
        OutputFormat::Csv => CsvOutput::from_report(&report).to_csv()?,
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }

    Ok(())
}
