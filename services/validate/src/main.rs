mod config;

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dataset::{ConsoleReporter, QualityAccumulator, TextExporter, Validator};

use crate::config::ValidateConfig;

const USAGE: &str = "Usage: validate <path_to_jsonl>";

/// Validate a conversational JSONL training file.
#[derive(Parser, Debug)]
#[command(name = "validate", version)]
struct Cli {
    /// JSONL file to validate
    path: Option<PathBuf>,

    /// Print a dataset quality report after the summary
    #[arg(long)]
    quality: bool,

    /// Write accepted records as `{"text": ...}` training lines to PATH
    #[arg(long, value_name = "PATH")]
    emit: Option<PathBuf>,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // stdout carries the report, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(path) = cli.path.as_deref() else {
        println!("{USAGE}");
        return ExitCode::FAILURE;
    };

    match run(&cli, path) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every non-blank line passed.
fn run(cli: &Cli, path: &Path) -> Result<bool> {
    let cfg = ValidateConfig::from_env()?;
    let validator = Validator::new(cfg.thresholds());

    let exporter = match &cli.emit {
        Some(out) => {
            if same_file(out, path) {
                bail!("--emit {} would overwrite the input file", out.display());
            }
            let f = File::create(out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            Some(TextExporter::new(BufWriter::new(f)))
        }
        None => None,
    };
    let quality = cli.quality.then(QualityAccumulator::new);

    let mut sink = (ConsoleReporter::stdout(), (quality, exporter));
    let summary = validator.validate_file(path, &mut sink)?;

    let (_, (quality, exporter)) = sink;
    if let Some(q) = quality {
        println!("\n{}", serde_json::to_string_pretty(&q.report())?);
    }
    if let (Some(ex), Some(out)) = (exporter, &cli.emit) {
        info!(written = ex.written(), path = %out.display(), "exported training text");
    }

    Ok(summary.is_success())
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
