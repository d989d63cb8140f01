//! `mailsift` - extract, deduplicate and classify email addresses from files.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod export;
mod report;
mod staging;

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use mailsift_core::{EngineConfig, Event, SourceOutcome, SourceTicket, spawn_engine};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use export::ExportFilter;
use report::RunReport;
use staging::SkippedSource;

/// Extract, deduplicate and classify email addresses.
///
/// `.csv` and `.tsv` files are read as tables with a header row; anything
/// else is scanned as free text. Files are processed in the order given and
/// share one dedup session.
#[derive(Debug, Parser)]
#[command(name = "mailsift", version, about)]
struct Cli {
    /// Input files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Column holding addresses in tabular files. Detected from the header
    /// row when omitted.
    #[arg(short, long)]
    column: Option<String>,

    /// Engine configuration file (JSON).
    #[arg(long, env = "MAILSIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a CSV export of the records selected by `--only`.
    #[arg(long)]
    export: Option<PathBuf>,

    /// Subset written by `--export`.
    #[arg(long, value_enum, default_value_t = ExportFilter::All, requires = "export")]
    only: ExportFilter,

    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "mailsift=debug,mailsift_core=debug"
    } else {
        "mailsift=info,mailsift_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = load_config(cli.config.as_deref()).await?;
    info!(inputs = cli.inputs.len(), "Starting mailsift");

    let (mut handle, mut events) = spawn_engine(config).context("starting engine")?;
    handle.reset()?;

    let mut skipped = Vec::new();
    let mut tickets = Vec::new();
    for path in &cli.inputs {
        match staging::stage(path, cli.column.as_deref()) {
            Ok(source) => tickets.push(handle.ingest(source)?),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping source");
                skipped.push(SkippedSource {
                    path: path.display().to_string(),
                    reason: format!("{e:#}"),
                });
            }
        }
    }
    handle.finalize()?;

    let interrupt = tokio::spawn(cancel_on_interrupt(tickets));

    let mut outcomes: Vec<SourceOutcome> = Vec::new();
    let snapshot = events
        .result(|event| match event {
            Event::SourceFinished(outcome) => outcomes.push(outcome.clone()),
            Event::Progress { id, rows } => debug!(source = %id, rows, "Progress"),
            _ => {}
        })
        .await
        .context("collecting result")?;

    interrupt.abort();
    handle.shutdown().await?;

    let report = RunReport {
        sources: &outcomes,
        skipped: &skipped,
        result: &snapshot,
    };
    report.log_summary();

    match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            report.write_json(BufWriter::new(file))?;
            info!(path = %path.display(), "Report written");
        }
        None => report.write_json(io::stdout().lock())?,
    }

    if let Some(path) = &cli.export {
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let rows = export::write_csv(&snapshot, cli.only, BufWriter::new(file))?;
        info!(path = %path.display(), rows, filter = ?cli.only, "Export written");
    }

    Ok(())
}

/// Cancels every staged source on Ctrl-C. Rows already ingested are kept.
async fn cancel_on_interrupt(tickets: Vec<SourceTicket>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupted, cancelling remaining sources");
        for ticket in &tickets {
            ticket.cancel();
        }
    }
}

/// Loads engine configuration.
///
/// An explicit path must exist. Otherwise the user config file is used when
/// present, and built-in defaults when not.
async fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = explicit {
        return EngineConfig::load(path)
            .await
            .with_context(|| format!("loading config from {}", path.display()));
    }

    let path = default_config_path();
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(EngineConfig::default());
    }

    EngineConfig::load(&path)
        .await
        .with_context(|| format!("loading config from {}", path.display()))
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailsift")
        .join("config.json")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_config_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"chunk_size": 10}"#).unwrap();

        let config = load_config(Some(path.as_path())).await.unwrap();
        assert_eq!(config.chunk_size, 10);
    }

    #[tokio::test]
    async fn test_load_config_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(dir.path().join("absent.json").as_path())).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("mailsift/config.json"));
    }

    #[test]
    fn test_cli_parses_export_filter() {
        let cli = Cli::try_parse_from([
            "mailsift",
            "a.csv",
            "notes.txt",
            "--export",
            "out.csv",
            "--only",
            "role-based",
        ])
        .unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.only, ExportFilter::RoleBased);
        assert!(Cli::try_parse_from(["mailsift", "a.csv", "--only", "personal"]).is_err());
    }
}
