//! Pulsewatch command-line front end.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pulsewatch::config::PulsewatchConfig;
use pulsewatch::patterns::ErrorEvent;
use pulsewatch::{AnalysisEngine, Sample};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "pulsewatch")]
#[command(author, version, about = "Time-series anomaly detection and error-pattern correlation")]
struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, env = "PULSEWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PULSEWATCH_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect anomalies, trends, seasonality and correlations in metric streams
    Metrics {
        /// JSON object mapping metric names to arrays of samples
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Group error events into patterns and cluster similar patterns
    Errors {
        /// JSON array of error events
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Predict when error patterns will recur
    Predict {
        /// JSON array of error events
        #[arg(short, long)]
        input: PathBuf,

        /// Pattern key or raw message; every pattern is predicted when omitted
        #[arg(short, long)]
        pattern: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PulsewatchConfig::from_file(path)?,
        None => PulsewatchConfig::default(),
    };

    // Command-line flags win over the file
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }

    pulsewatch::observability::init(&config.observability)?;

    let engine = AnalysisEngine::new(config.analysis)?;

    match cli.command {
        Commands::Metrics { input } => {
            let streams: BTreeMap<String, Vec<Sample>> = read_json(&input)?;
            info!(path = %input.display(), streams = streams.len(), "Loaded metric streams");
            print_json(&engine.analyze_metrics(&streams)?)?;
        }
        Commands::Errors { input } => {
            let events: Vec<ErrorEvent> = read_json(&input)?;
            info!(path = %input.display(), events = events.len(), "Loaded error events");
            print_json(&engine.analyze_error_patterns(&events))?;
        }
        Commands::Predict { input, pattern } => {
            let events: Vec<ErrorEvent> = read_json(&input)?;
            info!(path = %input.display(), events = events.len(), "Loaded error events");
            match pattern {
                Some(pattern) => print_json(&engine.predict_recurrence(&events, &pattern))?,
                None => print_json(&engine.predict_all(&events))?,
            }
        }
    }

    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
