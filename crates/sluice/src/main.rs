//! Sluice - Rule-driven batch pipelines
//!
//! # Usage
//!
//! ```bash
//! # Process one NDJSON batch and print its metrics document
//! sluice run --config sluice.toml --input batch.ndjson
//! cat batch.ndjson | sluice run -c sluice.toml
//!
//! # Validate a configuration and list its pipelines
//! sluice check --config sluice.toml
//! ```

mod cmd;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sluice_config::{LogConfig, LogFormat, LogOutput};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Sluice - Rule-driven batch pipelines
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (error if specified but not found)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level or filter directive. Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process one batch of NDJSON records
    Run(cmd::run::RunArgs),

    /// Validate configuration and list pipelines
    Check(cmd::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cmd::load_config(cli.config.as_deref())?;
    init_logging(&config.log, cli.log_level.as_deref())?;

    match cli.command {
        Command::Run(args) => cmd::run::run(args, config).await,
        Command::Check(args) => cmd::check::run(args, config),
    }
}

/// Initialize the tracing subscriber from `[log]`
///
/// `level` replaces the configured level and directives when given.
fn init_logging(log: &LogConfig, level: Option<&str>) -> Result<()> {
    let directive = level.map_or_else(|| log.filter_directive(), str::to_string);
    let filter = EnvFilter::try_new(&directive)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let writer = match log.output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
    };
    let layer = match log.format {
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_writer(writer)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_writer(writer)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    Ok(())
}
