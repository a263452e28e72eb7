//! Run command - Process one batch through the configured pipelines
//!
//! Reads NDJSON records, runs them as a single invocation and prints the
//! aggregated metrics document to stdout. Failed records are logged; with
//! `--strict` they also fail the command.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use sluice_config::{Config, MetricsConfig, MetricsFormat};
use sluice_metrics::{EmfFormatter, HumanFormatter, JsonFormatter, MetricsFormatter};
use sluice_pipeline::{Invocation, InvocationReport};
use sluice_protocol::{StageResult, UnitOfWork, decode_ndjson};
use sluice_transform::default_registry;

/// Metrics document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Emf,
    Json,
    Human,
}

impl From<FormatArg> for MetricsFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Emf => Self::Emf,
            FormatArg::Json => Self::Json,
            FormatArg::Human => Self::Human,
        }
    }
}

/// Run command arguments
#[derive(Args, Debug)]
pub struct RunArgs {
    /// NDJSON input file; stdin when omitted or "-"
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Batch publish time as epoch milliseconds or RFC 3339 (default: now)
    #[arg(long, value_name = "TIME")]
    pub publish_time: Option<String>,

    /// Metrics format, overriding `[metrics] format`
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Print every finished unit of work as a JSON line before the metrics
    #[arg(long)]
    pub print_results: bool,

    /// Exit with an error if any record failed
    #[arg(long)]
    pub strict: bool,
}

/// Run the run command
pub async fn run(args: RunArgs, config: Config) -> Result<()> {
    let publish_time = match args.publish_time.as_deref() {
        Some(value) => parse_publish_time(value)?,
        None => Utc::now().timestamp_millis(),
    };

    let uows = read_input(args.input.as_deref())?;
    let invocation =
        Invocation::from_config(&config, &default_registry()).context("failed to build pipelines")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        records = uows.len(),
        pipelines = invocation.assembler().pipelines().len(),
        publish_time,
        "processing batch"
    );

    let report = invocation.run(publish_time, uows).await;

    if args.print_results {
        for result in report.results() {
            println!("{}", result_json(result));
        }
    }

    log_failures(&report);

    if config.metrics.enabled {
        let format = args.format.map_or(config.metrics.format, Into::into);
        println!("{}", formatter(format, &config.metrics).format(&report.metrics));
    }

    let failed = report.failed_records().len();
    info!(
        results = report.results().len(),
        faults = report.fault_count(),
        unmatched = report.unmatched(),
        failed_records = failed,
        "batch complete"
    );

    if args.strict && failed > 0 {
        anyhow::bail!("{} record(s) failed", failed);
    }
    Ok(())
}

/// Parse `--publish-time` as epoch millis or an RFC 3339 timestamp
fn parse_publish_time(value: &str) -> Result<i64> {
    if let Ok(millis) = value.parse::<i64>() {
        return Ok(millis);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.timestamp_millis())
        .with_context(|| format!("invalid publish time '{}'", value))
}

/// Decode the whole input before processing starts
fn read_input(input: Option<&Path>) -> Result<Vec<UnitOfWork>> {
    match input {
        None => decode_ndjson(io::stdin().lock()).context("failed to decode stdin"),
        Some(path) if path == Path::new("-") => {
            decode_ndjson(io::stdin().lock()).context("failed to decode stdin")
        }
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            decode_ndjson(BufReader::new(file))
                .with_context(|| format!("failed to decode {}", path.display()))
        }
    }
}

fn formatter(format: MetricsFormat, config: &MetricsConfig) -> Box<dyn MetricsFormatter> {
    match format {
        MetricsFormat::Emf => Box::new(EmfFormatter::new(
            config.namespace.clone(),
            config.function_name.clone(),
        )),
        MetricsFormat::Json => Box::new(JsonFormatter::new()),
        MetricsFormat::Human => Box::new(HumanFormatter::new()),
    }
}

fn log_failures(report: &InvocationReport) {
    for fault in report.output.all_faults() {
        debug!(
            pipeline = fault.uow.pipeline_name(),
            record = fault.uow.record.as_ref().map(|r| r.id.as_str()),
            error = %fault.error,
            "fault"
        );
    }
    for record in report.failed_records() {
        warn!(record = %record.id, sequence = record.sequence, "record failed");
    }
}

/// One output line per finished unit of work
fn result_json(result: &StageResult) -> Value {
    match result {
        Ok(uow) => json!({
            "pipeline": uow.pipeline_name(),
            "record": uow.record.as_ref().map(|r| r.id.as_str()),
            "event": uow.event,
            "attachments": uow.attachments,
        }),
        Err(fault) => json!({
            "pipeline": fault.uow.pipeline_name(),
            "record": fault.uow.record.as_ref().map(|r| r.id.as_str()),
            "error": fault.error.to_string(),
        }),
    }
}
