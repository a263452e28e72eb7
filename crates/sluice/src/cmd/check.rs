//! Check command - Validate configuration and list pipelines

use anyhow::{Context, Result};
use clap::Args;
use sluice_config::Config;
use sluice_connectors::available_sinks;
use sluice_pipeline::{Invocation, Pipeline};
use sluice_transform::default_registry;

/// Check command arguments
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Also list registered stage and sink types
    #[arg(long)]
    pub types: bool,
}

/// Run the check command
pub fn run(args: CheckArgs, config: Config) -> Result<()> {
    let registry = default_registry();
    let invocation =
        Invocation::from_config(&config, &registry).context("failed to build pipelines")?;

    let pipelines = invocation.assembler().pipelines();
    println!("{} pipeline(s)", pipelines.len());
    for pipeline in pipelines.iter() {
        println!("  {}", describe(pipeline));
    }

    if args.types {
        let mut stages = registry.available_types();
        stages.sort_unstable();
        println!("stage types: {}", stages.join(", "));
        println!("sink types: {}", available_sinks().join(", "));
    }

    Ok(())
}

/// One-line summary: id, parallelism, steps and sink batch size
fn describe(pipeline: &Pipeline) -> String {
    let steps = pipeline.step_names();
    let steps = if steps.is_empty() {
        "(no steps)".to_string()
    } else {
        steps.join(" -> ")
    };

    match pipeline.sink() {
        Some(sink) => format!(
            "{} [parallelism {}] {} (batches of {})",
            pipeline.id(),
            pipeline.parallelism(),
            steps,
            sink.batch_size()
        ),
        None => format!(
            "{} [parallelism {}] {}",
            pipeline.id(),
            pipeline.parallelism(),
            steps
        ),
    }
}
