use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use sccscan::config::{ReportFormat, RunConfig};
use sccscan::{summarize, EdgeFile, SCCController, SCCReport};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Report the largest strongly connected components of a directed graph.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML config file; flags given on the command line override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Edge list file, one `u v` pair per line.
    #[arg(short, long)]
    edges: Option<PathBuf>,

    /// Number of vertices; ids run from 1 to this value.
    #[arg(short = 'n', long)]
    vertex_count: Option<u64>,

    /// Number of components to report [default: 5].
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Report format [default: text].
    #[arg(short, long, value_enum)]
    format: Option<ReportFormat>,

    /// Fail if the components do not partition the vertex set.
    #[arg(long)]
    verify: bool,

    /// Do not draw a progress bar while reading the edge file.
    #[arg(long)]
    no_progress: bool,
}

impl Args {
    fn overrides(&self) -> RunConfig {
        RunConfig {
            edges: self.edges.clone(),
            vertex_count: self.vertex_count,
            top_k: self.top_k,
            format: self.format,
            verify: self.verify.then_some(true),
            progress: self.no_progress.then_some(false),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Args = Args::parse();

    // Step 1: Layer the command line over the config file.
    let file_config = match &args.config {
        Some(path) => RunConfig::from_yaml_file(path)?,
        None => RunConfig::default(),
    };
    let run = file_config.merge(args.overrides()).resolve()?;

    // Step 2: Both Kosaraju passes, each reloading the edge file.
    let source = EdgeFile::new(&run.edges).with_progress(run.progress);
    let controller = SCCController::new(run.scc.clone());
    let start = Instant::now();
    let components = controller
        .find_components(&source)
        .with_context(|| format!("computing strongly connected components of {}", run.edges.display()))?;
    info!(elapsed_us = start.elapsed().as_micros() as u64, "SCC elapsed time");

    // Step 3: Select and print the largest components.
    let report = SCCReport::new(controller.top_k(&components, run.top_k), summarize(&components));
    match run.format {
        ReportFormat::Text => print!("{}", report.render_text()),
        ReportFormat::Yaml => print!("{}", report.render_yaml().context("serializing the report")?),
    }

    Ok(())
}
