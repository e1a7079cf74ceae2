//! `branchgraph`: validate a branch-graph document from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use branchgraph::{parse_and_validate, BranchGraph, StaticStreamChecker};

#[derive(Debug, Parser)]
#[command(name = "branchgraph", version, about = "Validate a branch-graph configuration document")]
struct Cli {
    /// Branch-graph document (JSON, comments and trailing commas allowed)
    file: PathBuf,

    /// Skip stream existence checks
    #[arg(long)]
    preview: bool,

    /// Known stream paths, one per line; without it validation always previews
    #[arg(long, value_name = "FILE")]
    streams: Option<PathBuf>,

    /// Print the validated graph, or the failure report, as JSON
    #[arg(long)]
    json: bool,

    /// Log every validation phase
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;

    let checker = match &cli.streams {
        Some(path) => StaticStreamChecker::from_listing(
            &std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => StaticStreamChecker::default(),
    };
    let previewing = cli.preview || cli.streams.is_none();
    debug!(known_streams = checker.len(), previewing, "validating {}", cli.file.display());

    let result = futures::executor::block_on(parse_and_validate(&checker, &text, previewing));

    if let Some(report) = result.failure_report().filter(|_| cli.json) {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(ExitCode::FAILURE);
    }

    let Some(definition) = result.graph() else {
        for message in result.diagnostics() {
            eprintln!("error: {}", message);
        }
        return Ok(ExitCode::FAILURE);
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(definition)?);
        return Ok(ExitCode::SUCCESS);
    }

    let graph = BranchGraph::build(definition);
    println!(
        "{}: {} branches, {} flows, {} edge overrides, {} branchspecs",
        cli.file.display(),
        graph.branch_count(),
        graph.flow_count(),
        definition.edges.as_ref().map_or(0, Vec::len),
        definition.branchspecs.as_ref().map_or(0, Vec::len),
    );
    for cycle in graph.flow_cycles() {
        println!("note: round-trip flow between {}", cycle.join(", "));
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
