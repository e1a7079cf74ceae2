//! Orchestrator: document text → validated branch graph.
//!
//! Runs the phases in a fixed order against one diagnostics list. A
//! structural error stops everything and yields the default bot config; any
//! diagnostic withholds the graph but keeps the config that was built.

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{extract_bot_config, BotConfig};
use crate::error::{Diagnostic, StructuralError};
use crate::names::NameTable;
use crate::parse::{optional_array, parse_document, BranchGraphDefinition};
use crate::stream::{StaticStreamChecker, StreamChecker};
use crate::validate;

/// Why no graph was produced.
#[derive(Debug)]
pub enum Failure {
    Structural(StructuralError),
    Semantic(Vec<Diagnostic>),
}

/// Machine-readable account of a rejected document.
#[derive(Debug, Serialize)]
pub struct FailureReport<'a> {
    /// The aborting error's message, when the run aborted.
    pub structural: Option<String>,
    pub diagnostics: &'a [Diagnostic],
}

#[derive(Debug)]
pub struct ParseResult {
    pub config: BotConfig,
    pub outcome: Result<BranchGraphDefinition, Failure>,
}

impl ParseResult {
    pub fn graph(&self) -> Option<&BranchGraphDefinition> {
        self.outcome.as_ref().ok()
    }

    pub fn into_graph(self) -> Option<BranchGraphDefinition> {
        self.outcome.ok()
    }

    pub fn is_valid(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn structural_error(&self) -> Option<&StructuralError> {
        match &self.outcome {
            Err(Failure::Structural(e)) => Some(e),
            _ => None,
        }
    }

    /// The accumulated diagnostics; empty on success or a structural abort.
    pub fn semantic_diagnostics(&self) -> &[Diagnostic] {
        match &self.outcome {
            Err(Failure::Semantic(diagnostics)) => diagnostics.as_slice(),
            _ => &[],
        }
    }

    pub fn failure_report(&self) -> Option<FailureReport<'_>> {
        if self.is_valid() {
            return None;
        }
        Some(FailureReport {
            structural: self.structural_error().map(ToString::to_string),
            diagnostics: self.semantic_diagnostics(),
        })
    }

    /// Human-readable problems, in the order they were found. A structural
    /// failure contributes its single message.
    pub fn diagnostics(&self) -> Vec<String> {
        match &self.outcome {
            Ok(_) => vec![],
            Err(Failure::Structural(e)) => vec![e.to_string()],
            Err(Failure::Semantic(diagnostics)) => {
                diagnostics.iter().map(ToString::to_string).collect()
            }
        }
    }
}

/// Parse and validate a branch graph document.
///
/// Unless `previewing`, every synthesized stream path is checked through
/// `checker`.
pub async fn parse_and_validate(
    checker: &dyn StreamChecker,
    text: &str,
    previewing: bool,
) -> ParseResult {
    let mut diagnostics = Vec::new();

    match compile(checker, text, previewing, &mut diagnostics).await {
        Err(e) => {
            error!(error = %e, "branch graph rejected");
            ParseResult {
                config: BotConfig::default(),
                outcome: Err(Failure::Structural(e)),
            }
        }
        Ok((config, _)) if !diagnostics.is_empty() => {
            warn!(
                count = diagnostics.len(),
                diagnostics = ?diagnostics.iter().map(ToString::to_string).collect::<Vec<_>>(),
                "branch graph has errors"
            );
            ParseResult {
                config,
                outcome: Err(Failure::Semantic(diagnostics)),
            }
        }
        Ok((config, graph)) => {
            info!(
                branches = graph.branches.len(),
                edges = graph.edges.as_ref().map_or(0, Vec::len),
                branchspecs = graph.branchspecs.as_ref().map_or(0, Vec::len),
                "branch graph validated"
            );
            ParseResult {
                config,
                outcome: Ok(graph),
            }
        }
    }
}

/// Validate without contacting the version-control server.
pub fn parse_and_validate_preview(text: &str) -> ParseResult {
    futures::executor::block_on(parse_and_validate(&StaticStreamChecker::default(), text, true))
}

async fn compile(
    checker: &dyn StreamChecker,
    text: &str,
    previewing: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(BotConfig, BranchGraphDefinition), StructuralError> {
    // 1. Parse
    let document = parse_document(text)?;
    let raw_branches = optional_array(&document, "branches")?
        .map(Vec::as_slice)
        .unwrap_or_default();
    let raw_edges = optional_array(&document, "edges")?;
    let raw_specs = optional_array(&document, "branchspecs")?;

    // 2. Bot config
    let config = extract_bot_config(&document, diagnostics)?;

    // 3. Branch table + stream lookups
    let mut names = NameTable::new();
    let mut table = validate::build_branch_table(raw_branches, &config, &mut names, diagnostics);
    if previewing {
        debug!("previewing, stream existence checks skipped");
    } else {
        validate::check_streams(checker, &table.pending_streams, diagnostics).await;
    }

    // 4. Aliases
    validate::resolve_aliases(&table.entries, &config, &mut names, diagnostics);

    // 5. Node + edge schema
    validate::validate_nodes(&mut table.entries, diagnostics)?;
    let edges = raw_edges
        .map(|edges| validate::validate_edges(edges, &names, diagnostics))
        .transpose()?;

    // 6. Flow
    validate::validate_flows(&table.entries, &names, diagnostics);

    // 7. Branchspecs
    let branchspecs = raw_specs.map(|specs| validate::validate_branchspecs(specs, &names, diagnostics));

    debug!(names = names.len(), diagnostics = diagnostics.len(), "validation phases complete");

    let graph = BranchGraphDefinition {
        branches: table.entries.into_iter().map(|e| e.options).collect(),
        edges,
        branchspecs,
        names,
    };
    Ok((config, graph))
}
