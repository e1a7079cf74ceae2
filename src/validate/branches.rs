//! Branch table: project raw branch objects, register names, locate streams.

use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::BotConfig;
use crate::error::Diagnostic;
use crate::names::{check_name, NameTable};
use crate::parse::NodeOptions;
use crate::stream::{calculate_stream, StreamChecker};

/// A named branch, typed as far as its fields allow, plus the object as
/// written for the schema checks.
#[derive(Debug, Clone)]
pub struct BranchEntry {
    pub options: NodeOptions,
    pub raw: Map<String, Value>,
}

impl BranchEntry {
    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn upper_name(&self) -> String {
        self.options.name.to_uppercase()
    }
}

/// A synthesized stream still to be looked up on the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingStream {
    pub branch: String,
    pub stream: String,
}

#[derive(Debug, Default)]
pub struct BranchTable {
    pub entries: Vec<BranchEntry>,
    pub pending_streams: Vec<PendingStream>,
}

/// Build the branch table in document order.
///
/// Unnamed entries are reported and dropped. A named entry with a badly
/// typed field is reported and kept with its well-typed fields, so it still
/// claims its name. Entries with a bad or duplicate name are reported and
/// kept, but only the first valid claim on a name is registered.
pub fn build_branch_table(
    raw_branches: &[Value],
    config: &BotConfig,
    names: &mut NameTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> BranchTable {
    let mut table = BranchTable::default();

    for raw in raw_branches {
        let Some(entry) = project_branch(raw, diagnostics) else {
            continue;
        };

        let name = entry.name().to_string();
        if let Err(e) = check_name(&name) {
            diagnostics.push(Diagnostic::branch("B002", e.to_string(), Some(&name)));
            table.entries.push(entry);
            continue;
        }

        if !names.register_branch(&name) {
            diagnostics.push(Diagnostic::branch(
                "B003",
                format!("Duplicate branch name '{}'", name.to_uppercase()),
                Some(&name),
            ));
        }

        let options = &entry.options;
        let depot = options
            .stream_depot
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(config.default_stream_depot.as_deref());
        let stream_name = options
            .stream_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&name);

        match calculate_stream(
            stream_name,
            options.root_path.as_deref(),
            depot,
            options.stream_subpath.as_deref(),
        ) {
            Ok(result) => {
                if let Some(stream) = result.stream {
                    table.pending_streams.push(PendingStream {
                        branch: name.clone(),
                        stream,
                    });
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::branch("B004", e.to_string(), Some(&name)));
            }
        }
        table.entries.push(entry);
    }

    debug!(
        branches = table.entries.len(),
        pending_streams = table.pending_streams.len(),
        "branch table built"
    );
    table
}

fn project_branch(raw: &Value, diagnostics: &mut Vec<Diagnostic>) -> Option<BranchEntry> {
    let name = raw
        .as_object()
        .and_then(|o| o.get("name"))
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty());
    let (Some(object), Some(name)) = (raw.as_object(), name) else {
        diagnostics.push(Diagnostic::branch(
            "B001",
            format!("Unable to parse branch definition: {}", raw),
            None,
        ));
        return None;
    };

    let options = match serde_json::from_value::<NodeOptions>(raw.clone()) {
        Ok(options) => options,
        Err(e) => {
            diagnostics.push(Diagnostic::branch(
                "B001",
                format!("Unable to parse branch definition for '{}': {}", name, e),
                Some(name),
            ));
            salvage_branch(name, object)
        }
    };
    Some(BranchEntry {
        options,
        raw: object.clone(),
    })
}

/// Project only the fields that are well typed on their own.
fn salvage_branch(name: &str, object: &Map<String, Value>) -> NodeOptions {
    let fits = |key: &String, value: &Value| {
        let single = Map::from_iter([(key.clone(), value.clone())]);
        serde_json::from_value::<NodeOptions>(Value::Object(single)).is_ok()
    };
    let usable: Map<String, Value> = object
        .iter()
        .filter(|&(key, value)| fits(key, value))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let mut options: NodeOptions = serde_json::from_value(Value::Object(usable)).unwrap_or_default();
    options.name = name.to_string();
    options
}

/// Ask the server about every pending stream.
///
/// Lookups run concurrently; diagnostics are appended in table order.
pub async fn check_streams(
    checker: &dyn StreamChecker,
    pending: &[PendingStream],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let lookups = pending.iter().map(|p| checker.exists(&p.stream));
    let results = join_all(lookups).await;

    for (p, result) in pending.iter().zip(results) {
        match result {
            Ok(true) => {}
            Ok(false) => diagnostics.push(Diagnostic::branch(
                "B005",
                format!("Stream {} not found", p.stream),
                Some(&p.branch),
            )),
            Err(e) => diagnostics.push(Diagnostic::branch(
                "B006",
                format!("Unable to query stream {}: {}", p.stream, e),
                Some(&p.branch),
            )),
        }
    }
}
