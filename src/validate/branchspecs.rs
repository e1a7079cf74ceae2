//! Named branchspec overrides: shape and endpoint checks.

use serde_json::Value;

use crate::error::Diagnostic;
use crate::names::NameTable;
use crate::parse::BranchSpecDefinition;

const BRANCHSPEC_FIELDS: [&str; 3] = ["from", "to", "name"];

/// Validate raw branchspec entries, returning those that are well formed.
pub fn validate_branchspecs(
    raw_specs: &[Value],
    names: &NameTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<BranchSpecDefinition> {
    let mut specs = Vec::with_capacity(raw_specs.len());

    for raw in raw_specs {
        let Some(object) = raw.as_object() else {
            diagnostics.push(Diagnostic::branchspec(
                "S002",
                format!("Invalid branchspec entry: {}", raw),
            ));
            continue;
        };
        let errors_before = diagnostics.len();

        for (key, value) in object {
            if !BRANCHSPEC_FIELDS.contains(&key.as_str()) {
                diagnostics.push(Diagnostic::branchspec(
                    "S001",
                    format!("Unexpected branchspec property: {}", key),
                ));
            }
            if !value.is_string() {
                diagnostics.push(Diagnostic::branchspec(
                    "S001",
                    format!("Branchspec property {} is not a string", key),
                ));
            }
        }

        let field = |key: &str| object.get(key).and_then(Value::as_str);
        let name = field("name").unwrap_or("<unnamed>");
        let (from, to) = (field("from"), field("to"));

        if from.is_none_or(str::is_empty) || to.is_none_or(str::is_empty) {
            diagnostics.push(Diagnostic::branchspec(
                "S002",
                format!("Invalid branchspec {} (requires both to and from fields)", name),
            ));
        }

        if let Some(from) = from.filter(|f| !names.contains(f)) {
            diagnostics.push(Diagnostic::branchspec(
                "S003",
                format!("From-Branch {} not found in branchspec {}", from, name),
            ));
        }
        if let Some(to) = to.filter(|t| !names.contains(t)) {
            diagnostics.push(Diagnostic::branchspec(
                "S003",
                format!("To-Branch {} not found in branchspec {}", to, name),
            ));
        }

        if diagnostics.len() == errors_before {
            if let (Some(from), Some(to)) = (from, to) {
                specs.push(BranchSpecDefinition {
                    from: from.to_string(),
                    to: to.to_string(),
                    name: field("name").unwrap_or_default().to_string(),
                });
            }
        }
    }

    specs
}
