//! Node and edge schema rules: allowlisted keys, integration methods,
//! approval blocks and integration-window day names.

use serde_json::{Map, Value};

use crate::error::{Diagnostic, StructuralError};
use crate::names::{check_integration_method, NameTable};
use crate::parse::{is_truthy, CommonOptions, EdgeProperties, EDGE_OPTION_FIELDS, NODE_OPTION_FIELDS};

use super::branches::BranchEntry;

pub const DAYS_OF_THE_WEEK: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Check every branch against the node schema, normalizing its common options.
///
/// Keys and day tokens are checked on the object as written, so a branch
/// that only partly projected is held to the same schema.
pub fn validate_nodes(
    entries: &mut [BranchEntry],
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<(), StructuralError> {
    for entry in entries.iter_mut() {
        if let Some(key) = entry
            .raw
            .keys()
            .find(|k| !NODE_OPTION_FIELDS.contains(k.as_str()))
        {
            return Err(StructuralError::UnknownNodeProperty {
                key: key.clone(),
                node: entry.options.name.clone(),
            });
        }
        check_window_days(&entry.raw)?;

        let method = entry
            .raw
            .get("integrationMethod")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty());
        if let Some(method) = method {
            check_integration_method(method, &entry.options.name, diagnostics);
        }

        entry.options.common = normalize_common_options(&entry.options.common)?;
    }
    Ok(())
}

/// Check and project every edge object.
///
/// Unknown endpoints and badly typed values are diagnostics; unknown keys,
/// missing endpoints and incomplete approval blocks are structural.
pub fn validate_edges(
    raw_edges: &[Value],
    names: &NameTable,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Vec<EdgeProperties>, StructuralError> {
    let mut edges = Vec::with_capacity(raw_edges.len());

    for raw in raw_edges {
        let object = raw
            .as_object()
            .ok_or_else(|| StructuralError::MalformedEdge(raw.to_string()))?;
        let endpoint = |key: &str| object.get(key).and_then(Value::as_str);
        let (Some(from), Some(to)) = (endpoint("from"), endpoint("to")) else {
            return Err(StructuralError::MalformedEdge(raw.to_string()));
        };

        if !names.contains(from) {
            diagnostics.push(Diagnostic::schema(
                "E001",
                format!("Unrecognised source node in edge property {}", from),
                None,
            ));
        }
        if !names.contains(to) {
            diagnostics.push(Diagnostic::schema(
                "E001",
                format!("Unrecognised target node in edge property {}", to),
                None,
            ));
        }

        if let Some(key) = object
            .keys()
            .find(|k| *k != "from" && *k != "to" && !EDGE_OPTION_FIELDS.contains(k.as_str()))
        {
            return Err(StructuralError::UnknownEdgeProperty {
                key: key.clone(),
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        if let Some(approval) = object.get("approval").filter(|a| is_truthy(a)) {
            let filled = |key: &str| {
                approval
                    .get(key)
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.is_empty())
            };
            if !filled("description") || !filled("channelId") {
                return Err(StructuralError::InvalidApproval {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        check_window_days(object)?;

        match serde_json::from_value::<EdgeProperties>(raw.clone()) {
            Ok(mut edge) => {
                edge.common = normalize_common_options(&edge.common)?;
                edges.push(edge);
            }
            Err(e) => diagnostics.push(Diagnostic::schema(
                "E002",
                format!("Unable to parse edge {}->{}: {}", from, to, e),
                None,
            )),
        }
    }

    Ok(edges)
}

/// Return a copy of `options` with every integration-window day name in
/// lower-case three-letter form.
pub fn normalize_common_options(options: &CommonOptions) -> Result<CommonOptions, StructuralError> {
    let mut normalized = options.clone();
    for pane in normalized.integration_window.iter_mut().flatten() {
        if let Some(days) = &pane.days_of_the_week {
            pane.days_of_the_week = Some(
                days.iter()
                    .map(|d| normalize_day(d).map(str::to_string))
                    .collect::<Result<_, _>>()?,
            );
        }
    }
    Ok(normalized)
}

/// Every `integrationWindow[].daysOfTheWeek[]` token must name a day.
fn check_window_days(object: &Map<String, Value>) -> Result<(), StructuralError> {
    let panes = object.get("integrationWindow").and_then(Value::as_array);
    for pane in panes.into_iter().flatten() {
        let days = pane.get("daysOfTheWeek").and_then(Value::as_array);
        for day in days.into_iter().flatten() {
            match day.as_str() {
                Some(day) => {
                    normalize_day(day)?;
                }
                None => return Err(StructuralError::UnknownDay(day.to_string())),
            }
        }
    }
    Ok(())
}

/// `"Monday"`, `"MON"` and `"mon"` all become `"mon"`.
pub fn normalize_day(day: &str) -> Result<&'static str, StructuralError> {
    let prefix: String = day.chars().take(3).collect::<String>().to_lowercase();
    DAYS_OF_THE_WEEK
        .into_iter()
        .find(|d| *d == prefix)
        .ok_or_else(|| StructuralError::UnknownDay(day.to_string()))
}
