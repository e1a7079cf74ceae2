//! Flow consistency: every flow target resolves, force-flow ⊆ flow.

use std::collections::HashSet;

use crate::error::Diagnostic;
use crate::names::NameTable;
use crate::parse::{is_truthy, FlowTargets};

use super::branches::BranchEntry;

pub fn validate_flows(entries: &[BranchEntry], names: &NameTable, diagnostics: &mut Vec<Diagnostic>) {
    for entry in entries {
        let name = entry.name();
        let mut flows_to = HashSet::new();

        match &entry.options.flows_to {
            None => {}
            Some(FlowTargets::Malformed(value)) if !is_truthy(value) => {}
            Some(FlowTargets::Malformed(_)) => diagnostics.push(Diagnostic::flow(
                "F001",
                format!("'{}'.flowsTo is not an array", name),
                name,
            )),
            Some(FlowTargets::List(targets)) => {
                for to in targets {
                    match names.resolve(to) {
                        Some(branch) => {
                            flows_to.insert(branch);
                        }
                        None => diagnostics.push(Diagnostic::flow(
                            "F002",
                            format!("'{}' flows to unknown branch/alias '{}'", name, to),
                            name,
                        )),
                    }
                }
            }
        }

        match &entry.options.force_flow_to {
            None => {}
            Some(FlowTargets::Malformed(value)) if !is_truthy(value) => {}
            Some(FlowTargets::Malformed(_)) => diagnostics.push(Diagnostic::flow(
                "F003",
                format!("'{}'.forceFlowTo is not an array", name),
                name,
            )),
            Some(FlowTargets::List(targets)) => {
                for to in targets {
                    match names.resolve(to) {
                        None => diagnostics.push(Diagnostic::flow(
                            "F004",
                            format!("'{}' force flows to unknown branch/alias '{}'", name, to),
                            name,
                        )),
                        Some(branch) if !flows_to.contains(branch) => {
                            diagnostics.push(Diagnostic::flow(
                                "F005",
                                format!("'{}' force flows but does not flow to '{}'", name, to),
                                name,
                            ))
                        }
                        Some(_) => {}
                    }
                }
            }
        }
    }
}
