//! The directed view built from a validated definition.

#[allow(dead_code)]
mod helpers;

use branchgraph::BranchGraph;
use helpers::*;
use serde::Serialize;

#[derive(Serialize)]
struct Flow {
    from: String,
    to: String,
    forced: bool,
    edge: Option<usize>,
}

#[test]
fn flows_resolve_through_aliases() {
    let result = preview(RELEASE_GRAPH);
    let graph = BranchGraph::build(result.graph().unwrap());

    assert_eq!(graph.branch_count(), 3);
    assert_eq!(graph.flow_count(), 4);
    assert_eq!(graph.successors("trunk"), vec!["DEV-FEATURE", "RELEASE-5.1"]);
    assert_eq!(graph.predecessors("Main"), vec!["DEV-FEATURE", "RELEASE-5.1"]);
    assert!(graph.flows_to("dev-feature", "TRUNK"));
    assert!(!graph.flows_to("Dev-Feature", "Release-5.1"));
    assert!(graph.successors("Legacy").is_empty());
}

#[test]
fn forced_flows_are_labelled() {
    let result = preview(RELEASE_GRAPH);
    let graph = BranchGraph::build(result.graph().unwrap());

    assert_eq!(graph.force_flows_to("rel-5.1"), vec!["MAIN"]);
    assert!(graph.force_flows_to("Main").is_empty());
}

#[test]
fn edge_properties_found_by_alias() {
    let result = preview(RELEASE_GRAPH);
    let definition = result.graph().unwrap();
    let graph = BranchGraph::build(definition);

    let edge = graph
        .edge_properties(definition, "rel-5.1", "trunk")
        .expect("release edge is declared");
    assert_eq!(edge.from, "Release-5.1");
    let approval = edge.approval.as_ref().unwrap();
    assert_eq!(approval.channel_id, "C0RELEASE");
    assert!(approval.block);

    assert!(graph.edge_properties(definition, "Main", "Release-5.1").is_none());
}

#[test]
fn round_trips_are_reported_as_cycles() {
    let result = preview(RELEASE_GRAPH);
    let graph = BranchGraph::build(result.graph().unwrap());
    assert_eq!(
        graph.flow_cycles(),
        vec![vec!["DEV-FEATURE", "MAIN", "RELEASE-5.1"]]
    );
}

#[test]
fn one_way_graph_has_no_cycles() {
    let result = preview(
        r#"{ defaultStreamDepot: "Game",
             branches: [{ name: "Main" }, { name: "Release", flowsTo: ["Main"] }] }"#,
    );
    let graph = BranchGraph::build(result.graph().unwrap());
    assert!(graph.flow_cycles().is_empty());
    assert_eq!(graph.predecessors("main"), vec!["RELEASE"]);
}

#[test]
fn flow_labels_snapshot() {
    let result = preview(RELEASE_GRAPH);
    let graph = BranchGraph::build(result.graph().unwrap());

    let mut flows: Vec<Flow> = graph
        .graph
        .edge_indices()
        .filter_map(|e| {
            let (source, target) = graph.graph.edge_endpoints(e)?;
            let label = &graph.graph[e];
            Some(Flow {
                from: graph.graph[source].clone(),
                to: graph.graph[target].clone(),
                forced: label.forced,
                edge: label.edge,
            })
        })
        .collect();
    flows.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));

    insta::assert_json_snapshot!("flow_labels", flows);
}
