//! Stream existence checks against the version-control collaborator.

#[allow(dead_code)]
mod helpers;

use branchgraph::{parse_and_validate, StaticStreamChecker};
use helpers::*;

const DOCUMENT: &str = r#"{
    defaultStreamDepot: "Game",
    branches: [
        { name: "Main" },
        { name: "Release", streamName: "Rel-5.1", flowsTo: ["Main"] },
        { name: "Engine", streamDepot: "Tech", streamSubpath: "/Engine/..." },
        { name: "Legacy", rootPath: "//Archive/Legacy/..." },
    ],
}"#;

#[tokio::test]
async fn every_synthesized_stream_is_checked() {
    let checker = RecordingStreamChecker::new();
    let result = parse_and_validate(&checker, DOCUMENT, false).await;
    assert_valid(&result);
    // explicit root paths have no stream to look up
    assert_eq!(
        checker.queried(),
        vec!["//Game/Main", "//Game/Rel-5.1", "//Tech/Engine"]
    );
}

#[tokio::test]
async fn preview_skips_the_server() {
    let checker = RecordingStreamChecker::new().with_missing("//Game/Main");
    let result = parse_and_validate(&checker, DOCUMENT, true).await;
    assert_valid(&result);
    assert!(checker.queried().is_empty());
}

#[tokio::test]
async fn missing_stream_is_a_diagnostic() {
    let checker = RecordingStreamChecker::new()
        .with_missing("//Game/Rel-5.1")
        .with_missing("//Tech/Engine");
    let result = parse_and_validate(&checker, DOCUMENT, false).await;
    assert!(result.graph().is_none());
    assert_eq!(
        result.diagnostics(),
        vec!["Stream //Game/Rel-5.1 not found", "Stream //Tech/Engine not found"]
    );
    // the rest of validation still ran with the document's config
    assert_eq!(result.config.default_stream_depot.as_deref(), Some("Game"));
}

#[tokio::test]
async fn lookup_failure_is_a_diagnostic() {
    let checker = RecordingStreamChecker::new().with_broken("//Game/Main");
    let result = parse_and_validate(&checker, DOCUMENT, false).await;
    assert_eq!(
        result.diagnostics(),
        vec!["Unable to query stream //Game/Main: connection refused"]
    );
}

#[tokio::test]
async fn invalid_names_are_not_looked_up() {
    let checker = RecordingStreamChecker::new();
    let text = r#"{ defaultStreamDepot: "Game", branches: [{ name: "NONE" }, { name: "Main" }] }"#;
    let result = parse_and_validate(&checker, text, false).await;
    assert_has_diagnostic(&result, "reserved branch name");
    assert_eq!(checker.queried(), vec!["//Game/Main"]);
}

#[tokio::test]
async fn static_checker_from_listing() {
    let checker = StaticStreamChecker::from_listing(
        "# known streams\n//Game/Main\n//Game/Rel-5.1\n",
    );
    let result = parse_and_validate(&checker, DOCUMENT, false).await;
    assert_eq!(result.diagnostics(), vec!["Stream //Tech/Engine not found"]);
}
