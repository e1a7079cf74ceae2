use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use branchgraph::{parse_and_validate_preview, ParseResult, StreamCheckError, StreamChecker};

// =============================================================================
// Stream checkers
// =============================================================================

/// Records every stream it is asked about; streams in `missing` don't exist,
/// streams in `broken` fail the lookup.
#[derive(Default)]
pub struct RecordingStreamChecker {
    pub missing: HashSet<String>,
    pub broken: HashSet<String>,
    pub queried: Mutex<Vec<String>>,
}

impl RecordingStreamChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_missing(mut self, stream: &str) -> Self {
        self.missing.insert(stream.to_string());
        self
    }

    pub fn with_broken(mut self, stream: &str) -> Self {
        self.broken.insert(stream.to_string());
        self
    }

    pub fn queried(&self) -> Vec<String> {
        let mut queried = self.queried.lock().unwrap().clone();
        queried.sort();
        queried
    }
}

#[async_trait]
impl StreamChecker for RecordingStreamChecker {
    async fn exists(&self, stream: &str) -> Result<bool, StreamCheckError> {
        self.queried.lock().unwrap().push(stream.to_string());
        if self.broken.contains(stream) {
            return Err(StreamCheckError::Backend("connection refused".into()));
        }
        Ok(!self.missing.contains(stream))
    }
}

// =============================================================================
// Validation shortcuts
// =============================================================================

pub const RELEASE_GRAPH: &str = include_str!("../fixtures/release_graph.json");

pub fn preview(text: &str) -> ParseResult {
    parse_and_validate_preview(text)
}

/// Validate in preview mode with `defaultStreamDepot` set to `Game`.
pub fn preview_in_game_depot(branches: serde_json::Value) -> ParseResult {
    let mut document = serde_json::json!({ "defaultStreamDepot": "Game" });
    let extra = match branches {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    };
    for (key, value) in extra {
        document[key] = value;
    }
    preview(&document.to_string())
}

pub fn assert_has_diagnostic(result: &ParseResult, needle: &str) {
    let diagnostics = result.diagnostics();
    assert!(
        diagnostics.iter().any(|d| d.contains(needle)),
        "Expected a diagnostic containing {:?}, got: {:?}",
        needle,
        diagnostics
    );
}

pub fn assert_valid(result: &ParseResult) {
    assert!(
        result.is_valid(),
        "Expected a valid graph, got: {:?}",
        result.diagnostics()
    );
}
