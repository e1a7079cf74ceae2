//! Error types shared across the validation phases.
//!
//! Two tiers: a [`StructuralError`] aborts the whole run, a [`Diagnostic`]
//! is accumulated and reported alongside every other one found.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Config,
    Branches,
    Aliases,
    Schema,
    Flow,
    Branchspecs,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Config => write!(f, "Config"),
            Phase::Branches => write!(f, "Branches"),
            Phase::Aliases => write!(f, "Aliases"),
            Phase::Schema => write!(f, "Schema"),
            Phase::Flow => write!(f, "Flow"),
            Phase::Branchspecs => write!(f, "Branchspecs"),
        }
    }
}

/// A recoverable problem in the branch graph document.
///
/// `Display` renders only the message, so the list can be shown verbatim to
/// whoever wrote the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: &'static str,
    pub phase: Phase,
    pub message: String,
    /// The branch the problem was found on, if any.
    pub branch: Option<String>,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Diagnostic {
    fn new(phase: Phase, code: &'static str, message: String, branch: Option<&str>) -> Self {
        Diagnostic {
            code,
            phase,
            message,
            branch: branch.map(str::to_string),
        }
    }

    pub fn config(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Phase::Config, code, message.into(), None)
    }

    pub fn branch(code: &'static str, message: impl Into<String>, branch: Option<&str>) -> Self {
        Self::new(Phase::Branches, code, message.into(), branch)
    }

    pub fn alias(code: &'static str, message: impl Into<String>, branch: &str) -> Self {
        Self::new(Phase::Aliases, code, message.into(), Some(branch))
    }

    pub fn schema(code: &'static str, message: impl Into<String>, branch: Option<&str>) -> Self {
        Self::new(Phase::Schema, code, message.into(), branch)
    }

    pub fn flow(code: &'static str, message: impl Into<String>, branch: &str) -> Self {
        Self::new(Phase::Flow, code, message.into(), Some(branch))
    }

    pub fn branchspec(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Phase::Branchspecs, code, message.into(), None)
    }
}

/// A defect that makes the document unsafe to interpret at all.
#[derive(Debug, Error)]
pub enum StructuralError {
    #[error("Failed to parse branch graph document: {0}")]
    Syntax(#[from] json5::Error),

    #[error("expected \"branches\" array!")]
    MissingBranches,

    #[error("expected \"{0}\" array!")]
    NotAnArray(&'static str),

    #[error("Invalid macro property: '{0}'")]
    InvalidMacros(String),

    #[error("Unknown property '{key}' specified for node {node}")]
    UnknownNodeProperty { key: String, node: String },

    #[error("Unknown property '{key}' specified for edge {from}->{to}")]
    UnknownEdgeProperty { key: String, from: String, to: String },

    #[error("Edge property requires string 'from' and 'to' fields: {0}")]
    MalformedEdge(String),

    #[error("Invalid approval settings for edge {from}->{to}")]
    InvalidApproval { from: String, to: String },

    #[error("Unknown day of the week {0}")]
    UnknownDay(String),

    #[error("Failed to project document value: {0}")]
    Projection(#[from] serde_json::Error),
}
