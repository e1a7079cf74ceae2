//! Stream-path calculation and the stream-existence collaborator.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;

/// Where a branch lives on the version-control server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamResult {
    pub depot: String,
    /// Only set when the path was synthesized from depot + stream name.
    pub stream: Option<String>,
    pub root_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamPathError {
    #[error("Missing rootPath and no streamDepot defined for branch {0}.")]
    MissingDepot(String),

    #[error("Branch rootPath not in '//<something>/...' format: {0}")]
    BadRootPath(String),

    #[error("Cannot find depotname in {0}")]
    NoDepot(String),
}

/// Compute a branch's depot and canonical root path.
///
/// Either `root_path` is given (and only the depot is extracted from it), or
/// a depot is required and the stream `//<depot>/<name>` is synthesized with
/// `subpath` (default `/...`) appended. Empty strings count as absent.
pub fn calculate_stream(
    node_or_stream_name: &str,
    root_path: Option<&str>,
    depot: Option<&str>,
    subpath: Option<&str>,
) -> Result<StreamResult, StreamPathError> {
    fn present(s: Option<&str>) -> Option<&str> {
        s.filter(|s| !s.is_empty())
    }

    let Some(root_path) = present(root_path) else {
        let depot = present(depot)
            .ok_or_else(|| StreamPathError::MissingDepot(node_or_stream_name.to_string()))?;
        let stream = format!("//{}/{}", depot, node_or_stream_name);
        let root_path = format!("{}{}", stream, present(subpath).unwrap_or("/..."));
        return Ok(StreamResult {
            depot: depot.to_string(),
            stream: Some(stream),
            root_path: Some(root_path),
        });
    };

    if !root_path.starts_with("//") || !root_path.ends_with("/...") {
        return Err(StreamPathError::BadRootPath(root_path.to_string()));
    }

    match root_path[2..].split_once('/') {
        Some((depot, _)) if !depot.is_empty() => Ok(StreamResult {
            depot: depot.to_string(),
            stream: None,
            root_path: None,
        }),
        _ => Err(StreamPathError::NoDepot(root_path.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamCheckError {
    #[error("{0}")]
    Backend(String),
}

/// The one question validation asks of the version-control server.
#[async_trait]
pub trait StreamChecker: Send + Sync {
    async fn exists(&self, stream: &str) -> Result<bool, StreamCheckError>;
}

/// A checker answering from a fixed set of known stream paths.
#[derive(Debug, Clone, Default)]
pub struct StaticStreamChecker {
    streams: HashSet<String>,
}

impl StaticStreamChecker {
    pub fn new<I, S>(streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StaticStreamChecker {
            streams: streams.into_iter().map(Into::into).collect(),
        }
    }

    /// One stream path per line; blank lines and `#` comments are skipped.
    pub fn from_listing(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[async_trait]
impl StreamChecker for StaticStreamChecker {
    async fn exists(&self, stream: &str) -> Result<bool, StreamCheckError> {
        Ok(self.streams.contains(stream))
    }
}
