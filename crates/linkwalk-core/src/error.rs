//! Error types for traversal operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::link::Link;
use crate::node::Kind;
use crate::path::Path;

/// Boxed error returned by caller-supplied callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which traversal budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BudgetKind {
    /// Visited nodes.
    Node,
    /// Followed links.
    Link,
}

/// Errors that can occur during a traversal.
#[derive(Debug, Error)]
pub enum TraversalError {
    /// A callback required by the attempted operation is missing.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Following a link would exceed the configured link depth limit.
    #[error("Link depth limit ({limit}) exceeded following {link} at '{path}'")]
    LinkDepthExceeded { link: Link, path: Path, limit: u32 },

    /// The link loader or prototype chooser failed.
    #[error("Failed to resolve link {link} at '{path}': {source}")]
    LinkResolution {
        link: Link,
        path: Path,
        #[source]
        source: BoxError,
    },

    /// A node used as a map key or list index was neither a string nor an int.
    ///
    /// This indicates a misbehaving node implementation and is fatal.
    #[error("Cannot get path segment from a {kind} node")]
    PathSegment { kind: Kind },

    /// A focused path does not exist in the graph.
    #[error("Path not found: '{path}'")]
    PathNotFound { path: Path },

    /// A visitor callback failed.
    #[error("Visitor error: {0}")]
    Visitor(#[source] BoxError),

    /// A transform callback failed.
    #[error("Transform error: {0}")]
    Transform(#[source] BoxError),

    /// The cancellation token fired or the deadline passed.
    #[error("Traversal cancelled: {reason}")]
    Cancelled { reason: String },

    /// A node or link budget was exhausted.
    #[error("{budget} budget exhausted at '{path}'")]
    BudgetExceeded { budget: BudgetKind, path: Path },

    /// Rebuilding a node during a transform failed.
    #[error("Failed to build node at '{path}': {source}")]
    NodeBuild {
        path: Path,
        #[source]
        source: NodeBuildError,
    },
}

impl TraversalError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a visitor failure.
    pub fn visitor(source: impl Into<BoxError>) -> Self {
        Self::Visitor(source.into())
    }

    /// Wrap a transform failure.
    pub fn transform(source: impl Into<BoxError>) -> Self {
        Self::Transform(source.into())
    }

    /// Create a cancellation error.
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: reason.into(),
        }
    }

    /// Wrap a link loader or prototype chooser failure with its location.
    pub fn link_resolution(link: Link, path: Path, source: impl Into<BoxError>) -> Self {
        Self::LinkResolution {
            link,
            path,
            source: source.into(),
        }
    }

    /// Whether this error signals a broken node implementation rather than bad data.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::PathSegment { .. })
    }

    /// Whether this error is a recoverable "path not found".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PathNotFound { .. })
    }

    /// Whether the traversal was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Errors raised by a [`NodePrototype`](crate::NodePrototype) while building nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeBuildError {
    /// The prototype cannot build nodes of this kind.
    #[error("prototype '{prototype}' cannot build a {kind}")]
    UnsupportedKind { prototype: String, kind: Kind },

    /// A map key had a kind the prototype does not accept.
    #[error("invalid map key of kind {kind}")]
    InvalidKey { kind: Kind },

    /// Loaded data does not fit the prototype.
    #[error("{message}")]
    Mismatch { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = TraversalError::PathSegment { kind: Kind::Float };
        assert!(err.is_fatal());
        assert!(!err.is_not_found());

        let err = TraversalError::PathNotFound {
            path: Path::parse("a/b"),
        };
        assert!(err.is_not_found());
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Path not found: 'a/b'");
    }

    #[test]
    fn test_visitor_error_keeps_source() {
        let err = TraversalError::visitor("boom");
        assert!(matches!(err, TraversalError::Visitor(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_budget_display() {
        let err = TraversalError::BudgetExceeded {
            budget: BudgetKind::Link,
            path: Path::root(),
        };
        assert_eq!(err.to_string(), "link budget exhausted at ''");
    }
}
