//! Node and prototype capability traits.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::NodeBuildError;
use crate::link::Link;
use crate::path::PathSegment;

/// Shared handle to a node.
pub type NodeRef = Arc<dyn Node>;

/// Shared handle to a node prototype.
pub type PrototypeRef = Arc<dyn NodePrototype>;

/// Kind of a data model value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Map,
    List,
    String,
    Int,
    Float,
    Bool,
    Bytes,
    Link,
    Null,
}

impl Kind {
    /// Check if values of this kind have children.
    pub fn is_recursive(&self) -> bool {
        matches!(self, Kind::Map | Kind::List)
    }

    /// Check if this kind is a plain scalar (not a container, not a link).
    pub fn is_scalar(&self) -> bool {
        !self.is_recursive() && *self != Kind::Link
    }
}

/// An immutable value in a linked data graph.
///
/// Implementations only need [`kind`](Node::kind) and
/// [`prototype`](Node::prototype); every other accessor defaults to "not
/// applicable". Map and list iteration must be stable across calls.
pub trait Node: fmt::Debug + Send + Sync {
    /// Kind of this node.
    fn kind(&self) -> Kind;

    /// Map entries, in the map's own order.
    fn entries(&self) -> Box<dyn Iterator<Item = (NodeRef, NodeRef)> + '_> {
        Box::new(std::iter::empty())
    }

    /// List elements, in positional order.
    fn elements(&self) -> Box<dyn Iterator<Item = NodeRef> + '_> {
        Box::new(std::iter::empty())
    }

    /// Number of entries or elements.
    fn len(&self) -> usize {
        0
    }

    /// Check if a map or list has no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a child by path segment.
    fn lookup(&self, _segment: &PathSegment) -> Option<NodeRef> {
        None
    }

    fn as_bool(&self) -> Option<bool> {
        None
    }

    fn as_int(&self) -> Option<i64> {
        None
    }

    fn as_float(&self) -> Option<f64> {
        None
    }

    fn as_str(&self) -> Option<&str> {
        None
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn as_link(&self) -> Option<&Link> {
        None
    }

    /// Serialized-form view of a schema-typed node.
    ///
    /// Plain nodes return `None`; their in-memory shape is their representation.
    fn representation(&self) -> Option<NodeRef> {
        None
    }

    /// Declared target prototype of a schema-typed link node.
    fn link_target_prototype(&self) -> Option<PrototypeRef> {
        None
    }

    /// Prototype that builds nodes of this node's shape.
    fn prototype(&self) -> PrototypeRef;
}

/// Builds nodes of one particular shape.
pub trait NodePrototype: fmt::Debug + Send + Sync {
    /// Name of the shape, used in error messages.
    fn name(&self) -> &str;

    /// Shape a freshly loaded node into this prototype.
    fn conform(&self, loaded: NodeRef) -> Result<NodeRef, NodeBuildError>;

    /// Build a map from key/value pairs, keeping their order.
    fn build_map(&self, _entries: Vec<(NodeRef, NodeRef)>) -> Result<NodeRef, NodeBuildError> {
        Err(unsupported(self.name(), Kind::Map))
    }

    /// Build a list from its elements.
    fn build_list(&self, _items: Vec<NodeRef>) -> Result<NodeRef, NodeBuildError> {
        Err(unsupported(self.name(), Kind::List))
    }

    /// Build a link node.
    fn build_link(&self, _link: Link) -> Result<NodeRef, NodeBuildError> {
        Err(unsupported(self.name(), Kind::Link))
    }
}

fn unsupported(prototype: &str, kind: Kind) -> NodeBuildError {
    NodeBuildError::UnsupportedKind {
        prototype: prototype.to_string(),
        kind,
    }
}

/// Find the link carried by a node, preferring its representation view.
pub fn link_of(node: &dyn Node) -> Option<Link> {
    if let Some(repr) = node.representation() {
        if let Some(link) = repr.as_link() {
            return Some(link.clone());
        }
    }
    node.as_link().cloned()
}

/// Compare two nodes by kind and content, ignoring their concrete types.
pub fn structurally_equal(a: &dyn Node, b: &dyn Node) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    match a.kind() {
        Kind::Null => true,
        Kind::Bool => a.as_bool() == b.as_bool(),
        Kind::Int => a.as_int() == b.as_int(),
        Kind::Float => a.as_float() == b.as_float(),
        Kind::String => a.as_str() == b.as_str(),
        Kind::Bytes => a.as_bytes() == b.as_bytes(),
        Kind::Link => a.as_link() == b.as_link(),
        Kind::List => {
            a.len() == b.len()
                && a
                    .elements()
                    .zip(b.elements())
                    .all(|(x, y)| structurally_equal(&*x, &*y))
        }
        Kind::Map => {
            a.len() == b.len()
                && a.entries().zip(b.entries()).all(|((ka, va), (kb, vb))| {
                    structurally_equal(&*ka, &*kb) && structurally_equal(&*va, &*vb)
                })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_kind_display() {
        assert_eq!(Kind::Map.to_string(), "map");
        assert_eq!(Kind::Float.to_string(), "float");
        let name: &'static str = Kind::Link.into();
        assert_eq!(name, "link");
    }

    #[test]
    fn test_kind_classification() {
        assert!(Kind::Map.is_recursive());
        assert!(Kind::List.is_recursive());
        assert!(!Kind::Link.is_recursive());
        assert!(!Kind::Link.is_scalar());
        assert!(Kind::Bytes.is_scalar());
    }

    #[test]
    fn test_structurally_equal() {
        let a = Value::map([("x", Value::int(1)), ("y", Value::list([Value::string("z")]))]);
        let b = Value::map([("x", Value::int(1)), ("y", Value::list([Value::string("z")]))]);
        let c = Value::map([("y", Value::list([Value::string("z")])), ("x", Value::int(1))]);
        assert!(structurally_equal(&*a, &*b));
        // Map order is part of the structure.
        assert!(!structurally_equal(&*a, &*c));
        assert!(!structurally_equal(&*Value::int(1), &*Value::float(1.0)));
    }

    #[test]
    fn test_link_of() {
        let link = Link::new("target");
        assert_eq!(link_of(&*Value::link(link.clone())), Some(link));
        assert_eq!(link_of(&*Value::string("nope")), None);
    }
}
