//! Adapter for presenting schema-typed values as nodes.

use std::sync::Arc;

use compact_str::CompactString;

use crate::error::NodeBuildError;
use crate::link::Link;
use crate::node::{Kind, Node, NodePrototype, NodeRef, PrototypeRef};
use crate::path::PathSegment;
use crate::value::BasicPrototype;

/// A schema-typed node: a type-level view plus its representation view.
///
/// Everything except [`representation`](Node::representation) delegates to
/// the type-level view. A typed link node may declare the prototype its
/// target should be built with.
#[derive(Debug, Clone)]
pub struct TypedNode {
    type_name: CompactString,
    value: NodeRef,
    representation: NodeRef,
    link_target: Option<PrototypeRef>,
    prototype: Option<PrototypeRef>,
}

impl TypedNode {
    /// Create a typed node from its two views.
    pub fn new(type_name: impl Into<CompactString>, value: NodeRef, representation: NodeRef) -> Self {
        Self {
            type_name: type_name.into(),
            value,
            representation,
            link_target: None,
            prototype: None,
        }
    }

    /// Create a typed node whose representation equals its type-level view.
    pub fn transparent(type_name: impl Into<CompactString>, value: NodeRef) -> Self {
        let representation = Arc::clone(&value);
        Self::new(type_name, value, representation)
    }

    /// Declare the prototype of this link node's target.
    pub fn with_link_target(mut self, prototype: PrototypeRef) -> Self {
        self.link_target = Some(prototype);
        self
    }

    /// Override the prototype used to rebuild nodes of this type.
    pub fn with_prototype(mut self, prototype: PrototypeRef) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Name of the schema type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Wrap into a shared node handle.
    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }
}

impl Node for TypedNode {
    fn kind(&self) -> Kind {
        self.value.kind()
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (NodeRef, NodeRef)> + '_> {
        self.value.entries()
    }

    fn elements(&self) -> Box<dyn Iterator<Item = NodeRef> + '_> {
        self.value.elements()
    }

    fn len(&self) -> usize {
        self.value.len()
    }

    fn lookup(&self, segment: &PathSegment) -> Option<NodeRef> {
        self.value.lookup(segment)
    }

    fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    fn as_int(&self) -> Option<i64> {
        self.value.as_int()
    }

    fn as_float(&self) -> Option<f64> {
        self.value.as_float()
    }

    fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        self.value.as_bytes()
    }

    fn as_link(&self) -> Option<&Link> {
        self.value.as_link()
    }

    fn representation(&self) -> Option<NodeRef> {
        Some(Arc::clone(&self.representation))
    }

    fn link_target_prototype(&self) -> Option<PrototypeRef> {
        self.link_target.clone()
    }

    fn prototype(&self) -> PrototypeRef {
        match &self.prototype {
            Some(prototype) => Arc::clone(prototype),
            None => Arc::new(TypedPrototype {
                type_name: self.type_name.clone(),
                expected: None,
                link_target: self.link_target.clone(),
                inner: self.value.prototype(),
            }),
        }
    }
}

/// Prototype that wraps data into [`TypedNode`]s of one type.
///
/// The wrapped node serves as both views, which fits types whose
/// representation is their natural data model shape. Maps, lists and links
/// are built by an inner prototype (`BasicPrototype` unless replaced) and
/// then wrapped, so rebuilt nodes keep their type name and declared link
/// target.
#[derive(Debug, Clone)]
pub struct TypedPrototype {
    type_name: CompactString,
    expected: Option<Kind>,
    link_target: Option<PrototypeRef>,
    inner: PrototypeRef,
}

impl TypedPrototype {
    /// Create a prototype for the named type.
    pub fn new(type_name: impl Into<CompactString>) -> Self {
        Self {
            type_name: type_name.into(),
            expected: None,
            link_target: None,
            inner: Arc::new(BasicPrototype),
        }
    }

    /// Reject loaded data whose kind is not `kind`.
    pub fn expecting(mut self, kind: Kind) -> Self {
        self.expected = Some(kind);
        self
    }

    /// Declare the target prototype of the link nodes this prototype builds.
    pub fn with_link_target(mut self, prototype: PrototypeRef) -> Self {
        self.link_target = Some(prototype);
        self
    }

    /// Build the wrapped data with `prototype` instead of `BasicPrototype`.
    pub fn with_inner(mut self, prototype: PrototypeRef) -> Self {
        self.inner = prototype;
        self
    }

    /// Wrap into a shared prototype handle.
    pub fn into_prototype(self) -> PrototypeRef {
        Arc::new(self)
    }

    fn wrap(&self, value: NodeRef) -> NodeRef {
        let mut node = TypedNode::transparent(self.type_name.clone(), value);
        node.link_target = self.link_target.clone();
        node.into_node()
    }
}

impl NodePrototype for TypedPrototype {
    fn name(&self) -> &str {
        &self.type_name
    }

    fn conform(&self, loaded: NodeRef) -> Result<NodeRef, NodeBuildError> {
        if let Some(expected) = self.expected {
            if loaded.kind() != expected {
                return Err(NodeBuildError::Mismatch {
                    message: format!(
                        "type {} expects a {expected}, loaded a {}",
                        self.type_name,
                        loaded.kind()
                    ),
                });
            }
        }
        Ok(self.wrap(loaded))
    }

    fn build_map(&self, entries: Vec<(NodeRef, NodeRef)>) -> Result<NodeRef, NodeBuildError> {
        self.inner.build_map(entries).map(|value| self.wrap(value))
    }

    fn build_list(&self, items: Vec<NodeRef>) -> Result<NodeRef, NodeBuildError> {
        self.inner.build_list(items).map(|value| self.wrap(value))
    }

    fn build_link(&self, link: Link) -> Result<NodeRef, NodeBuildError> {
        self.inner.build_link(link).map(|value| self.wrap(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_typed_node_delegates_to_value() {
        let typed = TypedNode::new("Name", Value::string("ada"), Value::string("ADA"));
        assert_eq!(typed.kind(), Kind::String);
        assert_eq!(typed.as_str(), Some("ada"));
        assert_eq!(typed.representation().unwrap().as_str(), Some("ADA"));
        assert_eq!(typed.type_name(), "Name");
    }

    #[test]
    fn test_typed_prototype_conform() {
        let proto = TypedPrototype::new("Person").expecting(Kind::Map);
        let node = proto.conform(Value::map([("name", Value::string("ada"))])).unwrap();
        assert_eq!(node.kind(), Kind::Map);
        assert!(node.representation().is_some());

        let err = proto.conform(Value::int(1)).unwrap_err();
        assert!(matches!(err, NodeBuildError::Mismatch { .. }));
    }

    #[test]
    fn test_rebuilt_typed_map_stays_typed() {
        let point = TypedNode::transparent("Point", Value::map([("x", Value::int(1))])).into_node();
        let rebuilt = point
            .prototype()
            .build_map(vec![(Value::string("x"), Value::int(2))])
            .unwrap();

        assert_eq!(rebuilt.prototype().name(), "Point");
        assert_eq!(rebuilt.kind(), Kind::Map);
        assert!(rebuilt.representation().is_some());
        assert_eq!(rebuilt.lookup(&PathSegment::from("x")).unwrap().as_int(), Some(2));
    }

    #[test]
    fn test_rebuilt_typed_link_keeps_target() {
        let target = TypedPrototype::new("Person").into_prototype();
        let link_node = TypedNode::transparent("PersonLink", Value::link(Link::new("old")))
            .with_link_target(target)
            .into_node();

        let rebuilt = link_node.prototype().build_link(Link::new("new")).unwrap();
        assert_eq!(rebuilt.as_link(), Some(&Link::new("new")));
        assert_eq!(
            rebuilt.link_target_prototype().map(|p| p.name().to_string()),
            Some("Person".to_string())
        );
    }
}
