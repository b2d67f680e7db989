//! Basic, untyped node implementation.

use std::sync::Arc;

use compact_str::CompactString;
use indexmap::IndexMap;

use crate::error::NodeBuildError;
use crate::link::Link;
use crate::node::{Kind, Node, NodePrototype, NodeRef, PrototypeRef};
use crate::path::PathSegment;

/// A plain data model value.
///
/// Maps keep insertion order and only accept string keys. Children are
/// shared handles, so cloning a container is cheap and rebuilt trees share
/// every untouched subtree with the original.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(CompactString),
    Bytes(Arc<[u8]>),
    Link(Link),
    List(Vec<NodeRef>),
    Map(IndexMap<CompactString, NodeRef>),
}

impl Value {
    /// Wrap this value into a shared node handle.
    pub fn into_node(self) -> NodeRef {
        Arc::new(self)
    }

    pub fn null() -> NodeRef {
        Self::Null.into_node()
    }

    pub fn bool(value: bool) -> NodeRef {
        Self::Bool(value).into_node()
    }

    pub fn int(value: i64) -> NodeRef {
        Self::Int(value).into_node()
    }

    pub fn float(value: f64) -> NodeRef {
        Self::Float(value).into_node()
    }

    pub fn string(value: impl Into<CompactString>) -> NodeRef {
        Self::String(value.into()).into_node()
    }

    pub fn bytes(value: impl AsRef<[u8]>) -> NodeRef {
        Self::Bytes(Arc::from(value.as_ref())).into_node()
    }

    pub fn link(link: Link) -> NodeRef {
        Self::Link(link).into_node()
    }

    /// Create a list node from its elements.
    pub fn list(items: impl IntoIterator<Item = NodeRef>) -> NodeRef {
        Self::List(items.into_iter().collect()).into_node()
    }

    /// Create a map node; later duplicates of a key replace earlier ones.
    pub fn map<K>(entries: impl IntoIterator<Item = (K, NodeRef)>) -> NodeRef
    where
        K: Into<CompactString>,
    {
        Self::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect()).into_node()
    }
}

impl Node for Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::Link(_) => Kind::Link,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
        }
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (NodeRef, NodeRef)> + '_> {
        match self {
            Value::Map(map) => Box::new(
                map.iter()
                    .map(|(k, v)| (Value::String(k.clone()).into_node(), Arc::clone(v))),
            ),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn elements(&self) -> Box<dyn Iterator<Item = NodeRef> + '_> {
        match self {
            Value::List(items) => Box::new(items.iter().cloned()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    fn lookup(&self, segment: &PathSegment) -> Option<NodeRef> {
        match (self, segment) {
            (Value::Map(map), PathSegment::String(key)) => map.get(key.as_str()).cloned(),
            (Value::List(items), _) => segment.as_index().and_then(|i| items.get(i)).cloned(),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    fn as_link(&self) -> Option<&Link> {
        match self {
            Value::Link(link) => Some(link),
            _ => None,
        }
    }

    fn prototype(&self) -> PrototypeRef {
        Arc::new(BasicPrototype)
    }
}

/// Prototype of [`Value`]: accepts any loaded node as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicPrototype;

impl NodePrototype for BasicPrototype {
    fn name(&self) -> &str {
        "basic"
    }

    fn conform(&self, loaded: NodeRef) -> Result<NodeRef, NodeBuildError> {
        Ok(loaded)
    }

    fn build_map(&self, entries: Vec<(NodeRef, NodeRef)>) -> Result<NodeRef, NodeBuildError> {
        let mut map = IndexMap::with_capacity(entries.len());
        for (key, value) in entries {
            let view = key.representation().unwrap_or(key);
            let name = view
                .as_str()
                .ok_or(NodeBuildError::InvalidKey { kind: view.kind() })?;
            map.insert(CompactString::from(name), value);
        }
        Ok(Value::Map(map).into_node())
    }

    fn build_list(&self, items: Vec<NodeRef>) -> Result<NodeRef, NodeBuildError> {
        Ok(Value::List(items).into_node())
    }

    fn build_link(&self, link: Link) -> Result<NodeRef, NodeBuildError> {
        Ok(Value::Link(link).into_node())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_keeps_insertion_order() {
        let node = Value::map([("z", Value::int(1)), ("a", Value::int(2)), ("m", Value::int(3))]);
        let keys: Vec<String> = node
            .entries()
            .map(|(k, _)| k.as_str().unwrap_or_default().to_string())
            .collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(node.len(), 3);
    }

    #[test]
    fn test_lookup() {
        let node = Value::map([("items", Value::list([Value::int(10), Value::int(20)]))]);
        let items = node.lookup(&PathSegment::from("items")).unwrap();
        assert_eq!(items.kind(), Kind::List);
        assert_eq!(items.lookup(&PathSegment::Int(1)).unwrap().as_int(), Some(20));
        assert_eq!(items.lookup(&PathSegment::from("0")).unwrap().as_int(), Some(10));
        assert!(items.lookup(&PathSegment::Int(2)).is_none());
        assert!(items.lookup(&PathSegment::Int(-1)).is_none());
        // Integer segments never address map entries.
        assert!(node.lookup(&PathSegment::Int(0)).is_none());
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Value::bool(true).as_bool(), Some(true));
        assert_eq!(Value::float(1.5).as_float(), Some(1.5));
        assert_eq!(Value::bytes(b"hi").as_bytes(), Some(&b"hi"[..]));
        assert_eq!(Value::null().kind(), Kind::Null);
        assert!(Value::string("x").as_int().is_none());
    }

    #[test]
    fn test_basic_prototype_build_map_rejects_non_string_keys() {
        let proto = BasicPrototype;
        let err = proto
            .build_map(vec![(Value::int(1), Value::null())])
            .unwrap_err();
        assert_eq!(err, NodeBuildError::InvalidKey { kind: Kind::Int });

        let built = proto
            .build_map(vec![(Value::string("k"), Value::int(7))])
            .unwrap();
        assert_eq!(built.lookup(&PathSegment::from("k")).unwrap().as_int(), Some(7));
    }
}
