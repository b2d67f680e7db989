//! Paths from a traversal root to a node.

use std::fmt;
use std::sync::Arc;

use compact_str::CompactString;
use itertools::Itertools;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TraversalError;
use crate::node::{Kind, Node};

/// One step of a [`Path`]: a map key or a list index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    String(CompactString),
    Int(i64),
}

impl PathSegment {
    /// Coerce a key node into a path segment.
    ///
    /// Schema-typed nodes are resolved through their representation view.
    /// Only string and int shaped values can be keys; anything else means the
    /// node implementation yielded a key it should have rejected, and is
    /// reported as the fatal [`TraversalError::PathSegment`].
    pub fn from_key_node(node: &dyn Node) -> Result<Self, TraversalError> {
        let repr = node.representation();
        let view: &dyn Node = match &repr {
            Some(repr) => &**repr,
            None => node,
        };

        let segment = match view.kind() {
            Kind::String => view.as_str().map(PathSegment::from),
            Kind::Int => view.as_int().map(PathSegment::Int),
            _ => None,
        };

        segment.ok_or_else(|| {
            let kind = view.kind();
            tracing::error!(%kind, "node cannot be used as a path segment");
            TraversalError::PathSegment { kind }
        })
    }

    /// Get the segment as a map key, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PathSegment::String(s) => Some(s.as_str()),
            PathSegment::Int(_) => None,
        }
    }

    /// Get the segment as a list index.
    ///
    /// Decimal string segments are accepted, so parsed paths can address lists.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Int(i) => usize::try_from(*i).ok(),
            PathSegment::String(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::String(s) => f.write_str(s),
            PathSegment::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::String(s.into())
    }
}

impl From<String> for PathSegment {
    fn from(s: String) -> Self {
        PathSegment::String(s.into())
    }
}

impl From<CompactString> for PathSegment {
    fn from(s: CompactString) -> Self {
        PathSegment::String(s)
    }
}

impl From<i64> for PathSegment {
    fn from(i: i64) -> Self {
        PathSegment::Int(i)
    }
}

/// List indices are bounded by `isize::MAX`, so they always fit. Larger
/// values are clamped to `i64::MAX`, and debug builds assert instead.
impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        debug_assert!(i64::try_from(i).is_ok(), "index {i} does not fit in a path segment");
        PathSegment::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

/// Immutable sequence of segments from the traversal root.
///
/// Appending returns a new path; sibling branches of a walk share their
/// common prefix without seeing each other's segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Arc<[PathSegment]>,
}

impl Path {
    /// The empty path, addressing the root itself.
    pub fn root() -> Self {
        Self {
            segments: Arc::from(Vec::new()),
        }
    }

    /// Create a path from segments.
    pub fn new<S: Into<PathSegment>>(segments: impl IntoIterator<Item = S>) -> Self {
        segments.into_iter().map(Into::<PathSegment>::into).collect()
    }

    /// Parse a `/`-separated path. Every segment becomes a string segment.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim_matches('/');
        if trimmed.is_empty() {
            return Self::root();
        }
        trimmed.split('/').map(PathSegment::from).collect()
    }

    /// Return a new path with `segment` appended.
    pub fn append(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment.into());
        Self {
            segments: segments.into(),
        }
    }

    /// Return a new path with all of `other`'s segments appended.
    pub fn join(&self, other: &Path) -> Self {
        self.segments
            .iter()
            .chain(other.segments.iter())
            .cloned()
            .collect()
    }

    /// Path without its last segment, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(init.iter().cloned().collect())
    }

    /// Last segment, or `None` at the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if this is the root path.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the segments as a slice.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Iterate over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.iter().join("/"))
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect::<Vec<_>>().into(),
        }
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self {
            segments: segments.into(),
        }
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a PathSegment;
    type IntoIter = std::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.segments.iter())
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<PathSegment>::deserialize(deserializer).map(Path::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typed::TypedNode;
    use crate::value::Value;

    #[test]
    fn test_append_does_not_mutate_parent() {
        let parent = Path::parse("a/b");
        let left = parent.append("c");
        let right = parent.append(0usize);

        assert_eq!(parent.len(), 2);
        assert_eq!(left.to_string(), "a/b/c");
        assert_eq!(right.to_string(), "a/b/0");
        assert_ne!(left, right);
    }

    #[test]
    fn test_segment_from_index() {
        assert_eq!(PathSegment::from(3usize), PathSegment::Int(3));
        assert_eq!(PathSegment::from(isize::MAX as usize).as_index(), Some(isize::MAX as usize));
    }

    #[test]
    #[cfg(all(debug_assertions, target_pointer_width = "64"))]
    #[should_panic(expected = "does not fit in a path segment")]
    fn test_segment_from_oversized_index() {
        let _ = PathSegment::from(usize::MAX);
    }

    #[test]
    fn test_parse() {
        assert!(Path::parse("").is_empty());
        assert!(Path::parse("/").is_empty());
        let path = Path::parse("/a/b/");
        assert_eq!(path, Path::new(["a", "b"]));
    }

    #[test]
    fn test_int_and_string_segments_are_distinct() {
        assert_ne!(PathSegment::Int(0), PathSegment::from("0"));
        assert_eq!(PathSegment::from("7").as_index(), Some(7));
        assert_eq!(PathSegment::Int(-1).as_index(), None);
    }

    #[test]
    fn test_parent_and_last() {
        let path = Path::new(["x", "y"]);
        assert_eq!(path.last(), Some(&PathSegment::from("y")));
        assert_eq!(path.parent(), Some(Path::new(["x"])));
        assert_eq!(Path::root().parent(), None);
    }

    #[test]
    fn test_segment_from_key_node() {
        assert_eq!(
            PathSegment::from_key_node(&*Value::string("k")).unwrap(),
            PathSegment::from("k")
        );
        assert_eq!(
            PathSegment::from_key_node(&*Value::int(3)).unwrap(),
            PathSegment::Int(3)
        );

        let err = PathSegment::from_key_node(&*Value::float(1.5)).unwrap_err();
        assert!(matches!(err, TraversalError::PathSegment { kind: Kind::Float }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_segment_prefers_representation() {
        // A struct-typed key whose representation is a string.
        let typed = TypedNode::new(
            "Point",
            Value::map([("x", Value::int(1)), ("y", Value::int(2))]),
            Value::string("1,2"),
        );
        assert_eq!(
            PathSegment::from_key_node(&typed).unwrap(),
            PathSegment::from("1,2")
        );
    }

    #[test]
    fn test_path_serde() {
        let path = Path::new([PathSegment::from("a"), PathSegment::Int(2)]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["a",2]"#);
        let back: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
