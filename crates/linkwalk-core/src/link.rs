//! Links and the context handed to link callbacks.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tokio_util::sync::CancellationToken;

use crate::node::NodeRef;
use crate::path::Path;

/// Opaque reference to another node graph.
///
/// A link is just comparable bytes (typically an encoded content identifier).
/// Resolving it is the job of the configured loader.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Link(Arc<[u8]>);

impl Link {
    /// Create a link from its raw bytes.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(bytes.as_ref()))
    }

    /// Get the raw bytes of the link.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the link as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Link({})", self.to_hex())
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Link {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Everything a loader, chooser or store may want to know about a link.
#[derive(Debug, Clone)]
pub struct LinkContext {
    /// The link being resolved.
    pub link: Link,
    /// The node carrying the link.
    pub link_node: NodeRef,
    /// The map or list the link node was found in, if any.
    pub parent_node: Option<NodeRef>,
    /// Path at which the link was found.
    pub path: Path,
    /// Cancellation token of the walk.
    pub cancel: CancellationToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_hex() {
        let link = Link::new([0xab_u8, 0x01]);
        assert_eq!(link.to_hex(), "ab01");
        assert_eq!(link.to_string(), "ab01");
        assert_eq!(format!("{link:?}"), "Link(ab01)");
    }

    #[test]
    fn test_link_equality() {
        assert_eq!(Link::new("a"), Link::new(b"a"));
        assert_ne!(Link::new("a"), Link::new("b"));
    }
}
