//! linkwalk - traversal engine for content-addressed, linked data graphs.
//!
//! Nodes are structured values that may contain links to other node
//! graphs. The walks in this crate follow those links through a loader you
//! supply, tracking the path, the link depth and the links already seen so
//! that cyclic data still terminates.
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use linkwalk::{BasicPrototype, Link, Path, TraversalConfig, Value};
//!
//! let child = Value::map([("b", Value::int(1))]);
//! let store = HashMap::from([(Link::new("child"), child)]);
//! let root = Value::map([("a", Value::link(Link::new("child")))]);
//!
//! let config = TraversalConfig::builder()
//!     .load_link(move |link, _| store.get(link).cloned().ok_or_else(|| "missing block".into()))
//!     .choose_prototype(|_, _| Ok(Arc::new(BasicPrototype)))
//!     .build()
//!     .unwrap();
//!
//! let node = linkwalk::get(&root, &Path::parse("a/b"), &config).unwrap();
//! assert_eq!(node.as_int(), Some(1));
//! ```

pub use linkwalk_core::*;
pub use linkwalk_traverse::{
    Budget, LastBlock, LinkStep, Progress, SeenLinks, focus, focused_transform, get, walk_all,
    walk_all_parallel, walk_matching, walk_transforming,
};
