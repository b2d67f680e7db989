//! Core types and traits for linkwalk.
//!
//! This crate provides the data model the traversal engine works over:
//! nodes and their prototypes, links, paths, the traversal configuration
//! and the error type shared by every walk.

mod config;
mod error;
mod link;
mod node;
mod path;
mod typed;
mod value;

pub use config::{
    LinkLoader, LinkStore, PrototypeChooser, TraversalConfig, TraversalConfigBuilder,
    TraversalConfigBuilderError,
};
pub use error::{BoxError, BudgetKind, NodeBuildError, TraversalError};
pub use link::{Link, LinkContext};
pub use node::{Kind, Node, NodePrototype, NodeRef, PrototypeRef, link_of, structurally_equal};
pub use path::{Path, PathSegment};
pub use typed::{TypedNode, TypedPrototype};
pub use value::{BasicPrototype, Value};
