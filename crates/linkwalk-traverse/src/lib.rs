//! Walk algorithms over linked node graphs.
//!
//! This crate drives traversals over [`linkwalk_core`] nodes, following
//! links through caller-supplied loaders as it goes.
//!
//! # Overview
//!
//! Every walk starts from a [`Progress`] derived from a
//! [`TraversalConfig`]. Key features:
//!
//! - **Visiting walks** over every node or a predicate-selected subset
//! - **Transforming walks** that rebuild the graph bottom-up, sharing
//!   unchanged subtrees
//! - **Focused operations** that read or replace the node at one path
//! - **Visit-once tracking**, link depth limits, budgets and cancellation
//! - **Parallel walks** via rayon
//!
//! # Example
//!
//! ```rust
//! use linkwalk_core::{TraversalConfig, Value};
//!
//! let root = Value::map([("a", Value::int(1)), ("b", Value::list([Value::int(2)]))]);
//! let mut paths = Vec::new();
//! linkwalk_traverse::walk_all(&root, &TraversalConfig::default(), |progress, _| {
//!     paths.push(progress.path().to_string());
//!     Ok(())
//! })
//! .unwrap();
//!
//! assert_eq!(paths, ["", "a", "b", "b/0"]);
//! ```

mod focus;
mod link;
mod parallel;
mod progress;
mod seen;
mod transform;
mod walk;

pub use link::LinkStep;
pub use progress::{Budget, LastBlock, Progress};
pub use seen::SeenLinks;

pub use linkwalk_core::{NodeRef, Path, TraversalConfig, TraversalError};

/// Visit every node reachable from `root`. See [`Progress::walk_all`].
pub fn walk_all<F>(root: &NodeRef, config: &TraversalConfig, visit: F) -> Result<(), TraversalError>
where
    F: FnMut(&Progress, &NodeRef) -> Result<(), TraversalError>,
{
    Progress::new(config).walk_all(root, visit)
}

/// Visit the nodes selected by `predicate`. See [`Progress::walk_matching`].
pub fn walk_matching<P, F>(
    root: &NodeRef,
    config: &TraversalConfig,
    predicate: P,
    visit: F,
) -> Result<(), TraversalError>
where
    P: FnMut(&Progress, &NodeRef) -> bool,
    F: FnMut(&Progress, &NodeRef) -> Result<(), TraversalError>,
{
    Progress::new(config).walk_matching(root, predicate, visit)
}

/// Rebuild the graph under `root` bottom-up. See [`Progress::walk_transforming`].
pub fn walk_transforming<F>(
    root: &NodeRef,
    config: &TraversalConfig,
    transform: F,
) -> Result<NodeRef, TraversalError>
where
    F: FnMut(&Progress, NodeRef) -> Result<NodeRef, TraversalError>,
{
    Progress::new(config).walk_transforming(root, transform)
}

/// Visit the node at `path`. See [`Progress::focus`].
pub fn focus<F>(root: &NodeRef, path: &Path, config: &TraversalConfig, visit: F) -> Result<(), TraversalError>
where
    F: FnOnce(&Progress, &NodeRef) -> Result<(), TraversalError>,
{
    Progress::new(config).focus(root, path, visit)
}

/// Return the node at `path`. See [`Progress::get`].
pub fn get(root: &NodeRef, path: &Path, config: &TraversalConfig) -> Result<NodeRef, TraversalError> {
    Progress::new(config).get(root, path)
}

/// Replace the node at `path`. See [`Progress::focused_transform`].
pub fn focused_transform<F>(
    root: &NodeRef,
    path: &Path,
    config: &TraversalConfig,
    transform: F,
    create_parents: bool,
) -> Result<NodeRef, TraversalError>
where
    F: FnOnce(&Progress, Option<NodeRef>) -> Result<NodeRef, TraversalError>,
{
    Progress::new(config).focused_transform(root, path, transform, create_parents)
}

/// Visit every reachable node in parallel. See [`Progress::walk_all_parallel`].
pub fn walk_all_parallel<F>(root: &NodeRef, config: &TraversalConfig, visit: F) -> Result<(), TraversalError>
where
    F: Fn(&Progress, &NodeRef) -> Result<(), TraversalError> + Send + Sync,
{
    Progress::new(config).walk_all_parallel(root, visit)
}
