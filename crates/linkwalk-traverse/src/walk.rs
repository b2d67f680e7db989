//! Visiting walks: every node, or every node a predicate selects.

use linkwalk_core::{Kind, Node, NodeRef, PathSegment, TraversalError, link_of};

use crate::link::LinkStep;
use crate::progress::Progress;

type VisitFn<'a> = dyn FnMut(&Progress, &NodeRef) -> Result<(), TraversalError> + 'a;

impl Progress {
    /// Visit every node reachable from `node`, following links.
    ///
    /// Nodes are visited before their children, in the node's own iteration
    /// order. A link is not visited itself; its loaded target is visited in
    /// its place. The first visitor error ends the walk and is returned as-is.
    pub fn walk_all<F>(&self, node: &NodeRef, mut visit: F) -> Result<(), TraversalError>
    where
        F: FnMut(&Progress, &NodeRef) -> Result<(), TraversalError>,
    {
        self.walk_node(node, None, &mut visit)
    }

    /// Visit the nodes selected by `predicate`.
    ///
    /// Children are explored whether or not their ancestor matched.
    pub fn walk_matching<P, F>(
        &self,
        node: &NodeRef,
        mut predicate: P,
        mut visit: F,
    ) -> Result<(), TraversalError>
    where
        P: FnMut(&Progress, &NodeRef) -> bool,
        F: FnMut(&Progress, &NodeRef) -> Result<(), TraversalError>,
    {
        self.walk_node(node, None, &mut |progress: &Progress, node: &NodeRef| {
            if predicate(progress, node) {
                visit(progress, node)
            } else {
                Ok(())
            }
        })
    }

    fn walk_node(
        &self,
        node: &NodeRef,
        parent: Option<&NodeRef>,
        visit: &mut VisitFn<'_>,
    ) -> Result<(), TraversalError> {
        if let Some(link) = link_of(&**node) {
            return match self.follow_link(&link, node, parent)? {
                LinkStep::Loaded {
                    progress,
                    node: target,
                } => progress.walk_node(&target, parent, visit),
                LinkStep::Skipped => Ok(()),
            };
        }

        self.enter_node()?;
        tracing::trace!(path = %self.path(), kind = %node.kind(), "visiting node");
        visit(self, node)?;

        for_each_child(&**node, |segment, child| {
            self.descend(segment).walk_node(&child, Some(node), &mut *visit)
        })
    }
}

/// Call `f` with the path segment and value of every child of `node`.
pub(crate) fn for_each_child<F>(node: &dyn Node, mut f: F) -> Result<(), TraversalError>
where
    F: FnMut(PathSegment, NodeRef) -> Result<(), TraversalError>,
{
    match node.kind() {
        Kind::Map => {
            for (key, value) in node.entries() {
                f(PathSegment::from_key_node(&*key)?, value)?;
            }
        }
        Kind::List => {
            for (index, value) in node.elements().enumerate() {
                f(PathSegment::from(index), value)?;
            }
        }
        _ => {}
    }
    Ok(())
}
