//! Parallel visiting walk using rayon.

use rayon::prelude::*;

use linkwalk_core::{NodeRef, PathSegment, TraversalError, link_of};

use crate::link::LinkStep;
use crate::progress::Progress;
use crate::walk::for_each_child;

impl Progress {
    /// Visit every reachable node, exploring siblings in parallel.
    ///
    /// Each node is still visited before its children, but the relative order
    /// of sibling subtrees is unspecified. Visit-once tracking and budgets are
    /// shared across threads. When several subtrees fail, one of their errors
    /// is returned.
    pub fn walk_all_parallel<F>(&self, node: &NodeRef, visit: F) -> Result<(), TraversalError>
    where
        F: Fn(&Progress, &NodeRef) -> Result<(), TraversalError> + Send + Sync,
    {
        self.walk_node_parallel(node, None, &visit)
    }

    fn walk_node_parallel<F>(
        &self,
        node: &NodeRef,
        parent: Option<&NodeRef>,
        visit: &F,
    ) -> Result<(), TraversalError>
    where
        F: Fn(&Progress, &NodeRef) -> Result<(), TraversalError> + Send + Sync,
    {
        if let Some(link) = link_of(&**node) {
            return match self.follow_link(&link, node, parent)? {
                LinkStep::Loaded {
                    progress,
                    node: target,
                } => progress.walk_node_parallel(&target, parent, visit),
                LinkStep::Skipped => Ok(()),
            };
        }

        self.enter_node()?;
        visit(self, node)?;

        let mut children: Vec<(PathSegment, NodeRef)> = Vec::with_capacity(node.len());
        for_each_child(&**node, |segment, child| {
            children.push((segment, child));
            Ok(())
        })?;

        children.into_par_iter().try_for_each(|(segment, child)| {
            self.descend(segment)
                .walk_node_parallel(&child, Some(node), visit)
        })
    }
}
