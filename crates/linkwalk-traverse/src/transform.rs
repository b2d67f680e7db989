//! Bottom-up transforming walk.

use std::sync::Arc;

use linkwalk_core::{Kind, NodeRef, PathSegment, TraversalError, link_of};

use crate::link::LinkStep;
use crate::progress::Progress;

type TransformFn<'a> = dyn FnMut(&Progress, NodeRef) -> Result<NodeRef, TraversalError> + 'a;

impl Progress {
    /// Rebuild the graph under `node` bottom-up.
    ///
    /// Children are transformed first; `transform` then receives the node
    /// with its rebuilt children and returns its replacement (returning the
    /// same handle means "unchanged"). Subtrees nothing changed in are shared
    /// with the input. When the content behind a link changes, it is written
    /// with the configured link store and the link node is rebuilt around the
    /// new link. When visiting links once, later occurrences of a rewritten
    /// link are redirected to the same new link.
    pub fn walk_transforming<F>(&self, node: &NodeRef, mut transform: F) -> Result<NodeRef, TraversalError>
    where
        F: FnMut(&Progress, NodeRef) -> Result<NodeRef, TraversalError>,
    {
        self.transform_node(node, None, &mut transform)
    }

    fn transform_node(
        &self,
        node: &NodeRef,
        parent: Option<&NodeRef>,
        transform: &mut TransformFn<'_>,
    ) -> Result<NodeRef, TraversalError> {
        if let Some(link) = link_of(&**node) {
            return match self.follow_link(&link, node, parent)? {
                LinkStep::Loaded {
                    progress,
                    node: target,
                } => {
                    let rebuilt = progress.transform_node(&target, parent, transform)?;
                    if Arc::ptr_eq(&rebuilt, &target) {
                        Ok(Arc::clone(node))
                    } else {
                        self.relink(&link, node, parent, &rebuilt)
                    }
                }
                LinkStep::Skipped => self.redirect_link(&link, node),
            };
        }

        self.enter_node()?;
        let rebuilt = self.rebuild_children(node, |progress, child| {
            progress.transform_node(child, Some(node), &mut *transform)
        })?;
        transform(self, rebuilt)
    }

    /// Map `f` over the children of `node` and rebuild it if any child changed.
    pub(crate) fn rebuild_children<F>(&self, node: &NodeRef, mut f: F) -> Result<NodeRef, TraversalError>
    where
        F: FnMut(&Progress, &NodeRef) -> Result<NodeRef, TraversalError>,
    {
        match node.kind() {
            Kind::Map => {
                let mut changed = false;
                let mut entries = Vec::with_capacity(node.len());
                for (key, value) in node.entries() {
                    let segment = PathSegment::from_key_node(&*key)?;
                    let new_value = f(&self.descend(segment), &value)?;
                    changed |= !Arc::ptr_eq(&new_value, &value);
                    entries.push((key, new_value));
                }
                if !changed {
                    return Ok(Arc::clone(node));
                }
                node.prototype()
                    .build_map(entries)
                    .map_err(|source| self.build_error(source))
            }
            Kind::List => {
                let mut changed = false;
                let mut items = Vec::with_capacity(node.len());
                for (index, value) in node.elements().enumerate() {
                    let new_value = f(&self.descend(PathSegment::from(index)), &value)?;
                    changed |= !Arc::ptr_eq(&new_value, &value);
                    items.push(new_value);
                }
                if !changed {
                    return Ok(Arc::clone(node));
                }
                node.prototype()
                    .build_list(items)
                    .map_err(|source| self.build_error(source))
            }
            _ => Ok(Arc::clone(node)),
        }
    }

    pub(crate) fn build_error(&self, source: linkwalk_core::NodeBuildError) -> TraversalError {
        TraversalError::NodeBuild {
            path: self.path().clone(),
            source,
        }
    }
}
