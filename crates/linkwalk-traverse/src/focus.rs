//! Single-path traversals: focus, get and focused transform.

use std::sync::Arc;

use linkwalk_core::{
    BasicPrototype, Kind, NodeRef, Path, PathSegment, PrototypeRef, TraversalError, Value, link_of,
};

use crate::link::LinkStep;
use crate::progress::Progress;

impl Progress {
    /// Walk `path` from `node` and hand the addressed node to `visit`.
    pub fn focus<F>(&self, node: &NodeRef, path: &Path, visit: F) -> Result<(), TraversalError>
    where
        F: FnOnce(&Progress, &NodeRef) -> Result<(), TraversalError>,
    {
        let (progress, target) = self.focus_node(node, path)?;
        visit(&progress, &target)
    }

    /// Return the node addressed by `path`.
    pub fn get(&self, node: &NodeRef, path: &Path) -> Result<NodeRef, TraversalError> {
        self.focus_node(node, path).map(|(_, target)| target)
    }

    /// Walk `path` from `node`, following links on the way.
    ///
    /// A link found at the end of the path is followed too, so the returned
    /// node is never a link. The returned progress' path equals `path`
    /// prefixed by this progress' path.
    pub fn focus_node(&self, node: &NodeRef, path: &Path) -> Result<(Progress, NodeRef), TraversalError> {
        let mut progress = self.clone();
        let mut current = Arc::clone(node);
        let mut parent: Option<NodeRef> = None;

        for segment in path {
            (progress, current) = progress.resolve_links(current, parent.as_ref())?;
            let child = current.lookup(segment).ok_or_else(|| TraversalError::PathNotFound {
                path: progress.path().append(segment.clone()),
            })?;
            progress = progress.descend(segment.clone());
            parent = Some(current);
            current = child;
        }

        progress.resolve_links(current, parent.as_ref())
    }

    /// Replace the node addressed by `path` and rebuild its ancestors.
    ///
    /// `transform` receives the current node, or `None` when `create_parents`
    /// is set and the path does not exist yet. With `create_parents`, missing
    /// map entries are inserted (intermediate maps or lists are created
    /// according to the next segment) and a list index equal to the list
    /// length appends. Links along the path are followed, and changed link
    /// targets are written with the configured link store.
    pub fn focused_transform<F>(
        &self,
        node: &NodeRef,
        path: &Path,
        transform: F,
        create_parents: bool,
    ) -> Result<NodeRef, TraversalError>
    where
        F: FnOnce(&Progress, Option<NodeRef>) -> Result<NodeRef, TraversalError>,
    {
        self.focused_step(Some(Arc::clone(node)), None, path.segments(), transform, create_parents)
    }

    fn resolve_links(
        &self,
        mut node: NodeRef,
        parent: Option<&NodeRef>,
    ) -> Result<(Progress, NodeRef), TraversalError> {
        let mut progress = self.clone();
        while let Some(link) = link_of(&*node) {
            match progress.follow_link(&link, &node, parent)? {
                LinkStep::Loaded {
                    progress: next,
                    node: target,
                } => {
                    progress = next;
                    node = target;
                }
                LinkStep::Skipped => {
                    return Err(TraversalError::PathNotFound {
                        path: progress.path().clone(),
                    });
                }
            }
        }
        Ok((progress, node))
    }

    fn focused_step<F>(
        &self,
        node: Option<NodeRef>,
        parent: Option<&NodeRef>,
        remaining: &[PathSegment],
        transform: F,
        create_parents: bool,
    ) -> Result<NodeRef, TraversalError>
    where
        F: FnOnce(&Progress, Option<NodeRef>) -> Result<NodeRef, TraversalError>,
    {
        let node = match (node, remaining.first()) {
            (Some(node), _) => node,
            (None, None) => return transform(self, None),
            (None, Some(next)) => {
                let prototype: PrototypeRef = match parent {
                    Some(parent) => parent.prototype(),
                    None => Arc::new(BasicPrototype),
                };
                match next {
                    PathSegment::Int(_) => prototype.build_list(Vec::new()),
                    PathSegment::String(_) => prototype.build_map(Vec::new()),
                }
                .map_err(|source| self.build_error(source))?
            }
        };

        if let Some(link) = link_of(&*node) {
            return match self.follow_link(&link, &node, parent)? {
                LinkStep::Loaded {
                    progress,
                    node: target,
                } => {
                    let rebuilt = progress.focused_step(
                        Some(Arc::clone(&target)),
                        parent,
                        remaining,
                        transform,
                        create_parents,
                    )?;
                    if Arc::ptr_eq(&rebuilt, &target) {
                        Ok(node)
                    } else {
                        self.relink(&link, &node, parent, &rebuilt)
                    }
                }
                LinkStep::Skipped => Err(TraversalError::PathNotFound {
                    path: self.path().clone(),
                }),
            };
        }

        let Some((segment, rest)) = remaining.split_first() else {
            return transform(self, Some(node));
        };

        let child = node.lookup(segment);
        if child.is_none() && !create_parents {
            return Err(self.not_found(segment));
        }

        let new_child = self.descend(segment.clone()).focused_step(
            child.clone(),
            Some(&node),
            rest,
            transform,
            create_parents,
        )?;
        if child.is_some_and(|old| Arc::ptr_eq(&old, &new_child)) {
            return Ok(node);
        }
        self.replace_child(&node, segment, new_child)
    }

    fn replace_child(
        &self,
        node: &NodeRef,
        segment: &PathSegment,
        new_child: NodeRef,
    ) -> Result<NodeRef, TraversalError> {
        match node.kind() {
            Kind::Map => {
                let key = segment.as_str().ok_or_else(|| self.not_found(segment))?;
                let mut replacement = Some(new_child);
                let mut entries = Vec::with_capacity(node.len() + 1);
                for (k, v) in node.entries() {
                    let is_target = PathSegment::from_key_node(&*k)?.as_str() == Some(key);
                    match replacement.take_if(|_| is_target) {
                        Some(new_value) => entries.push((k, new_value)),
                        None => entries.push((k, v)),
                    }
                }
                if let Some(new_value) = replacement {
                    entries.push((Value::string(key), new_value));
                }
                node.prototype()
                    .build_map(entries)
                    .map_err(|source| self.build_error(source))
            }
            Kind::List => {
                let index = segment.as_index().ok_or_else(|| self.not_found(segment))?;
                let mut items: Vec<NodeRef> = node.elements().collect();
                if index < items.len() {
                    items[index] = new_child;
                } else if index == items.len() {
                    items.push(new_child);
                } else {
                    return Err(self.not_found(segment));
                }
                node.prototype()
                    .build_list(items)
                    .map_err(|source| self.build_error(source))
            }
            _ => Err(self.not_found(segment)),
        }
    }

    fn not_found(&self, segment: &PathSegment) -> TraversalError {
        TraversalError::PathNotFound {
            path: self.path().append(segment.clone()),
        }
    }
}
