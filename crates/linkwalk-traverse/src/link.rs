//! Link resolution: deciding whether and how to cross a link.

use std::sync::Arc;

use linkwalk_core::{BudgetKind, Link, LinkContext, NodeRef, TraversalError};

use crate::progress::Progress;

/// Outcome of resolving a link.
#[derive(Debug)]
pub enum LinkStep {
    /// The target was loaded; continue the walk with `progress` at `node`.
    Loaded { progress: Progress, node: NodeRef },
    /// The link was already visited in this walk; do not descend.
    Skipped,
}

impl Progress {
    /// Resolve a link met at the current path.
    ///
    /// Checks cancellation, the link depth limit, the visit-once set and the
    /// link budget, in that order, then chooses a prototype, loads the target
    /// and conforms it. The returned progress is one link deeper at the same
    /// path. Callback failures are reported as
    /// [`TraversalError::LinkResolution`] and never retried.
    pub fn follow_link(
        &self,
        link: &Link,
        link_node: &NodeRef,
        parent: Option<&NodeRef>,
    ) -> Result<LinkStep, TraversalError> {
        self.check_cancelled()?;

        let cfg = self.config();
        if cfg.link_depth_limit > 0 && self.link_depth() + 1 > cfg.link_depth_limit {
            tracing::warn!(%link, path = %self.path(), limit = cfg.link_depth_limit, "link depth limit exceeded");
            return Err(TraversalError::LinkDepthExceeded {
                link: link.clone(),
                path: self.path().clone(),
                limit: cfg.link_depth_limit,
            });
        }

        if !self.first_visit(link) {
            tracing::debug!(%link, path = %self.path(), "skipping already visited link");
            return Ok(LinkStep::Skipped);
        }

        self.spend(BudgetKind::Link)?;

        let loader = cfg.load_link.as_ref().ok_or_else(|| {
            TraversalError::configuration("cannot load link: no link loader configured")
        })?;
        let chooser = cfg.choose_prototype.as_ref().ok_or_else(|| {
            TraversalError::configuration("cannot choose link target: no prototype chooser configured")
        })?;

        let ctx = self.link_context(link, link_node, parent);
        let prototype = chooser(link, &ctx).map_err(|err| self.resolution_error(link, err))?;

        tracing::debug!(
            %link,
            path = %self.path(),
            depth = self.link_depth() + 1,
            prototype = prototype.name(),
            "loading link"
        );
        let loaded = loader(link, &ctx).map_err(|err| self.resolution_error(link, err))?;
        let node = prototype
            .conform(loaded)
            .map_err(|err| self.resolution_error(link, err))?;

        Ok(LinkStep::Loaded {
            progress: self.cross_link(link),
            node,
        })
    }

    /// Write a rebuilt link target through the configured store.
    ///
    /// Returns a new link node, built with the original link node's prototype.
    /// When visiting links once, the rewrite is remembered so skipped
    /// occurrences of `link` can be redirected to the same new link.
    pub(crate) fn relink(
        &self,
        link: &Link,
        link_node: &NodeRef,
        parent: Option<&NodeRef>,
        target: &NodeRef,
    ) -> Result<NodeRef, TraversalError> {
        let store = self.config().store_link.as_ref().ok_or_else(|| {
            TraversalError::configuration("cannot store link: no link store configured")
        })?;

        let ctx = self.link_context(link, link_node, parent);
        let new_link = store(&ctx, target).map_err(|err| self.resolution_error(link, err))?;
        tracing::debug!(old = %link, new = %new_link, path = %self.path(), "stored rebuilt link target");
        self.record_relink(link, &new_link);

        link_node
            .prototype()
            .build_link(new_link)
            .map_err(|source| self.build_error(source))
    }

    /// Rebuild a skipped link node to point at the content its link was
    /// rewritten to, or keep it if the link was not rewritten.
    pub(crate) fn redirect_link(&self, link: &Link, link_node: &NodeRef) -> Result<NodeRef, TraversalError> {
        match self.relinked(link) {
            Some(new_link) => {
                tracing::debug!(old = %link, new = %new_link, path = %self.path(), "redirecting skipped link");
                link_node
                    .prototype()
                    .build_link(new_link)
                    .map_err(|source| self.build_error(source))
            }
            None => Ok(Arc::clone(link_node)),
        }
    }

    fn link_context(&self, link: &Link, link_node: &NodeRef, parent: Option<&NodeRef>) -> LinkContext {
        LinkContext {
            link: link.clone(),
            link_node: Arc::clone(link_node),
            parent_node: parent.cloned(),
            path: self.path().clone(),
            cancel: self.config().cancel.clone(),
        }
    }

    fn resolution_error(
        &self,
        link: &Link,
        err: impl Into<linkwalk_core::BoxError>,
    ) -> TraversalError {
        let err = TraversalError::link_resolution(link.clone(), self.path().clone(), err);
        tracing::debug!(%err, "link resolution failed");
        err
    }
}
