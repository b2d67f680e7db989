//! Traversal configuration types.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use derive_builder::Builder;
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, TraversalError};
use crate::link::{Link, LinkContext};
use crate::node::{NodeRef, PrototypeRef};

/// Loads the node a link points to.
pub type LinkLoader = Arc<dyn Fn(&Link, &LinkContext) -> Result<NodeRef, BoxError> + Send + Sync>;

/// Chooses the prototype a link's target is built with.
pub type PrototypeChooser =
    Arc<dyn Fn(&Link, &LinkContext) -> Result<PrototypeRef, BoxError> + Send + Sync>;

/// Persists a rebuilt link target and returns its new link.
pub type LinkStore = Arc<dyn Fn(&LinkContext, &NodeRef) -> Result<Link, BoxError> + Send + Sync>;

/// Policies for a walk.
///
/// The configuration is read-only once a walk starts and is shared by every
/// recursive frame. Omitting `load_link` is fine for link-free data; the
/// first link met then fails with a configuration error.
#[derive(Clone, Builder)]
#[builder(setter(into))]
pub struct TraversalConfig {
    /// Loads link targets.
    #[builder(setter(custom), default)]
    pub load_link: Option<LinkLoader>,

    /// Chooses the prototype for link targets.
    #[builder(setter(custom), default)]
    pub choose_prototype: Option<PrototypeChooser>,

    /// Stores link targets rebuilt by transforms.
    #[builder(setter(custom), default)]
    pub store_link: Option<LinkStore>,

    /// Load every distinct link at most once per walk.
    #[builder(default = "false")]
    pub visit_only_once: bool,

    /// Maximum number of nested links to follow (0 = unlimited).
    #[builder(default = "0")]
    pub link_depth_limit: u32,

    /// Maximum number of nodes to visit (None = unlimited).
    #[builder(default, setter(strip_option))]
    pub node_budget: Option<u64>,

    /// Maximum number of links to follow (None = unlimited).
    #[builder(default, setter(strip_option))]
    pub link_budget: Option<u64>,

    /// Token checked before every link resolution and node visit.
    #[builder(default)]
    pub cancel: CancellationToken,

    /// Point in time after which the walk is cancelled.
    #[builder(default, setter(strip_option))]
    pub deadline: Option<Instant>,
}

impl TraversalConfigBuilder {
    /// Set the link loader.
    pub fn load_link<F>(&mut self, loader: F) -> &mut Self
    where
        F: Fn(&Link, &LinkContext) -> Result<NodeRef, BoxError> + Send + Sync + 'static,
    {
        self.load_link = Some(Some(Arc::new(loader)));
        self
    }

    /// Set the prototype chooser.
    pub fn choose_prototype<F>(&mut self, chooser: F) -> &mut Self
    where
        F: Fn(&Link, &LinkContext) -> Result<PrototypeRef, BoxError> + Send + Sync + 'static,
    {
        self.choose_prototype = Some(Some(Arc::new(chooser)));
        self
    }

    /// Set the link store used by transforms.
    pub fn store_link<F>(&mut self, store: F) -> &mut Self
    where
        F: Fn(&LinkContext, &NodeRef) -> Result<Link, BoxError> + Send + Sync + 'static,
    {
        self.store_link = Some(Some(Arc::new(store)));
        self
    }
}

impl TraversalConfig {
    /// Create a new config builder.
    pub fn builder() -> TraversalConfigBuilder {
        TraversalConfigBuilder::default()
    }

    /// Return a copy with every unset policy filled in.
    ///
    /// A missing prototype chooser is replaced by
    /// [`default_prototype_chooser`](Self::default_prototype_chooser). The
    /// loader has no safe default and stays unset.
    pub fn with_defaults(&self) -> Self {
        let mut config = self.clone();
        if config.choose_prototype.is_none() {
            config.choose_prototype = Some(Self::default_prototype_chooser());
        }
        config
    }

    /// Chooser that defers to the target prototype declared by a typed link node.
    pub fn default_prototype_chooser() -> PrototypeChooser {
        Arc::new(|_link: &Link, ctx: &LinkContext| {
            ctx.link_node
                .link_target_prototype()
                .ok_or_else(|| BoxError::from("no prototype chooser configured"))
        })
    }

    /// Fail if the walk was cancelled or its deadline has passed.
    pub fn check_cancelled(&self) -> Result<(), TraversalError> {
        if self.cancel.is_cancelled() {
            return Err(TraversalError::cancelled("cancellation token fired"));
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(TraversalError::cancelled("deadline exceeded"));
        }
        Ok(())
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            load_link: None,
            choose_prototype: None,
            store_link: None,
            visit_only_once: false,
            link_depth_limit: 0,
            node_budget: None,
            link_budget: None,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }
}

impl fmt::Debug for TraversalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraversalConfig")
            .field("load_link", &self.load_link.is_some())
            .field("choose_prototype", &self.choose_prototype.is_some())
            .field("store_link", &self.store_link.is_some())
            .field("visit_only_once", &self.visit_only_once)
            .field("link_depth_limit", &self.link_depth_limit)
            .field("node_budget", &self.node_budget)
            .field("link_budget", &self.link_budget)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("deadline", &self.deadline)
            .finish()
    }
}
