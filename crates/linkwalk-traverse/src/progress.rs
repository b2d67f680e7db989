//! Per-walk traversal state.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::Serialize;

use linkwalk_core::{BudgetKind, Link, Path, PathSegment, TraversalConfig, TraversalError};

use crate::seen::SeenLinks;

/// The most recent link crossed on the way to the current node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastBlock {
    /// Path at which the link was found.
    pub path: Path,
    /// The link that was followed.
    pub link: Link,
}

/// Remaining node and link allowance of a walk.
///
/// Shared by every `Progress` forked from the same root.
#[derive(Debug, Default)]
pub struct Budget {
    nodes: Option<AtomicU64>,
    links: Option<AtomicU64>,
}

impl Budget {
    /// Create a budget; `None` leaves that dimension unlimited.
    pub fn new(nodes: Option<u64>, links: Option<u64>) -> Self {
        Self {
            nodes: nodes.map(AtomicU64::new),
            links: links.map(AtomicU64::new),
        }
    }

    /// Spend one unit of `kind`. Returns `false` once the budget is exhausted.
    pub fn spend(&self, kind: BudgetKind) -> bool {
        let counter = match kind {
            BudgetKind::Node => &self.nodes,
            BudgetKind::Link => &self.links,
        };
        match counter {
            Some(remaining) => remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok(),
            None => true,
        }
    }

    /// Remaining allowance of `kind`, or `None` if unlimited.
    pub fn remaining(&self, kind: BudgetKind) -> Option<u64> {
        let counter = match kind {
            BudgetKind::Node => &self.nodes,
            BudgetKind::Link => &self.links,
        };
        counter.as_ref().map(|n| n.load(Ordering::Acquire))
    }
}

/// Cursor of a walk: where it is, how many links deep, and what it has seen.
///
/// A `Progress` is forked, never mutated, when the walk descends into a
/// child or follows a link. The configuration, the seen-link set and the
/// budget are shared by reference across all forks of one walk.
#[derive(Debug, Clone)]
pub struct Progress {
    cfg: Arc<TraversalConfig>,
    path: Path,
    link_depth: u32,
    seen_links: Option<Arc<SeenLinks>>,
    relinked: Option<Arc<DashMap<Link, Link>>>,
    budget: Option<Arc<Budget>>,
    last_block: Option<LastBlock>,
}

impl Progress {
    /// Derive the root progress of a walk.
    ///
    /// The configuration is completed with [`TraversalConfig::with_defaults`];
    /// the caller's copy is left untouched.
    pub fn new(config: &TraversalConfig) -> Self {
        let cfg = Arc::new(config.with_defaults());

        let seen_links = cfg.visit_only_once.then(|| Arc::new(SeenLinks::new()));
        let relinked = cfg.visit_only_once.then(|| Arc::new(DashMap::new()));
        let budget = (cfg.node_budget.is_some() || cfg.link_budget.is_some())
            .then(|| Arc::new(Budget::new(cfg.node_budget, cfg.link_budget)));

        Self {
            cfg,
            path: Path::root(),
            link_depth: 0,
            seen_links,
            relinked,
            budget,
            last_block: None,
        }
    }

    /// Configuration of this walk.
    pub fn config(&self) -> &TraversalConfig {
        &self.cfg
    }

    /// Path from the root to the current node.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of links followed to reach the current node.
    pub fn link_depth(&self) -> u32 {
        self.link_depth
    }

    /// Links loaded so far, if the walk visits links only once.
    pub fn seen_links(&self) -> Option<&SeenLinks> {
        self.seen_links.as_deref()
    }

    /// Remaining budget of `kind`, or `None` if unlimited.
    pub fn budget_remaining(&self, kind: BudgetKind) -> Option<u64> {
        self.budget.as_ref().and_then(|b| b.remaining(kind))
    }

    /// The last link crossed to reach the current node.
    pub fn last_block(&self) -> Option<&LastBlock> {
        self.last_block.as_ref()
    }

    /// Fork this progress one segment deeper.
    pub(crate) fn descend(&self, segment: PathSegment) -> Self {
        Self {
            path: self.path.append(segment),
            ..self.clone()
        }
    }

    /// Fork this progress across a followed link.
    pub(crate) fn cross_link(&self, link: &Link) -> Self {
        Self {
            link_depth: self.link_depth + 1,
            last_block: Some(LastBlock {
                path: self.path.clone(),
                link: link.clone(),
            }),
            ..self.clone()
        }
    }

    /// Record that the current node is about to be visited.
    pub(crate) fn enter_node(&self) -> Result<(), TraversalError> {
        self.check_cancelled()?;
        self.spend(BudgetKind::Node)
    }

    pub(crate) fn check_cancelled(&self) -> Result<(), TraversalError> {
        self.cfg.check_cancelled().inspect_err(|err| {
            tracing::warn!(path = %self.path, %err, "traversal cancelled");
        })
    }

    pub(crate) fn spend(&self, kind: BudgetKind) -> Result<(), TraversalError> {
        match &self.budget {
            Some(budget) if !budget.spend(kind) => {
                tracing::warn!(path = %self.path, budget = %kind, "traversal budget exhausted");
                Err(TraversalError::BudgetExceeded {
                    budget: kind,
                    path: self.path.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Remember that the content behind `old` was rewritten to `new`.
    ///
    /// Only kept when visiting links once, so later skipped occurrences of
    /// `old` can point at the same rewritten content.
    pub(crate) fn record_relink(&self, old: &Link, new: &Link) {
        if let Some(relinked) = &self.relinked {
            relinked.insert(old.clone(), new.clone());
        }
    }

    /// The link `old` was rewritten to earlier in this walk, if any.
    pub(crate) fn relinked(&self, old: &Link) -> Option<Link> {
        self.relinked
            .as_ref()
            .and_then(|relinked| relinked.get(old).map(|entry| entry.value().clone()))
    }

    /// Whether `link` should be loaded; records it when visiting only once.
    pub(crate) fn first_visit(&self, link: &Link) -> bool {
        match &self.seen_links {
            Some(seen) => seen.track(link.clone()),
            None => true,
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(&TraversalConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_new() {
        let progress = Progress::default();
        assert!(progress.path().is_empty());
        assert_eq!(progress.link_depth(), 0);
        assert!(progress.seen_links().is_none());
        assert!(progress.last_block().is_none());
        assert!(progress.config().choose_prototype.is_some());
    }

    #[test]
    fn test_visit_once_allocates_seen_set() {
        let config = TraversalConfig::builder()
            .visit_only_once(true)
            .build()
            .unwrap();
        let progress = Progress::new(&config);
        assert!(progress.seen_links().is_some_and(|s| s.is_empty()));
        // The caller's config is not filled in.
        assert!(config.choose_prototype.is_none());
    }

    #[test]
    fn test_forks_share_seen_set() {
        let config = TraversalConfig::builder()
            .visit_only_once(true)
            .build()
            .unwrap();
        let root = Progress::new(&config);
        let child = root.descend(PathSegment::from("a")).cross_link(&Link::new("x"));

        assert!(child.first_visit(&Link::new("x")));
        assert!(!root.first_visit(&Link::new("x")));
        assert_eq!(root.path().len(), 0);
        assert_eq!(child.path().to_string(), "a");
        assert_eq!(child.link_depth(), 1);
        assert_eq!(
            child.last_block().map(|b| b.link.clone()),
            Some(Link::new("x"))
        );
    }

    #[test]
    fn test_relinks_shared_across_forks() {
        let config = TraversalConfig::builder()
            .visit_only_once(true)
            .build()
            .unwrap();
        let root = Progress::new(&config);
        let child = root.descend(PathSegment::from("x"));

        child.record_relink(&Link::new("old"), &Link::new("new"));
        assert_eq!(root.relinked(&Link::new("old")), Some(Link::new("new")));
        assert_eq!(root.relinked(&Link::new("other")), None);

        // Without visit-once nothing is remembered.
        let plain = Progress::default();
        plain.record_relink(&Link::new("old"), &Link::new("new"));
        assert_eq!(plain.relinked(&Link::new("old")), None);
    }

    #[test]
    fn test_budget_spend() {
        let budget = Budget::new(Some(2), None);
        assert!(budget.spend(BudgetKind::Node));
        assert!(budget.spend(BudgetKind::Node));
        assert!(!budget.spend(BudgetKind::Node));
        assert_eq!(budget.remaining(BudgetKind::Node), Some(0));
        assert!(budget.spend(BudgetKind::Link));
        assert_eq!(budget.remaining(BudgetKind::Link), None);
    }

    #[test]
    fn test_node_budget_exhaustion() {
        let config = TraversalConfig::builder().node_budget(1u64).build().unwrap();
        let progress = Progress::new(&config);
        assert!(progress.enter_node().is_ok());
        let err = progress.enter_node().unwrap_err();
        assert!(matches!(
            err,
            TraversalError::BudgetExceeded {
                budget: BudgetKind::Node,
                ..
            }
        ));
    }
}
