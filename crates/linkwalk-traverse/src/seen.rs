//! Visited-link tracking for visit-once walks.

use dashmap::DashSet;
use linkwalk_core::Link;

/// Links loaded so far by one visit-once walk.
///
/// Shared by every `Progress` forked from the same root. Claiming a link is
/// a single `DashSet::insert`, so two sibling subtrees walked in parallel
/// cannot both load it.
#[derive(Debug, Default)]
pub struct SeenLinks {
    links: DashSet<Link>,
}

impl SeenLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `link` for loading. `false` means another branch already did.
    pub fn track(&self, link: Link) -> bool {
        self.links.insert(link)
    }

    /// Number of distinct links loaded.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_claimed_once() {
        let seen = SeenLinks::new();
        assert!(seen.is_empty());

        assert!(seen.track(Link::new("a")));
        assert!(!seen.track(Link::new("a")));
        assert!(seen.track(Link::new("b")));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_concurrent_claims() {
        use rayon::prelude::*;

        let seen = SeenLinks::new();
        let winners = (0..64)
            .into_par_iter()
            .filter(|_| seen.track(Link::new("shared")))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(seen.len(), 1);
    }
}
