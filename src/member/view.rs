//! Membership View
//!
//! The set of peers a member knows about. Entries are deduplicated by peer id
//! and kept in the order they were first learned, so positional target
//! selection sees a stable layout between merges.

use super::types::PeerId;

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipView {
    order: Vec<PeerId>,
    known: HashSet<PeerId>,
}

impl MembershipView {
    /// Bootstraps a view from the seed list followed by the owner itself.
    ///
    /// A seed bootstrapping its own view already finds itself in the seed
    /// list; the duplicate is dropped so the owner appears exactly once.
    pub fn from_seeds(seeds: &[PeerId], owner: PeerId) -> Self {
        let mut view = Self::default();
        for &peer in seeds.iter().chain(std::iter::once(&owner)) {
            view.insert(peer);
        }
        view
    }

    fn insert(&mut self, peer: PeerId) -> bool {
        if self.known.insert(peer) {
            self.order.push(peer);
            true
        } else {
            false
        }
    }

    /// Union-merges `incoming` into this view and returns how many peers were new.
    ///
    /// Never removes entries: the view only grows.
    pub fn merge(&mut self, incoming: &[PeerId]) -> usize {
        incoming.iter().filter(|&&peer| self.insert(peer)).count()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, peer: PeerId) -> bool {
        self.known.contains(&peer)
    }

    pub fn get(&self, index: usize) -> Option<PeerId> {
        self.order.get(index).copied()
    }

    pub fn position(&self, peer: PeerId) -> Option<usize> {
        self.order.iter().position(|&p| p == peer)
    }

    /// Copy of the view in learned order, as sent in a push.
    pub fn to_vec(&self) -> Vec<PeerId> {
        self.order.clone()
    }

    pub fn sorted(&self) -> Vec<PeerId> {
        let mut peers = self.order.clone();
        peers.sort_unstable();
        peers
    }
}
