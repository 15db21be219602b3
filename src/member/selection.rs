//! Gossip Target Selection
//!
//! Picks which peer in the view receives this round's push.
//!
//! ## Policies
//! - **`TargetBound`**: the range a random position is drawn from.
//!   `ExcludeLast` draws from `[0, len - 1)`, which skips the final entry of
//!   the view regardless of who sits there. On a freshly bootstrapped view the
//!   final entry is the owner, so this acts as self-exclusion until merges
//!   reorder things. `ExcludeSelf` always skips the owner and nobody else.
//! - **`DedupKey`**: what the visited history remembers. `Index` records drawn
//!   positions, so the same peer reached at a different position counts as
//!   unvisited. `PeerIdentity` records the peers themselves.

use super::types::PeerId;
use super::view::MembershipView;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TargetBound {
    ExcludeLast,
    ExcludeSelf,
}

impl TargetBound {
    /// Draws one position from `view`, or `None` if the policy leaves no candidate.
    ///
    /// `own_position` is where the owner sits in `view`; callers drawing
    /// repeatedly look it up once.
    pub fn draw<R: Rng>(
        self,
        view: &MembershipView,
        own_position: Option<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        match self {
            TargetBound::ExcludeLast => {
                let upper = view.len().saturating_sub(1);
                (upper > 0).then(|| rng.gen_range(0..upper))
            }
            TargetBound::ExcludeSelf => match own_position {
                Some(own) => {
                    let candidates = view.len().saturating_sub(1);
                    if candidates == 0 {
                        return None;
                    }
                    let drawn = rng.gen_range(0..candidates);
                    Some(if drawn >= own { drawn + 1 } else { drawn })
                }
                None if view.is_empty() => None,
                None => Some(rng.gen_range(0..view.len())),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DedupKey {
    Index,
    PeerIdentity,
}

#[derive(Debug, Clone)]
enum Visited {
    Index(HashSet<usize>),
    Peer(HashSet<PeerId>),
}

/// Targets a member has already pushed to during its lifetime.
#[derive(Debug, Clone)]
pub struct VisitedHistory {
    visited: Visited,
}

impl VisitedHistory {
    pub fn new(key: DedupKey) -> Self {
        let visited = match key {
            DedupKey::Index => Visited::Index(HashSet::new()),
            DedupKey::PeerIdentity => Visited::Peer(HashSet::new()),
        };
        Self { visited }
    }

    /// Records the target drawn at `index`. Returns `false` if it was already visited.
    pub fn record(&mut self, index: usize, peer: PeerId) -> bool {
        match &mut self.visited {
            Visited::Index(seen) => seen.insert(index),
            Visited::Peer(seen) => seen.insert(peer),
        }
    }

    pub fn len(&self) -> usize {
        match &self.visited {
            Visited::Index(seen) => seen.len(),
            Visited::Peer(seen) => seen.len(),
        }
    }
}
