//! Member Protocol State
//!
//! The synchronous core of a gossip participant: view, peer-local RNG, visited
//! history, counters and terminal state. It performs no I/O and never waits,
//! so the same logic drives both the async actor (`Member`) and the
//! single-threaded reference scheduler.

use super::selection::{DedupKey, TargetBound, VisitedHistory};
use super::types::{GossipMessage, MemberReport, PeerId, TerminalState};
use super::view::MembershipView;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Per-member protocol knobs, shared by every member of a run.
#[derive(Debug, Clone, Copy)]
pub struct ProtocolSettings {
    pub cluster_size: usize,
    pub max_iterations: u32,
    pub target_bound: TargetBound,
    pub dedup_key: DedupKey,
    /// Each member seeds its RNG with `id * rng_seed_multiplier`.
    pub rng_seed_multiplier: u64,
}

pub struct MemberState {
    id: PeerId,
    view: MembershipView,
    rng: ChaCha8Rng,
    history: VisitedHistory,
    gossip_count: u64,
    terminal: TerminalState,
    rounds_run: u32,
    settings: ProtocolSettings,
}

impl MemberState {
    pub fn new(id: PeerId, seeds: &[PeerId], settings: ProtocolSettings) -> Self {
        let seed = u64::from(id.0).wrapping_mul(settings.rng_seed_multiplier);
        Self {
            id,
            view: MembershipView::from_seeds(seeds, id),
            rng: ChaCha8Rng::seed_from_u64(seed),
            history: VisitedHistory::new(settings.dedup_key),
            gossip_count: 0,
            terminal: TerminalState::Running,
            rounds_run: 0,
            settings,
        }
    }

    pub fn id(&self) -> PeerId {
        self.id
    }

    pub fn view(&self) -> &MembershipView {
        &self.view
    }

    pub fn gossip_count(&self) -> u64 {
        self.gossip_count
    }

    pub fn terminal(&self) -> TerminalState {
        self.terminal
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal != TerminalState::Running
    }

    pub fn rounds_run(&self) -> u32 {
        self.rounds_run
    }

    pub fn has_rounds_left(&self) -> bool {
        self.rounds_run < self.settings.max_iterations
    }

    /// Chooses this round's gossip target.
    ///
    /// Up to `cluster_size` draws are made looking for a target missing from
    /// the visited history; when every draw hits a visited target the last
    /// one is used anyway.
    pub fn select_target(&mut self) -> Option<PeerId> {
        let bound = self.settings.target_bound;
        let own_position = self.view.position(self.id);
        let mut index = bound.draw(&self.view, own_position, &mut self.rng)?;

        for attempt in 0..self.settings.cluster_size {
            if attempt > 0 {
                index = bound.draw(&self.view, own_position, &mut self.rng)?;
            }
            let peer = self.view.get(index)?;
            if self.history.record(index, peer) {
                break;
            }
        }

        self.view.get(index)
    }

    /// Builds this round's push: the target and a copy of the current view.
    pub fn gossip(&mut self) -> Option<(PeerId, GossipMessage)> {
        let target = self.select_target()?;
        let message = GossipMessage::Push {
            from: self.id,
            view: self.view.to_vec(),
        };
        Some((target, message))
    }

    /// Merges a received view. Returns how many peers were learned.
    pub fn absorb(&mut self, incoming: &[PeerId]) -> usize {
        self.gossip_count += 1;
        self.view.merge(incoming)
    }

    pub fn handle(&mut self, message: GossipMessage) -> usize {
        match message {
            GossipMessage::Push { from, view } => {
                let learned = self.absorb(&view);
                tracing::trace!(
                    "Peer {} merged push from {} (+{}, view={})",
                    self.id,
                    from,
                    learned,
                    self.view.len()
                );
                learned
            }
        }
    }

    /// Closes the current round and applies the convergence and budget checks.
    ///
    /// Returns a report exactly when this round moved the member out of `Running`.
    pub fn complete_round(&mut self) -> Option<MemberReport> {
        self.rounds_run += 1;

        if !self.is_terminal() && self.view.len() == self.settings.cluster_size {
            self.terminal = TerminalState::Converged;
            tracing::debug!("Peer {} converged in round {}", self.id, self.rounds_run);
            return Some(self.report(false));
        }

        if !self.has_rounds_left() && !self.is_terminal() {
            self.terminal = TerminalState::FailedExhausted;
            tracing::debug!(
                "Peer {} exhausted {} rounds knowing {} of {} peers",
                self.id,
                self.rounds_run,
                self.view.len(),
                self.settings.cluster_size
            );
            return Some(self.report(false));
        }

        None
    }

    /// Marks a still-running member as failed because the run was cancelled.
    pub fn cancel(&mut self) -> Option<MemberReport> {
        if self.is_terminal() {
            return None;
        }
        self.terminal = TerminalState::FailedExhausted;
        Some(self.report(true))
    }

    pub fn report(&self, cancelled: bool) -> MemberReport {
        MemberReport {
            peer_id: self.id,
            state: self.terminal,
            view: self.view.to_vec(),
            gossip_count: self.gossip_count,
            round: self.rounds_run,
            cancelled,
        }
    }
}
