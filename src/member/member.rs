//! Member Actor
//!
//! Runs one gossip participant as an independent tokio task.
//!
//! ## Responsibilities
//! - **Rounds**: waits one interval, pushes its view to a chosen peer, then
//!   checks for convergence or an exhausted budget.
//! - **Inbox**: merges pushes from other members. Only this task ever writes
//!   its view; peers reach it exclusively through its channel.
//! - **Reporting**: sends exactly one `MemberReport` to the manager when it
//!   leaves `Running`, including when the run is cancelled.

use super::state::MemberState;
use super::types::{GossipMessage, MemberReport, PeerId, RunPhase};

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

/// Inbox senders of every member, keyed by peer id.
pub type PeerDirectory = Arc<DashMap<PeerId, mpsc::UnboundedSender<GossipMessage>>>;

pub struct Member {
    state: MemberState,
    interval: Duration,
    inbox: mpsc::UnboundedReceiver<GossipMessage>,
    directory: PeerDirectory,
    reports: mpsc::UnboundedSender<MemberReport>,
    phase: watch::Receiver<RunPhase>,
}

impl Member {
    /// Creates the member and registers its inbox in `directory`.
    pub fn new(
        state: MemberState,
        interval: Duration,
        directory: PeerDirectory,
        reports: mpsc::UnboundedSender<MemberReport>,
        phase: watch::Receiver<RunPhase>,
    ) -> Self {
        let (inbox_tx, inbox) = mpsc::unbounded_channel();
        directory.insert(state.id(), inbox_tx);

        Self {
            state,
            interval,
            inbox,
            directory,
            reports,
            phase,
        }
    }

    pub fn id(&self) -> PeerId {
        self.state.id()
    }

    /// Spawns the round loop. The handle yields the final protocol state.
    pub fn start(self) -> tokio::task::JoinHandle<MemberState> {
        tokio::spawn(self.run())
    }

    /// Drives rounds until the budget is spent or the manager settles or
    /// cancels the run.
    pub async fn run(mut self) -> MemberState {
        tracing::debug!(
            "Member {} started with {} known peers",
            self.id(),
            self.state.view().len()
        );

        let round_timer = tokio::time::sleep(self.interval);
        tokio::pin!(round_timer);

        loop {
            tokio::select! {
                biased;

                changed = self.phase.changed() => {
                    // A dropped manager is treated as a cancellation.
                    let phase = match changed {
                        Ok(()) => *self.phase.borrow_and_update(),
                        Err(_) => RunPhase::Cancelled,
                    };
                    match phase {
                        RunPhase::Running => {}
                        RunPhase::Settled => {
                            tracing::trace!("Member {} stopping: cluster settled", self.id());
                            break;
                        }
                        RunPhase::Cancelled => {
                            if let Some(report) = self.state.cancel() {
                                tracing::warn!(
                                    "Member {} cancelled in round {} with {} known peers",
                                    self.id(),
                                    self.state.rounds_run(),
                                    self.state.view().len()
                                );
                                self.report(report);
                            }
                            break;
                        }
                    }
                }

                Some(message) = self.inbox.recv() => {
                    self.state.handle(message);
                }

                () = &mut round_timer => {
                    self.run_round();
                    if !self.state.has_rounds_left() {
                        break;
                    }
                    round_timer.as_mut().reset(Instant::now() + self.interval);
                }
            }
        }

        tracing::debug!(
            "Member {} stopped after {} rounds ({:?})",
            self.id(),
            self.state.rounds_run(),
            self.state.terminal()
        );

        self.state
    }

    fn run_round(&mut self) {
        if let Some((target, message)) = self.state.gossip() {
            self.deliver(target, message);
        } else {
            tracing::trace!("Member {} has no gossip target this round", self.id());
        }

        if let Some(report) = self.state.complete_round() {
            self.report(report);
        }
    }

    fn deliver(&self, target: PeerId, message: GossipMessage) {
        match self.directory.get(&target) {
            Some(inbox) => {
                if inbox.send(message).is_err() {
                    tracing::debug!("Peer {} has stopped, push from {} dropped", target, self.id());
                } else {
                    tracing::trace!("Member {} pushed view to {}", self.id(), target);
                }
            }
            None => {
                tracing::warn!("Member {} targeted unknown peer {}", self.id(), target);
            }
        }
    }

    fn report(&self, report: MemberReport) {
        if let Err(e) = self.reports.send(report) {
            tracing::warn!("Member {} could not report to manager: {}", self.id(), e);
        }
    }
}
