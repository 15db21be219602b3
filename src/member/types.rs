use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a simulated peer.
///
/// Ids are assigned in spawn order starting at 1, so a cluster of `n` peers
/// always uses exactly `1..=n`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeerId(pub u32);

impl PeerId {
    /// Zero-based slot of this peer in spawn order.
    pub fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a member. Leaves `Running` at most once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TerminalState {
    Running,
    /// The view reached the full cluster size.
    Converged,
    /// The round budget ran out (or the run was cancelled) before convergence.
    FailedExhausted,
}

/// Cluster-wide phase broadcast by the manager to every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Running,
    /// Every member has reported; remaining rounds are skipped.
    Settled,
    /// The run was aborted; members still running report a failure and stop.
    Cancelled,
}

/// The only message a member accepts from its peers.
#[derive(Debug, Clone)]
pub enum GossipMessage {
    /// A full copy of the sender's view, to be union-merged by the receiver.
    Push { from: PeerId, view: Vec<PeerId> },
}

/// Snapshot a member hands to the manager when it leaves `Running`.
#[derive(Debug, Clone, Serialize)]
pub struct MemberReport {
    pub peer_id: PeerId,
    pub state: TerminalState,
    /// Final view. The manager sorts it by peer id on receipt.
    pub view: Vec<PeerId>,
    /// Number of pushes this member received and merged.
    pub gossip_count: u64,
    /// Round in which the member terminated.
    pub round: u32,
    /// Set when the failure came from cancellation rather than the round budget.
    pub cancelled: bool,
}

impl MemberReport {
    pub fn view_size(&self) -> usize {
        self.view.len()
    }

    pub fn failed(&self) -> bool {
        self.state == TerminalState::FailedExhausted
    }
}

impl fmt::Display for MemberReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed() {
            write!(f, "FAILED ")?;
        }
        write!(
            f,
            "Peer {} member list size: {}, gossips: {}",
            self.peer_id,
            self.view_size(),
            self.gossip_count
        )
    }
}
