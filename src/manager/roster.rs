//! Active Roster
//!
//! Tracks which members have not yet terminated and accumulates the run's
//! statistics. It has a single owner (the manager's collector or the
//! sequential scheduler), so every termination report is applied as one
//! serialized step.

use super::report::SimulationReport;
use crate::member::types::{MemberReport, PeerId, TerminalState};

use anyhow::{Result, ensure};
use std::collections::BTreeSet;
use std::time::Duration;

pub struct ActiveRoster {
    active: BTreeSet<PeerId>,
    aggregate_gossip_count: u64,
    any_failed: bool,
    records: Vec<MemberReport>,
}

impl ActiveRoster {
    pub fn new(peers: impl IntoIterator<Item = PeerId>) -> Self {
        Self {
            active: peers.into_iter().collect(),
            aggregate_gossip_count: 0,
            any_failed: false,
            records: Vec::new(),
        }
    }

    /// Applies one termination report and removes the member from the roster.
    ///
    /// Only converged members add to the aggregate gossip count. A report for
    /// a member that is not active (unknown or already reported) is rejected
    /// and leaves the roster untouched.
    pub fn record(&mut self, mut report: MemberReport) -> Result<()> {
        ensure!(
            report.state != TerminalState::Running,
            "peer {} reported while still running",
            report.peer_id
        );
        ensure!(
            self.active.remove(&report.peer_id),
            "peer {} is not in the active roster",
            report.peer_id
        );

        report.view.sort_unstable();

        if report.state == TerminalState::Converged {
            self.aggregate_gossip_count += report.gossip_count;
        } else {
            self.any_failed = true;
        }
        tracing::info!("{}", report);
        tracing::debug!("{} members still active", self.active.len());
        self.records.push(report);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn contains(&self, peer: PeerId) -> bool {
        self.active.contains(&peer)
    }

    pub fn aggregate_gossip_count(&self) -> u64 {
        self.aggregate_gossip_count
    }

    pub fn any_failed(&self) -> bool {
        self.any_failed
    }

    /// Reports received so far, in termination order.
    pub fn records(&self) -> &[MemberReport] {
        &self.records
    }

    pub fn into_report(self, elapsed: Duration, cluster_size: usize) -> SimulationReport {
        SimulationReport::new(
            cluster_size,
            self.records,
            self.aggregate_gossip_count,
            self.any_failed,
            elapsed,
        )
    }
}
