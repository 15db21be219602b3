use crate::member::types::{MemberReport, PeerId, TerminalState};

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Outcome of a simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub cluster_size: usize,
    /// Per-member records, in termination order.
    pub records: Vec<MemberReport>,
    /// Sum of gossip counts over converged members only.
    pub total_gossips: u64,
    /// `total_gossips / cluster_size`.
    pub average_gossips: f64,
    pub any_failed: bool,
    /// Wall-clock time to convergence. Absent when any member failed.
    pub convergence_secs: Option<f64>,
}

impl SimulationReport {
    pub fn new(
        cluster_size: usize,
        records: Vec<MemberReport>,
        total_gossips: u64,
        any_failed: bool,
        elapsed: Duration,
    ) -> Self {
        let average_gossips = if cluster_size == 0 {
            0.0
        } else {
            total_gossips as f64 / cluster_size as f64
        };

        Self {
            cluster_size,
            records,
            total_gossips,
            average_gossips,
            any_failed,
            convergence_secs: (!any_failed).then(|| elapsed.as_secs_f64()),
        }
    }

    pub fn converged(&self) -> impl Iterator<Item = &MemberReport> {
        self.records
            .iter()
            .filter(|r| r.state == TerminalState::Converged)
    }

    pub fn failed(&self) -> impl Iterator<Item = &MemberReport> {
        self.records.iter().filter(|r| r.failed())
    }

    pub fn record(&self, peer_id: PeerId) -> Option<&MemberReport> {
        self.records.iter().find(|r| r.peer_id == peer_id)
    }
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for record in &self.records {
            writeln!(f, "{}", record)?;
        }
        if let Some(secs) = self.convergence_secs {
            writeln!(f, "Time to convergence: {:.3}", secs)?;
        }
        write!(
            f,
            "Total Gossips {}, Avg gossips per member: {:.3}",
            self.total_gossips, self.average_gossips
        )
    }
}
