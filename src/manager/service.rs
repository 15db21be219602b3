//! Gossip Manager
//!
//! Bootstraps the cluster and collects termination reports until every
//! member has left `Running`.
//!
//! ## Responsibilities
//! - **Bootstrap**: creates the seed members first, then the regular members,
//!   all starting from the same seed-list-plus-self view.
//! - **Collection**: a single consumer drains the report channel, so roster
//!   and aggregate updates never race.
//! - **Signalling**: broadcasts `Settled` once the roster is empty so members
//!   skip their remaining rounds, or `Cancelled` on timeout or external request.

use super::config::SimulationConfig;
use super::report::SimulationReport;
use super::roster::ActiveRoster;
use crate::member::member::{Member, PeerDirectory};
use crate::member::state::MemberState;
use crate::member::types::{MemberReport, RunPhase};

use anyhow::{Result, bail};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Requests cancellation of a running simulation from outside the manager.
#[derive(Clone)]
pub struct CancelHandle {
    phase: Arc<watch::Sender<RunPhase>>,
}

impl CancelHandle {
    /// Cancels the run if it is still in progress. Returns whether this call did so.
    pub fn cancel(&self) -> bool {
        self.phase.send_if_modified(|phase| {
            if *phase == RunPhase::Running {
                *phase = RunPhase::Cancelled;
                true
            } else {
                false
            }
        })
    }
}

pub struct GossipManager {
    config: SimulationConfig,
    phase: Arc<watch::Sender<RunPhase>>,
    reports: mpsc::UnboundedReceiver<MemberReport>,
    roster: ActiveRoster,
    members: Vec<JoinHandle<MemberState>>,
    started: Instant,
}

impl GossipManager {
    /// Validates `config`, builds the cluster and starts every member.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let settings = config.protocol_settings();
        let seeds = config.seed_ids();
        let directory: PeerDirectory = Arc::new(DashMap::with_capacity(config.cluster_size));
        let (phase_tx, phase_rx) = watch::channel(RunPhase::Running);
        let (report_tx, reports) = mpsc::unbounded_channel();

        let spawn_member = |id| {
            Member::new(
                MemberState::new(id, &seeds, settings),
                config.interval,
                directory.clone(),
                report_tx.clone(),
                phase_rx.clone(),
            )
        };

        let mut members = Vec::with_capacity(config.cluster_size);

        // Seeds are all registered before any of them starts.
        let seed_members: Vec<Member> = seeds.iter().map(|&id| spawn_member(id)).collect();
        members.extend(seed_members.into_iter().map(Member::start));
        tracing::info!("Started {} seed members", seeds.len());

        for id in config.peer_ids().skip(seeds.len()) {
            members.push(spawn_member(id).start());
        }

        tracing::info!(
            "Cluster of {} members started (interval={:?}, max_iterations={})",
            config.cluster_size,
            config.interval,
            config.max_iterations
        );

        Ok(Self {
            roster: ActiveRoster::new(config.peer_ids()),
            config,
            phase: Arc::new(phase_tx),
            reports,
            members,
            started: Instant::now(),
        })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            phase: self.phase.clone(),
        }
    }

    pub fn active_members(&self) -> usize {
        self.roster.len()
    }

    /// Waits until every member has reported, then returns the aggregated report.
    ///
    /// If the convergence timeout elapses first, the run is cancelled and the
    /// wait continues until the cancelled members have reported their failure.
    pub async fn run(mut self) -> Result<SimulationReport> {
        let deadline = self.config.convergence_timeout.map(|t| self.started + t);
        let mut timed_out = false;

        while !self.roster.is_empty() {
            let next = match deadline {
                Some(deadline) if !timed_out => {
                    tokio::select! {
                        report = self.reports.recv() => report,
                        () = tokio::time::sleep_until(deadline) => {
                            timed_out = true;
                            tracing::warn!(
                                "Convergence timeout reached with {} members still active",
                                self.roster.len()
                            );
                            self.cancel_handle().cancel();
                            continue;
                        }
                    }
                }
                _ => self.reports.recv().await,
            };

            let Some(report) = next else {
                bail!(
                    "all members stopped while {} were still active",
                    self.roster.len()
                );
            };

            if let Err(e) = self.roster.record(report) {
                tracing::error!("Rejected termination report: {}", e);
            }
        }

        let elapsed = self.started.elapsed();
        self.phase.send_if_modified(|phase| {
            if *phase == RunPhase::Running {
                *phase = RunPhase::Settled;
                true
            } else {
                false
            }
        });
        tracing::info!("All members terminated after {:?}", elapsed);

        for handle in self.members.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!("Member task failed: {}", e);
            }
        }

        Ok(self.roster.into_report(elapsed, self.config.cluster_size))
    }
}
