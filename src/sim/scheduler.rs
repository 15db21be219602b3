//! Sequential Reference Scheduler
//!
//! Runs the gossip protocol on a single thread with a fixed execution order:
//! in every round, members take their turn in id order, and each push is
//! merged into the receiver immediately. With per-peer RNG seeds this makes a
//! run fully reproducible, which the concurrent manager cannot guarantee.

use crate::manager::config::SimulationConfig;
use crate::manager::report::SimulationReport;
use crate::manager::roster::ActiveRoster;
use crate::member::state::MemberState;
use crate::member::types::PeerId;

use anyhow::{Context, Result};
use std::time::Instant;

pub struct SequentialSimulation {
    config: SimulationConfig,
    members: Vec<MemberState>,
    roster: ActiveRoster,
    rounds_run: u32,
}

impl SequentialSimulation {
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let settings = config.protocol_settings();
        let seeds = config.seed_ids();
        let members = config
            .peer_ids()
            .map(|id| MemberState::new(id, &seeds, settings))
            .collect();

        Ok(Self {
            roster: ActiveRoster::new(config.peer_ids()),
            config,
            members,
            rounds_run: 0,
        })
    }

    pub fn members(&self) -> &[MemberState] {
        &self.members
    }

    pub fn member(&self, id: PeerId) -> Option<&MemberState> {
        self.members.get(id.index())
    }

    pub fn roster(&self) -> &ActiveRoster {
        &self.roster
    }

    /// Executes one round for every member, in id order.
    ///
    /// Returns `false` once there is nothing left to run: either the round
    /// budget is spent or every member has terminated.
    pub fn step(&mut self) -> Result<bool> {
        if self.rounds_run >= self.config.max_iterations || self.roster.is_empty() {
            return Ok(false);
        }
        self.rounds_run += 1;

        for sender in 0..self.members.len() {
            if self.roster.is_empty() {
                break;
            }

            if let Some((target, message)) = self.members[sender].gossip() {
                let receiver = self
                    .members
                    .get_mut(target.index())
                    .with_context(|| format!("push to unknown peer {}", target))?;
                receiver.handle(message);
            }

            if let Some(report) = self.members[sender].complete_round() {
                self.roster.record(report)?;
            }
        }

        Ok(true)
    }

    /// Runs rounds until every member has terminated.
    pub fn run(&mut self) -> Result<SimulationReport> {
        let started = Instant::now();
        while self.step()? {}

        tracing::info!(
            "Sequential run finished after {} rounds, {} members still active",
            self.rounds_run,
            self.roster.len()
        );

        let report = SimulationReport::new(
            self.config.cluster_size,
            self.roster.records().to_vec(),
            self.roster.aggregate_gossip_count(),
            self.roster.any_failed(),
            started.elapsed(),
        );
        Ok(report)
    }
}
