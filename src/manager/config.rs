use crate::member::selection::{DedupKey, TargetBound};
use crate::member::state::ProtocolSettings;
use crate::member::types::PeerId;

use anyhow::{Result, ensure};
use std::time::Duration;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;
pub const DEFAULT_CLUSTER_SIZE: usize = 200;
pub const DEFAULT_SEED_COUNT: usize = 3;
pub const DEFAULT_RNG_SEED_MULTIPLIER: u64 = 31;

/// Parameters of one simulation run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Wait before each round.
    pub interval: Duration,
    /// Round budget per member.
    pub max_iterations: u32,
    pub cluster_size: usize,
    /// Number of seed members. Ids `1..=seed_count` are the seeds.
    pub seed_count: usize,
    pub target_bound: TargetBound,
    pub dedup_key: DedupKey,
    pub rng_seed_multiplier: u64,
    /// Upper bound on the whole run. When it elapses, members still running
    /// are cancelled and reported as failed.
    pub convergence_timeout: Option<Duration>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            cluster_size: DEFAULT_CLUSTER_SIZE,
            seed_count: DEFAULT_SEED_COUNT,
            target_bound: TargetBound::ExcludeSelf,
            dedup_key: DedupKey::PeerIdentity,
            rng_seed_multiplier: DEFAULT_RNG_SEED_MULTIPLIER,
            convergence_timeout: None,
        }
    }
}

impl SimulationConfig {
    /// Config with the three required parameters and defaults for the rest.
    pub fn new(interval: Duration, max_iterations: u32, cluster_size: usize) -> Self {
        Self {
            interval,
            max_iterations,
            cluster_size,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.cluster_size > 0, "cluster size must be at least 1");
        ensure!(
            u32::try_from(self.cluster_size).is_ok(),
            "cluster size {} exceeds the peer id range",
            self.cluster_size
        );
        ensure!(self.seed_count > 0, "seed count must be at least 1");
        ensure!(
            self.seed_count <= self.cluster_size,
            "seed count {} exceeds cluster size {}",
            self.seed_count,
            self.cluster_size
        );
        ensure!(self.max_iterations > 0, "max iterations must be at least 1");
        Ok(())
    }

    pub fn protocol_settings(&self) -> ProtocolSettings {
        ProtocolSettings {
            cluster_size: self.cluster_size,
            max_iterations: self.max_iterations,
            target_bound: self.target_bound,
            dedup_key: self.dedup_key,
            rng_seed_multiplier: self.rng_seed_multiplier,
        }
    }

    pub fn seed_ids(&self) -> Vec<PeerId> {
        (1..=self.seed_count as u32).map(PeerId).collect()
    }

    /// All peer ids in spawn order: seeds first, then regular members.
    pub fn peer_ids(&self) -> impl Iterator<Item = PeerId> {
        (1..=self.cluster_size as u32).map(PeerId)
    }
}
