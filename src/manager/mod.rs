//! Cluster Orchestration Module
//!
//! Builds a cluster of members, waits for every one of them to converge or
//! give up, and aggregates the outcome.
//!
//! ## Submodules
//! - **`config`**: run parameters, defaults and validation.
//! - **`roster`**: the set of still-active members and the running statistics.
//! - **`report`**: the final per-member records and summary.
//! - **`service`**: the `GossipManager` that spawns members and collects their reports.

pub mod config;
pub mod report;
pub mod roster;
pub mod service;

#[cfg(test)]
mod tests;
