//! Gossip Convergence Simulator Library
//!
//! Simulates an anti-entropy gossip membership protocol: a fixed-size cluster
//! of in-process peers starts with partial knowledge of each other and
//! exchanges membership views until every peer knows the full roster or runs
//! out of rounds. The binary (`main.rs`) reports convergence time and gossip
//! overhead per peer.
//!
//! ## Architecture Modules
//! - **`member`**: The protocol participant. Each member is a tokio task that
//!   owns its view and receives pushes from other members through a channel.
//! - **`manager`**: The orchestrator. Bootstraps seed and regular members,
//!   collects termination reports and aggregates statistics.
//! - **`sim`**: A sequential scheduler that drives the same protocol logic in
//!   a fixed order for reproducible runs.

pub mod manager;
pub mod member;
pub mod sim;
