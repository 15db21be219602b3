//! Deterministic Simulation Module
//!
//! A single-threaded scheduler for the gossip protocol, used to reproduce runs
//! exactly and to study convergence without scheduling noise.

pub mod scheduler;
