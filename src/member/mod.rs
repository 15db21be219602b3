//! Gossip Member Module
//!
//! A member is one simulated peer of the anti-entropy membership protocol. It
//! starts out knowing only the seed members and itself, and learns the rest of
//! the cluster by pushing its view to random known peers and merging the views
//! pushed to it.
//!
//! ## Submodules
//! - **`types`**: peer identity, terminal states, messages and reports.
//! - **`view`**: the deduplicated, grow-only membership view.
//! - **`selection`**: gossip target policies and the visited history.
//! - **`state`**: the synchronous protocol state machine.
//! - **`member`**: the tokio task that owns a `MemberState` and services its inbox.

pub mod member;
pub mod selection;
pub mod state;
pub mod types;
pub mod view;
