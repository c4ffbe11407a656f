//! Input actions and the control state the frame driver reads.
//!
//! # Invariants
//! - Hosts never touch the world directly; they submit [`Action`]s.
//! - Control values are last-write-wins. Camera deltas accumulate until the
//!   next frame takes them.
//! - Applying actions never blocks and never fails.

pub mod action;
mod state;

pub use action::Action;
pub use state::{CameraDelta, InputState};
