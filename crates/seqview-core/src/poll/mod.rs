//! Periodic refresh of the sequence view.
//!
//! Three loops keep the view fresh:
//! 1. the sequence list of the current project,
//! 2. traces of unfinished sequences other than the selection,
//! 3. traces of the selected sequence (single slot, replaced on reselect).
//!
//! Loops never capture data at start; they read the shared cells when they
//! fire. No loop retries a failed fetch.

pub mod fire;
pub mod scheduler;
pub mod slot;

pub use scheduler::{PollScheduler, PollTask, SelectedPoll};
pub use slot::TaskSlot;
