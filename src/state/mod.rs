//! State management module
//!
//! This module contains the lifecycle state, the published snapshot, and the
//! elapsed-time bookkeeping shared by every timer.

pub mod snapshot;
pub mod stopwatch;
pub mod timer_state;

// Re-export main types
pub use snapshot::TimerSnapshot;
pub use stopwatch::Stopwatch;
pub use timer_state::TimerState;
