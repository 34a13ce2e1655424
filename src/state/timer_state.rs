//! Timer lifecycle state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a timer, the single source of truth for what a timer
/// is currently doing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Ready,
    Running,
    Paused,
    Finished,
    Cancelled,
}

impl TimerState {
    /// Whether `start` is permitted from this state
    pub fn can_start(&self) -> bool {
        matches!(self, TimerState::Idle | TimerState::Ready)
    }

    /// Check if the timer is running or paused
    pub fn is_active(&self) -> bool {
        matches!(self, TimerState::Running | TimerState::Paused)
    }

    /// Finished and Cancelled can only be left through `reset`
    pub fn is_terminal(&self) -> bool {
        matches!(self, TimerState::Finished | TimerState::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Ready => "ready",
            TimerState::Running => "running",
            TimerState::Paused => "paused",
            TimerState::Finished => "finished",
            TimerState::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
