//! Immutable derived-state value published to observers

use std::time::Duration;

use serde::Serialize;

use super::TimerState;
use crate::workouts::{IntervalKind, TabataPhase};

/// Everything an observer may read about a timer at one instant.
///
/// Variant-specific fields are `None` for workouts that do not define them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub state: TimerState,
    #[serde(with = "crate::utils::serde_millis")]
    pub elapsed: Duration,
    #[serde(with = "crate::utils::serde_millis")]
    pub remaining: Duration,
    /// Percentage in `[0, 100]`
    pub progress: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_round: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_rounds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_intervals: Option<u32>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::serde_millis::option"
    )]
    pub interval_remaining: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_kind: Option<IntervalKind>,

    // Tabata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_working: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<TabataPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_set: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sets: Option<u32>,

    // For time
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::serde_millis::option"
    )]
    pub current_round_time: Option<Duration>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::serde_millis::option"
    )]
    pub time_cap: Option<Duration>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        with = "crate::utils::serde_millis::vec"
    )]
    pub split_times: Vec<Duration>,

    // Countdown decorator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_countdown: Option<bool>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "crate::utils::serde_millis::option"
    )]
    pub countdown_remaining: Option<Duration>,
}

impl TimerSnapshot {
    /// Base snapshot for a timer running against `total` duration.
    ///
    /// `remaining = max(0, total - elapsed)` and
    /// `progress = min(100, 100 * elapsed / total)`.
    pub fn new(state: TimerState, elapsed: Duration, total: Duration) -> Self {
        Self {
            state,
            elapsed,
            remaining: total.saturating_sub(elapsed),
            progress: progress(elapsed, total),
            ..Self::default()
        }
    }

    pub fn with_rounds(mut self, current: u32, total: Option<u32>) -> Self {
        self.current_round = Some(current);
        self.total_rounds = total;
        self
    }
}

/// Percentage of `total` covered by `elapsed`, clamped to `[0, 100]`
pub fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
}
