//! End-of-workout summary printed by the binary

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::TimerControl;
use crate::state::TimerState;
use crate::timer::Timer;
use crate::utils::format::format_elapsed;
use crate::workouts::{Workout, WorkoutKind};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutReport {
    pub workout: WorkoutKind,
    pub state: TimerState,
    #[serde(with = "crate::utils::serde_millis")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rounds: Option<u32>,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        with = "crate::utils::serde_millis::vec"
    )]
    pub split_times: Vec<Duration>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl WorkoutReport {
    /// Capture the final state of `timer`
    pub fn new<E>(timer: &Timer<E>, started_at: DateTime<Utc>) -> Self
    where
        E: TimerControl<Behavior = Workout>,
    {
        Self {
            workout: timer.kind(),
            state: timer.state(),
            elapsed: timer.elapsed(),
            rounds: timer.rounds(),
            split_times: timer.split_times(),
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Whether the workout ran to completion rather than being stopped
    pub fn completed(&self) -> bool {
        self.state == TimerState::Finished
    }

    /// Human readable summary lines
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} {} after {}",
            self.workout,
            self.state,
            format_elapsed(self.elapsed)
        )];
        if let Some(rounds) = self.rounds {
            lines.push(format!("Rounds: {}", rounds));
        }
        for (index, split) in self.split_times.iter().enumerate() {
            lines.push(format!("  Round {}: {}", index + 1, format_elapsed(*split)));
        }
        lines
    }
}
