//! For time: count up to a cap while the athlete reports finished rounds

use std::time::Duration;
use tracing::info;

use super::config::{secs, ForTimeConfig};
use crate::engine::{ActionOutcome, TimerBehavior, WorkoutAction};
use crate::events::{EventBus, TimerEvent};
use crate::state::{TimerSnapshot, TimerState};

#[derive(Debug, Clone)]
pub struct ForTime {
    time_cap: Duration,
    rounds: u32,
    /// 1-based round the athlete is working on
    current_round: u32,
    /// Rounds reported done, including a final one that ended the workout
    completed_rounds: u32,
    /// Elapsed time at which the current round began
    round_started: Duration,
    /// Append-only. Depends on when rounds were reported, so it cannot be
    /// recomputed from elapsed time.
    split_times: Vec<Duration>,
}

impl ForTime {
    pub fn new(config: &ForTimeConfig) -> Self {
        Self {
            time_cap: secs(config.time_cap_minutes.saturating_mul(60)),
            rounds: config.rounds,
            current_round: 1,
            completed_rounds: 0,
            round_started: Duration::ZERO,
            split_times: Vec::new(),
        }
    }

    pub fn split_times(&self) -> &[Duration] {
        &self.split_times
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn completed_rounds(&self) -> u32 {
        self.completed_rounds
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn time_cap(&self) -> Duration {
        self.time_cap
    }

    pub fn is_time_capped(&self, elapsed: Duration) -> bool {
        elapsed >= self.time_cap
    }
}

impl TimerBehavior for ForTime {
    fn total_duration(&self) -> Duration {
        self.time_cap
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot {
        let mut snapshot = TimerSnapshot::new(state, elapsed, self.time_cap)
            .with_rounds(self.current_round, Some(self.rounds));
        snapshot.current_round_time = Some(elapsed.saturating_sub(self.round_started));
        snapshot.time_cap = Some(self.time_cap);
        snapshot.split_times = self.split_times.clone();
        snapshot
    }

    fn on_start(&mut self, _elapsed: Duration, events: &EventBus) {
        events.emit(TimerEvent::RoundStart {
            round: self.current_round,
        });
    }

    fn on_finish(&mut self, elapsed: Duration, events: &EventBus) {
        let final_time = elapsed.min(self.time_cap);
        if self.is_time_capped(elapsed) {
            info!(
                "Time cap reached in round {} of {}",
                self.current_round, self.rounds
            );
        } else {
            info!("All {} rounds done in {:?}", self.rounds, final_time);
        }
        events.emit(TimerEvent::TimeRecorded {
            final_time,
            rounds: self.completed_rounds,
        });
    }

    fn on_reset(&mut self) {
        self.current_round = 1;
        self.completed_rounds = 0;
        self.round_started = Duration::ZERO;
        self.split_times.clear();
    }

    fn handle(
        &mut self,
        action: WorkoutAction,
        state: TimerState,
        elapsed: Duration,
        events: &EventBus,
    ) -> ActionOutcome {
        if action != WorkoutAction::CompleteRound || state != TimerState::Running {
            return ActionOutcome::Ignored;
        }

        self.completed_rounds += 1;
        if self.current_round >= self.rounds {
            // The last round ends the workout without recording a split.
            return ActionOutcome::Finish;
        }

        let split = elapsed.saturating_sub(self.round_started);
        self.split_times.push(split);
        events.emit(TimerEvent::RoundComplete {
            round: self.current_round,
            elapsed: Some(split),
        });

        self.current_round += 1;
        self.round_started = elapsed;
        info!("Round {} split {:?}", self.current_round - 1, split);
        events.emit(TimerEvent::RoundStart {
            round: self.current_round,
        });
        ActionOutcome::Handled
    }
}
