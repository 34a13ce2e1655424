//! As many rounds as possible: fixed duration, athlete-counted rounds

use std::time::Duration;
use tracing::info;

use super::config::{secs, AmrapConfig};
use crate::engine::{ActionOutcome, TimerBehavior, WorkoutAction};
use crate::events::{EventBus, TimerEvent};
use crate::state::{TimerSnapshot, TimerState};

#[derive(Debug, Clone)]
pub struct Amrap {
    duration: Duration,
    /// Rounds reported by the athlete. Not derivable from elapsed time.
    rounds: u32,
}

impl Amrap {
    pub fn new(config: &AmrapConfig) -> Self {
        Self {
            duration: secs(config.duration),
            rounds: 0,
        }
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl TimerBehavior for Amrap {
    fn total_duration(&self) -> Duration {
        self.duration
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot {
        TimerSnapshot::new(state, elapsed, self.duration).with_rounds(self.rounds, None)
    }

    fn on_reset(&mut self) {
        self.rounds = 0;
    }

    fn handle(
        &mut self,
        action: WorkoutAction,
        state: TimerState,
        _elapsed: Duration,
        events: &EventBus,
    ) -> ActionOutcome {
        if action != WorkoutAction::IncrementRound || state.is_terminal() {
            return ActionOutcome::Ignored;
        }

        self.rounds += 1;
        info!("AMRAP round {} complete", self.rounds);
        events.emit(TimerEvent::RoundComplete {
            round: self.rounds,
            elapsed: None,
        });
        ActionOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::Amrap;
    use crate::engine::{TimerControl, TimerEngine, WorkoutAction};
    use crate::events::{drain, TimerEvent};
    use crate::state::TimerState;
    use crate::workouts::AmrapConfig;
    use std::time::Duration;
    use tokio::time::Instant;

    fn engine(seconds: u32) -> TimerEngine<Amrap> {
        TimerEngine::new(Amrap::new(&AmrapConfig {
            duration: seconds,
            movements: Vec::new(),
        }))
    }

    #[test]
    fn laps_count_rounds_and_emit_round_complete() {
        let base = Instant::now();
        let mut timer = engine(300);
        let mut rx = timer.events().subscribe();
        timer.start(base);
        drain(&mut rx);

        assert!(timer.act(WorkoutAction::IncrementRound, base + Duration::from_secs(40)));
        assert!(timer.act(WorkoutAction::IncrementRound, base + Duration::from_secs(85)));

        assert_eq!(timer.behavior().rounds(), 2);
        assert_eq!(timer.snapshot().current_round, Some(2));
        assert_eq!(timer.snapshot().total_rounds, None);
        assert_eq!(
            drain(&mut rx),
            vec![
                TimerEvent::RoundComplete {
                    round: 1,
                    elapsed: None
                },
                TimerEvent::RoundComplete {
                    round: 2,
                    elapsed: None
                },
            ]
        );
    }

    #[test]
    fn rounds_can_be_counted_before_start_but_not_after_finish() {
        let base = Instant::now();
        let mut timer = engine(5);
        assert!(timer.act(WorkoutAction::IncrementRound, base));
        assert_eq!(timer.behavior().rounds(), 1);

        timer.start(base);
        timer.tick(base + Duration::from_secs(5));
        assert_eq!(timer.state(), TimerState::Finished);
        assert!(!timer.act(WorkoutAction::IncrementRound, base + Duration::from_secs(6)));
        assert_eq!(timer.behavior().rounds(), 1);
    }

    #[test]
    fn complete_round_is_not_an_amrap_action() {
        let mut timer = engine(60);
        assert!(!timer.act(WorkoutAction::CompleteRound, Instant::now()));
    }

    #[test]
    fn finishes_at_duration_not_before() {
        let base = Instant::now();
        let mut timer = engine(5);
        timer.start(base);
        for offset in (100..5_000).step_by(100) {
            timer.tick(base + Duration::from_millis(offset));
            assert_eq!(timer.state(), TimerState::Running);
            assert!(timer.snapshot().remaining > Duration::ZERO);
        }
        timer.tick(base + Duration::from_millis(5_000));
        assert_eq!(timer.state(), TimerState::Finished);
        assert_eq!(timer.snapshot().remaining, Duration::ZERO);
    }
}
