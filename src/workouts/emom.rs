//! Every minute on the minute: fixed-length repeating rounds

use std::time::Duration;
use tracing::debug;

use super::config::{secs, EmomConfig};
use super::ratio;
use crate::engine::TimerBehavior;
use crate::events::{EventBus, TimerEvent};
use crate::state::{TimerSnapshot, TimerState};

#[derive(Debug, Clone)]
pub struct Emom {
    rounds: u32,
    interval: Duration,
    total: Duration,
    /// Last round announced with `RoundStart`
    announced_round: u32,
}

impl Emom {
    pub fn new(config: &EmomConfig) -> Self {
        let interval = secs(config.interval);
        Self {
            rounds: config.rounds,
            interval,
            total: interval.saturating_mul(config.rounds),
            announced_round: 0,
        }
    }

    /// 1-based round at `elapsed`, clamped to the configured rounds
    pub fn current_round(&self, elapsed: Duration) -> u32 {
        self.raw_round(elapsed).min(self.rounds)
    }

    /// Time left in the current round; zero once the workout is over
    pub fn interval_remaining(&self, elapsed: Duration) -> Duration {
        if elapsed >= self.total {
            return Duration::ZERO;
        }
        let (_, into_round) = ratio(elapsed, self.interval);
        self.interval.saturating_sub(into_round)
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    fn raw_round(&self, elapsed: Duration) -> u32 {
        let (completed, _) = ratio(elapsed, self.interval);
        u32::try_from(completed).unwrap_or(u32::MAX).saturating_add(1)
    }
}

impl TimerBehavior for Emom {
    fn total_duration(&self) -> Duration {
        self.total
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot {
        let mut snapshot = TimerSnapshot::new(state, elapsed, self.total)
            .with_rounds(self.current_round(elapsed), Some(self.rounds));
        snapshot.interval_remaining = Some(self.interval_remaining(elapsed));
        snapshot
    }

    fn on_tick(&mut self, elapsed: Duration, events: &EventBus) {
        let round = self.raw_round(elapsed);
        if round > self.announced_round && round <= self.rounds {
            debug!("EMOM round {} of {}", round, self.rounds);
            self.announced_round = round;
            events.emit(TimerEvent::RoundStart { round });
        }
    }

    fn on_reset(&mut self) {
        self.announced_round = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Emom;
    use crate::engine::{TimerBehavior, TimerControl, TimerEngine};
    use crate::events::{drain, TimerEvent};
    use crate::state::TimerState;
    use crate::workouts::EmomConfig;
    use std::time::Duration;
    use tokio::time::Instant;

    fn emom(rounds: u32, interval: u32) -> Emom {
        Emom::new(&EmomConfig {
            rounds,
            interval,
            movements: Vec::new(),
        })
    }

    #[test]
    fn round_math_at_125_seconds() {
        let emom = emom(10, 60);
        let snapshot = emom.snapshot(TimerState::Running, Duration::from_millis(125_000));
        assert_eq!(snapshot.current_round, Some(3));
        assert_eq!(snapshot.total_rounds, Some(10));
        assert_eq!(snapshot.interval_remaining, Some(Duration::from_millis(55_000)));
        assert_eq!(emom.total_duration(), Duration::from_secs(600));
    }

    #[test]
    fn round_is_clamped_and_interval_drains_at_completion() {
        let emom = emom(3, 20);
        let at_end = Duration::from_secs(60);
        assert_eq!(emom.current_round(at_end), 3);
        assert_eq!(emom.interval_remaining(at_end), Duration::ZERO);
        assert!(emom.is_complete(at_end));
        assert!(!emom.is_complete(at_end - Duration::from_millis(1)));
    }

    #[test]
    fn round_start_fires_once_per_round() {
        let base = Instant::now();
        let mut timer = TimerEngine::new(emom(3, 10));
        let mut rx = timer.events().subscribe();
        timer.start(base);

        let mut rounds = Vec::new();
        for offset in (100..=30_000).step_by(100) {
            timer.tick(base + Duration::from_millis(offset));
            rounds.extend(drain(&mut rx).into_iter().filter_map(|e| match e {
                TimerEvent::RoundStart { round } => Some(round),
                _ => None,
            }));
        }

        assert_eq!(rounds, vec![1, 2, 3]);
        assert_eq!(timer.state(), TimerState::Finished);
    }

    #[test]
    fn rounds_are_announced_again_after_reset() {
        let base = Instant::now();
        let mut timer = TimerEngine::new(emom(2, 10));
        timer.start(base);
        timer.tick(base + Duration::from_secs(11));
        timer.reset();

        let mut rx = timer.events().subscribe();
        timer.start(base + Duration::from_secs(20));
        timer.tick(base + Duration::from_secs(21));
        assert!(drain(&mut rx).contains(&TimerEvent::RoundStart { round: 1 }));
    }
}
