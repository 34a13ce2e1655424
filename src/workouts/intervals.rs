//! Custom interval lists repeated for a number of rounds
//!
//! The authoritative position (round, interval, time left) is a pure
//! function of elapsed time. Sound cues are tracked separately in
//! [`CueTracker`] so cue timing can never leak into the snapshot.

use std::time::Duration;
use tracing::debug;

use super::config::{Interval, IntervalsConfig};
use super::ratio;
use crate::engine::TimerBehavior;
use crate::events::{Cue, EventBus, TimerEvent};
use crate::state::{TimerSnapshot, TimerState};

/// Seconds before an interval ends during which warnings are cued
const WARNING_SECONDS: u32 = 3;
/// Intervals must be longer than this for a halfway cue
const HALFWAY_MIN: Duration = Duration::from_secs(4);

/// Where an interval workout stands at a given elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalPosition {
    /// 1-based
    pub round: u32,
    /// 0-based index into the interval list
    pub index: usize,
    pub into_interval: Duration,
    pub remaining: Duration,
}

#[derive(Debug, Clone)]
pub struct Intervals {
    intervals: Vec<Interval>,
    rounds: u32,
    round_duration: Duration,
    total: Duration,
    last: Option<(u32, usize)>,
    cues: CueTracker,
}

impl Intervals {
    pub fn new(config: &IntervalsConfig) -> Self {
        let intervals = config.effective_intervals();
        let round_duration = intervals
            .iter()
            .map(Interval::duration)
            .fold(Duration::ZERO, Duration::saturating_add);

        Self {
            intervals,
            rounds: config.rounds,
            round_duration,
            total: round_duration.saturating_mul(config.rounds),
            last: None,
            cues: CueTracker::default(),
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    pub fn position(&self, elapsed: Duration) -> IntervalPosition {
        let last_index = self.intervals.len().saturating_sub(1);
        if elapsed >= self.total {
            let last_duration = self
                .intervals
                .last()
                .map(Interval::duration)
                .unwrap_or_default();
            return IntervalPosition {
                round: self.rounds,
                index: last_index,
                into_interval: last_duration,
                remaining: Duration::ZERO,
            };
        }

        let (round_index, mut into_round) = ratio(elapsed, self.round_duration);
        let round = u32::try_from(round_index).unwrap_or(u32::MAX).saturating_add(1);

        for (index, interval) in self.intervals.iter().enumerate() {
            let duration = interval.duration();
            if into_round < duration {
                return IntervalPosition {
                    round,
                    index,
                    into_interval: into_round,
                    remaining: duration - into_round,
                };
            }
            into_round -= duration;
        }

        // Only reachable if durations do not sum to the round duration.
        IntervalPosition {
            round,
            index: last_index,
            into_interval: into_round,
            remaining: Duration::ZERO,
        }
    }

    pub fn current_interval(&self, elapsed: Duration) -> Option<&Interval> {
        self.intervals.get(self.position(elapsed).index)
    }

    /// Interval following `position`, wrapping into the next round
    fn next_after(&self, position: &IntervalPosition) -> Option<&Interval> {
        if position.index + 1 < self.intervals.len() {
            self.intervals.get(position.index + 1)
        } else if position.round < self.rounds {
            self.intervals.first()
        } else {
            None
        }
    }
}

impl TimerBehavior for Intervals {
    fn total_duration(&self) -> Duration {
        self.total
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot {
        let position = self.position(elapsed);
        let interval = self.intervals.get(position.index);

        let mut snapshot = TimerSnapshot::new(state, elapsed, self.total)
            .with_rounds(position.round, Some(self.rounds));
        snapshot.current_interval = u32::try_from(position.index + 1).ok();
        snapshot.total_intervals = u32::try_from(self.intervals.len()).ok();
        snapshot.interval_remaining = Some(position.remaining);
        snapshot.interval_name = interval.map(|interval| interval.name.clone());
        snapshot.interval_kind = interval.map(|interval| interval.kind);
        snapshot
    }

    fn on_tick(&mut self, elapsed: Duration, events: &EventBus) {
        if elapsed >= self.total {
            return;
        }

        let position = self.position(elapsed);
        let current = (position.round, position.index);
        let previous = self.last.replace(current);

        if previous.map(|(round, _)| round) != Some(position.round) {
            debug!("Interval round {} of {}", position.round, self.rounds);
            events.emit(TimerEvent::RoundStart {
                round: position.round,
            });
        }
        if previous != Some(current) {
            if let Some(interval) = self.intervals.get(position.index) {
                events.emit(TimerEvent::IntervalStart {
                    name: interval.name.clone(),
                    kind: interval.kind,
                });
            }
        }

        let next = self.next_after(&position).map(|interval| interval.name.clone());
        if let Some(interval) = self.intervals.get(position.index) {
            for cue in self.cues.observe(&position, interval, next) {
                events.cue(cue);
            }
        }
    }

    fn on_reset(&mut self) {
        self.last = None;
        self.cues = CueTracker::default();
    }
}

/// Advisory cue bookkeeping for the sound layer
#[derive(Debug, Clone, Default)]
struct CueTracker {
    /// (round, index, whole seconds) of the last warning cued
    warned: Option<(u32, usize, u32)>,
    /// (round, index) of the last halfway cue
    halfway: Option<(u32, usize)>,
}

impl CueTracker {
    fn observe(
        &mut self,
        position: &IntervalPosition,
        interval: &Interval,
        next: Option<String>,
    ) -> Vec<Cue> {
        let mut cues = Vec::new();
        let key = (position.round, position.index);
        let duration = interval.duration();

        if duration > HALFWAY_MIN
            && position.into_interval >= duration / 2
            && self.halfway != Some(key)
        {
            self.halfway = Some(key);
            cues.push(Cue::IntervalHalfway {
                name: interval.name.clone(),
            });
        }

        let seconds = ceil_seconds(position.remaining);
        if (1..=WARNING_SECONDS).contains(&seconds)
            && self.warned != Some((key.0, key.1, seconds))
        {
            self.warned = Some((key.0, key.1, seconds));
            cues.push(Cue::IntervalWarning { seconds, next });
        }

        cues
    }
}

fn ceil_seconds(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis().div_ceil(1_000)).unwrap_or(u32::MAX)
}
