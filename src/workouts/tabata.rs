//! Tabata: alternating work/rest rounds, optionally grouped into sets
//!
//! The position inside the nested period structure is derived from elapsed
//! time alone:
//!
//! ```text
//! round period = work + rest
//! set period   = round period * rounds + rest between sets
//! total        = round period * rounds * sets + rest between sets * (sets - 1)
//! ```

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use super::config::{secs, TabataConfig};
use super::ratio;
use crate::engine::TimerBehavior;
use crate::events::{EventBus, TimerEvent};
use crate::state::{TimerSnapshot, TimerState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TabataPhase {
    Work,
    Rest,
    RestBetweenSets,
}

/// Where a Tabata workout stands at a given elapsed time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabataPosition {
    /// 1-based
    pub set: u32,
    /// 1-based round within the set
    pub round: u32,
    pub phase: TabataPhase,
    pub phase_remaining: Duration,
}

#[derive(Debug, Clone)]
pub struct Tabata {
    work: Duration,
    rest: Duration,
    rounds: u32,
    sets: u32,
    rest_between_sets: Duration,
    total: Duration,
    last: Option<TabataPosition>,
}

impl Tabata {
    pub fn new(config: &TabataConfig) -> Self {
        let work = secs(config.work_time);
        let rest = secs(config.rest_time);
        let rest_between_sets = secs(config.rest_between_sets);
        // Validation rejects configs whose total would saturate here.
        let set_work = (work + rest).saturating_mul(config.rounds);
        let total = set_work
            .saturating_mul(config.sets)
            .saturating_add(rest_between_sets.saturating_mul(config.sets.saturating_sub(1)));

        Self {
            work,
            rest,
            rounds: config.rounds,
            sets: config.sets,
            rest_between_sets,
            total,
            last: None,
        }
    }

    fn round_period(&self) -> Duration {
        self.work + self.rest
    }

    fn set_work(&self) -> Duration {
        self.round_period().saturating_mul(self.rounds)
    }

    fn set_period(&self) -> Duration {
        self.set_work().saturating_add(self.rest_between_sets)
    }

    pub fn position(&self, elapsed: Duration) -> TabataPosition {
        if elapsed >= self.total {
            return TabataPosition {
                set: self.sets,
                round: self.rounds,
                phase: if self.rest.is_zero() {
                    TabataPhase::Work
                } else {
                    TabataPhase::Rest
                },
                phase_remaining: Duration::ZERO,
            };
        }

        let (set_index, into_set) = ratio(elapsed, self.set_period());
        let set = u32::try_from(set_index).unwrap_or(u32::MAX).saturating_add(1);

        if into_set >= self.set_work() {
            return TabataPosition {
                set,
                round: self.rounds,
                phase: TabataPhase::RestBetweenSets,
                phase_remaining: self.set_period().saturating_sub(into_set),
            };
        }

        let (round_index, into_round) = ratio(into_set, self.round_period());
        let round = u32::try_from(round_index).unwrap_or(u32::MAX).saturating_add(1);
        let (phase, phase_remaining) = if into_round < self.work {
            (TabataPhase::Work, self.work - into_round)
        } else {
            (TabataPhase::Rest, self.round_period().saturating_sub(into_round))
        };

        TabataPosition {
            set,
            round,
            phase,
            phase_remaining,
        }
    }

    pub fn current_phase(&self, elapsed: Duration) -> TabataPhase {
        self.position(elapsed).phase
    }

    pub fn sets(&self) -> u32 {
        self.sets
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }
}

impl TimerBehavior for Tabata {
    fn total_duration(&self) -> Duration {
        self.total
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot {
        let position = self.position(elapsed);
        let mut snapshot = TimerSnapshot::new(state, elapsed, self.total)
            .with_rounds(position.round, Some(self.rounds));
        snapshot.interval_remaining = Some(position.phase_remaining);
        snapshot.is_working = Some(position.phase == TabataPhase::Work);
        snapshot.phase = Some(position.phase);
        snapshot.current_set = Some(position.set);
        snapshot.total_sets = Some(self.sets);
        snapshot
    }

    fn on_tick(&mut self, elapsed: Duration, events: &EventBus) {
        let position = self.position(elapsed);
        let previous = self.last.replace(position);
        if elapsed >= self.total {
            return;
        }

        let (last_set, last_round, last_phase) = match previous {
            Some(last) => (last.set, last.round, Some(last.phase)),
            None => (1, 0, None),
        };

        if position.set != last_set {
            debug!("Tabata set {} of {}", position.set, self.sets);
            events.emit(TimerEvent::SetStart { set: position.set });
        }
        if position.phase != TabataPhase::RestBetweenSets
            && (position.round != last_round || position.set != last_set)
        {
            events.emit(TimerEvent::RoundStart {
                round: position.round,
            });
        }
        if Some(position.phase) != last_phase {
            events.emit(match position.phase {
                TabataPhase::Work => TimerEvent::WorkStart,
                TabataPhase::Rest => TimerEvent::RestStart,
                TabataPhase::RestBetweenSets => TimerEvent::RestBetweenSets { set: position.set },
            });
        }
    }

    fn on_reset(&mut self) {
        self.last = None;
    }
}
