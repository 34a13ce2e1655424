//! Timer state machine
//!
//! [`TimerBehavior`] is what a workout variant supplies: completion,
//! snapshot derivation and optional boundary-detection hooks.
//! [`TimerEngine`] owns the lifecycle shared by every variant and
//! [`CountdownWrapper`] composes any [`TimerControl`] with a pre-start
//! countdown. Both engines are synchronous and take `now` explicitly; the
//! periodic tick is driven from [`crate::timer::Timer`].

pub mod lifecycle;
pub mod countdown;

pub use lifecycle::TimerEngine;
pub use countdown::CountdownWrapper;

use std::time::Duration;
use tokio::time::Instant;

use crate::events::EventBus;
use crate::state::{TimerSnapshot, TimerState};

/// Period of the tick loop, independent of workout variant
pub const TICK_PERIOD: Duration = Duration::from_millis(100);

/// Externally driven workout calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutAction {
    /// AMRAP lap: the athlete finished a round
    IncrementRound,
    /// For-time: the athlete finished the current round
    CompleteRound,
}

/// What a behavior did with a [`WorkoutAction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Ignored,
    Handled,
    /// The action completed the workout; the engine must finish now
    Finish,
}

/// Variant hooks plugged into [`TimerEngine`].
///
/// Derived values must be computed from `elapsed` alone so a snapshot at any
/// elapsed time is reproducible. Hooks only track what is needed to emit
/// boundary events once per crossing.
pub trait TimerBehavior: Send + 'static {
    /// Duration used for `remaining` and `progress`
    fn total_duration(&self) -> Duration;

    fn is_complete(&self, elapsed: Duration) -> bool {
        elapsed >= self.total_duration()
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot;

    fn on_start(&mut self, _elapsed: Duration, _events: &EventBus) {}

    /// Called on every tick before the snapshot is published
    fn on_tick(&mut self, _elapsed: Duration, _events: &EventBus) {}

    /// Called after `Finish` and the state change have been emitted
    fn on_finish(&mut self, _elapsed: Duration, _events: &EventBus) {}

    fn on_reset(&mut self) {}

    fn handle(
        &mut self,
        _action: WorkoutAction,
        _state: TimerState,
        _elapsed: Duration,
        _events: &EventBus,
    ) -> ActionOutcome {
        ActionOutcome::Ignored
    }
}

/// Lifecycle interface shared by [`TimerEngine`] and [`CountdownWrapper`].
///
/// Transition methods return whether the transition happened; calls from a
/// state that does not permit them are silent no-ops.
pub trait TimerControl: Send + 'static {
    type Behavior: TimerBehavior;

    fn start(&mut self, now: Instant) -> bool;
    fn pause(&mut self, now: Instant) -> bool;
    fn resume(&mut self, now: Instant) -> bool;
    fn reset(&mut self) -> bool;
    fn stop(&mut self) -> bool;

    /// Recompute elapsed time at `now`, publish, and finish on completion.
    /// Ignored unless running.
    fn tick(&mut self, now: Instant);

    fn act(&mut self, action: WorkoutAction, now: Instant) -> bool;

    fn snapshot(&self) -> TimerSnapshot;
    fn state(&self) -> TimerState;
    fn elapsed(&self) -> Duration;
    fn events(&self) -> &EventBus;
    fn behavior(&self) -> &Self::Behavior;

    /// Whether the periodic tick should currently be running
    fn is_ticking(&self) -> bool {
        self.state() == TimerState::Running
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        self.events().set_sound_enabled(enabled);
    }
}
