//! Workout variants
//!
//! Each variant is a [`TimerBehavior`] plugged into a [`TimerEngine`].
//! [`Workout`] is the closed set of variants a config can produce, and
//! [`create_timer`] is the factory used by the binary.

pub mod amrap;
pub mod config;
pub mod emom;
pub mod for_time;
pub mod intervals;
pub mod tabata;

pub use amrap::Amrap;
pub use config::{
    AmrapConfig, EmomConfig, ForTimeConfig, Interval, IntervalBlock, IntervalKind,
    IntervalsConfig, Movement, TabataConfig, TimerConfig, WorkoutConfig, WorkoutKind,
};
pub use emom::Emom;
pub use for_time::ForTime;
pub use intervals::{IntervalPosition, Intervals};
pub use tabata::{Tabata, TabataPhase, TabataPosition};

use std::time::Duration;
use tracing::info;

use crate::engine::{
    ActionOutcome, CountdownWrapper, TimerBehavior, TimerControl, TimerEngine, WorkoutAction,
};
use crate::error::ConfigError;
use crate::events::EventBus;
use crate::state::{TimerSnapshot, TimerState};
use crate::timer::Timer;

/// Timer handle produced from a [`TimerConfig`]
pub type WorkoutTimer = Timer<CountdownWrapper<TimerEngine<Workout>>>;

/// Any configured workout variant
#[derive(Debug, Clone)]
pub enum Workout {
    Amrap(Amrap),
    Emom(Emom),
    Tabata(Tabata),
    Intervals(Intervals),
    ForTime(ForTime),
}

macro_rules! delegate {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Workout::Amrap($inner) => $body,
            Workout::Emom($inner) => $body,
            Workout::Tabata($inner) => $body,
            Workout::Intervals($inner) => $body,
            Workout::ForTime($inner) => $body,
        }
    };
}

impl Workout {
    /// Build the variant for an already validated config
    pub fn from_config(config: &WorkoutConfig) -> Self {
        match config {
            WorkoutConfig::Amrap(config) => Workout::Amrap(Amrap::new(config)),
            WorkoutConfig::Emom(config) => Workout::Emom(Emom::new(config)),
            WorkoutConfig::Tabata(config) => Workout::Tabata(Tabata::new(config)),
            WorkoutConfig::Intervals(config) => Workout::Intervals(Intervals::new(config)),
            WorkoutConfig::ForTime(config) => Workout::ForTime(ForTime::new(config)),
        }
    }

    pub fn kind(&self) -> WorkoutKind {
        match self {
            Workout::Amrap(_) => WorkoutKind::Amrap,
            Workout::Emom(_) => WorkoutKind::Emom,
            Workout::Tabata(_) => WorkoutKind::Tabata,
            Workout::Intervals(_) => WorkoutKind::Intervals,
            Workout::ForTime(_) => WorkoutKind::ForTime,
        }
    }

    /// Rounds finished so far on workouts that count them (AMRAP, ForTime)
    pub fn rounds(&self) -> Option<u32> {
        match self {
            Workout::Amrap(amrap) => Some(amrap.rounds()),
            Workout::ForTime(for_time) => Some(for_time.completed_rounds()),
            _ => None,
        }
    }

    pub fn split_times(&self) -> &[Duration] {
        match self {
            Workout::ForTime(for_time) => for_time.split_times(),
            _ => &[],
        }
    }

    pub fn intervals(&self) -> &[Interval] {
        match self {
            Workout::Intervals(intervals) => intervals.intervals(),
            _ => &[],
        }
    }

    pub fn current_interval(&self, elapsed: Duration) -> Option<&Interval> {
        match self {
            Workout::Intervals(intervals) => intervals.current_interval(elapsed),
            _ => None,
        }
    }

    pub fn current_phase(&self, elapsed: Duration) -> Option<TabataPhase> {
        match self {
            Workout::Tabata(tabata) => Some(tabata.current_phase(elapsed)),
            _ => None,
        }
    }

    /// The action a generic "lap" control maps to, if any
    pub fn lap_action(&self) -> Option<WorkoutAction> {
        match self {
            Workout::Amrap(_) => Some(WorkoutAction::IncrementRound),
            Workout::ForTime(_) => Some(WorkoutAction::CompleteRound),
            _ => None,
        }
    }
}

impl TimerBehavior for Workout {
    fn total_duration(&self) -> Duration {
        delegate!(self, inner => inner.total_duration())
    }

    fn is_complete(&self, elapsed: Duration) -> bool {
        delegate!(self, inner => inner.is_complete(elapsed))
    }

    fn snapshot(&self, state: TimerState, elapsed: Duration) -> TimerSnapshot {
        delegate!(self, inner => inner.snapshot(state, elapsed))
    }

    fn on_start(&mut self, elapsed: Duration, events: &EventBus) {
        delegate!(self, inner => inner.on_start(elapsed, events))
    }

    fn on_tick(&mut self, elapsed: Duration, events: &EventBus) {
        delegate!(self, inner => inner.on_tick(elapsed, events))
    }

    fn on_finish(&mut self, elapsed: Duration, events: &EventBus) {
        delegate!(self, inner => inner.on_finish(elapsed, events))
    }

    fn on_reset(&mut self) {
        delegate!(self, inner => inner.on_reset())
    }

    fn handle(
        &mut self,
        action: WorkoutAction,
        state: TimerState,
        elapsed: Duration,
        events: &EventBus,
    ) -> ActionOutcome {
        delegate!(self, inner => inner.handle(action, state, elapsed, events))
    }
}

/// Validate `config` and build the bare engine for it
pub fn build_engine(config: &TimerConfig) -> Result<TimerEngine<Workout>, ConfigError> {
    config.validate()?;
    Ok(TimerEngine::new(Workout::from_config(&config.workout)))
}

/// Validate `config` and build a running-ready timer handle.
///
/// Every timer is wrapped in a [`CountdownWrapper`]; without a configured
/// countdown the wrapper hands straight over to the workout on start.
pub fn create_timer(config: &TimerConfig) -> Result<WorkoutTimer, ConfigError> {
    let engine = build_engine(config)?;
    info!(
        "Created {} timer ({:?} total, {:?} countdown)",
        config.kind(),
        engine.behavior().total_duration(),
        config.countdown_duration()
    );
    Ok(Timer::new(CountdownWrapper::new(
        engine,
        config.countdown_duration(),
    )))
}

/// Whole periods of `period` in `elapsed`, and the time into the current one.
///
/// A zero period never divides; validation rejects such configs, this only
/// keeps the math total.
pub(crate) fn ratio(elapsed: Duration, period: Duration) -> (u128, Duration) {
    let period_nanos = period.as_nanos();
    if period_nanos == 0 {
        return (0, elapsed);
    }

    let elapsed_nanos = elapsed.as_nanos();
    let whole = elapsed_nanos / period_nanos;
    let rest = elapsed_nanos % period_nanos;
    // rest < period, which came from a Duration, so it fits.
    let rest = Duration::new(
        u64::try_from(rest / 1_000_000_000).unwrap_or(u64::MAX),
        u32::try_from(rest % 1_000_000_000).unwrap_or(0),
    );
    (whole, rest)
}
