//! Workout Timer - a drift-free workout interval timer engine
//!
//! This library provides the timer state machine, the AMRAP, EMOM, Tabata,
//! interval and for-time variants, a pre-start countdown decorator and the
//! event channel observers subscribe to.

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod report;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;
pub mod workouts;

// Re-export commonly used types
pub use engine::{CountdownWrapper, TimerBehavior, TimerControl, TimerEngine, WorkoutAction};
pub use error::ConfigError;
pub use events::{Cue, EventBus, TimerEvent};
pub use state::{TimerSnapshot, TimerState};
pub use timer::Timer;
pub use workouts::{create_timer, TimerConfig, Workout, WorkoutKind, WorkoutTimer};
