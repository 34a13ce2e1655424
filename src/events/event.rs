//! Typed timer events

use std::time::Duration;

use serde::Serialize;

use crate::state::{TimerSnapshot, TimerState};
use crate::workouts::IntervalKind;

/// Every lifecycle transition and workout milestone a timer publishes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TimerEvent {
    Start,
    Pause,
    Resume,
    Reset,
    Stop,
    StateChange {
        state: TimerState,
    },
    Tick {
        snapshot: TimerSnapshot,
    },
    Finish,
    /// The countdown decorator began its pre-start phase
    CountdownStart,
    RoundStart {
        round: u32,
    },
    RoundComplete {
        round: u32,
        #[serde(
            skip_serializing_if = "Option::is_none",
            with = "crate::utils::serde_millis::option"
        )]
        elapsed: Option<Duration>,
    },
    WorkStart,
    RestStart,
    #[serde(rename_all = "camelCase")]
    RestBetweenSets {
        set: u32,
    },
    SetStart {
        set: u32,
    },
    IntervalStart {
        name: String,
        kind: IntervalKind,
    },
    /// For-time result. `rounds` counts rounds actually finished, so a run
    /// cut off by the time cap reports fewer than were configured.
    #[serde(rename_all = "camelCase")]
    TimeRecorded {
        #[serde(with = "crate::utils::serde_millis")]
        final_time: Duration,
        rounds: u32,
    },
    /// Advisory sound cue, never part of the authoritative state
    Cue {
        cue: Cue,
    },
}

impl TimerEvent {
    /// Stable event name, as used by the sound layer and the JSON output
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Start => "start",
            TimerEvent::Pause => "pause",
            TimerEvent::Resume => "resume",
            TimerEvent::Reset => "reset",
            TimerEvent::Stop => "stop",
            TimerEvent::StateChange { .. } => "stateChange",
            TimerEvent::Tick { .. } => "tick",
            TimerEvent::Finish => "finish",
            TimerEvent::CountdownStart => "countdownStart",
            TimerEvent::RoundStart { .. } => "roundStart",
            TimerEvent::RoundComplete { .. } => "roundComplete",
            TimerEvent::WorkStart => "workStart",
            TimerEvent::RestStart => "restStart",
            TimerEvent::RestBetweenSets { .. } => "restBetweenSets",
            TimerEvent::SetStart { .. } => "setStart",
            TimerEvent::IntervalStart { .. } => "intervalStart",
            TimerEvent::TimeRecorded { .. } => "timeRecorded",
            TimerEvent::Cue { .. } => "cue",
        }
    }

    pub fn is_tick(&self) -> bool {
        matches!(self, TimerEvent::Tick { .. })
    }
}

/// Sound-layer hints emitted alongside the authoritative events
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "cue", rename_all = "camelCase")]
pub enum Cue {
    /// Whole seconds left in the pre-start countdown (3, 2, 1)
    CountdownBeep { seconds: u32 },
    CountdownGo,
    /// Whole seconds left before the current interval ends, naming the next
    /// interval (`None` when the workout ends with this interval)
    IntervalWarning { seconds: u32, next: Option<String> },
    IntervalHalfway { name: String },
}
