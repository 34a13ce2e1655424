//! Event sink that renders timer events to the terminal

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, trace, warn};

use crate::events::{Cue, TimerEvent};
use crate::state::TimerSnapshot;
use crate::utils::format::{format_elapsed, format_remaining};

/// Output style of [`event_logger_task`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One clock line per displayed second plus logged events
    Human,
    /// Every event as a JSON line on stdout
    Json,
}

/// Background task that consumes a timer's events until the channel closes
pub async fn event_logger_task(mut events: broadcast::Receiver<TimerEvent>, mode: OutputMode) {
    info!("Starting event logger task");
    let mut clock = ClockLine::default();

    loop {
        match events.recv().await {
            Ok(event) => match mode {
                OutputMode::Json => print_json(&event),
                OutputMode::Human => {
                    if let TimerEvent::Tick { snapshot } = &event {
                        if let Some(line) = clock.render(snapshot) {
                            println!("{}", line);
                        }
                    } else {
                        log_event(&event);
                    }
                }
            },
            Err(RecvError::Lagged(skipped)) => {
                warn!("Event logger fell behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                debug!("Event channel closed, stopping event logger");
                break;
            }
        }
    }
}

fn print_json(event: &TimerEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{}", line),
        Err(e) => warn!("Failed to serialize {} event: {}", event.name(), e),
    }
}

fn log_event(event: &TimerEvent) {
    match event {
        TimerEvent::StateChange { state } => debug!("State is now {}", state),
        TimerEvent::RoundStart { round } => info!("Round {}", round),
        TimerEvent::RoundComplete {
            round,
            elapsed: Some(split),
        } => info!("Round {} done in {}", round, format_elapsed(*split)),
        TimerEvent::RoundComplete { round, .. } => info!("Round {} done", round),
        TimerEvent::SetStart { set } => info!("Set {}", set),
        TimerEvent::RestBetweenSets { set } => info!("Set {} done, rest", set),
        TimerEvent::WorkStart => info!("Work!"),
        TimerEvent::RestStart => info!("Rest"),
        TimerEvent::IntervalStart { name, kind } => info!("{} ({:?})", name, kind),
        TimerEvent::TimeRecorded { final_time, rounds } => {
            info!("Time: {} for {} rounds", format_elapsed(*final_time), rounds)
        }
        TimerEvent::Cue { cue } => log_cue(cue),
        other => info!("Timer {}", other.name()),
    }
}

fn log_cue(cue: &Cue) {
    match cue {
        Cue::CountdownBeep { seconds } => info!("{}...", seconds),
        Cue::CountdownGo => info!("Go!"),
        Cue::IntervalWarning {
            seconds,
            next: Some(next),
        } => debug!("{} to {}", seconds, next),
        Cue::IntervalWarning { seconds, .. } => debug!("{} left", seconds),
        Cue::IntervalHalfway { name } => info!("Halfway through {}", name),
    }
}

/// Turns per-tick snapshots into at most one clock line per second
#[derive(Debug, Default)]
struct ClockLine {
    last: Option<String>,
}

impl ClockLine {
    fn render(&mut self, snapshot: &TimerSnapshot) -> Option<String> {
        let line = clock_text(snapshot);
        if self.last.as_deref() == Some(line.as_str()) {
            trace!("Clock unchanged at {:?}", snapshot.elapsed);
            return None;
        }
        self.last = Some(line.clone());
        Some(line)
    }
}

fn clock_text(snapshot: &TimerSnapshot) -> String {
    if snapshot.is_countdown == Some(true) {
        let remaining = snapshot.countdown_remaining.unwrap_or(snapshot.remaining);
        return format!("Starting in {}", format_remaining(remaining));
    }

    // For-time counts up against its cap; everything else counts down.
    let mut line = match snapshot.time_cap {
        Some(cap) => format!(
            "{} / {}",
            format_elapsed(snapshot.elapsed),
            format_elapsed(cap)
        ),
        None => format_remaining(snapshot.remaining),
    };

    if let Some(round) = snapshot.current_round {
        match snapshot.total_rounds {
            Some(total) => line.push_str(&format!("  round {}/{}", round, total)),
            None => line.push_str(&format!("  rounds {}", round)),
        }
    }
    if let (Some(set), Some(sets)) = (snapshot.current_set, snapshot.total_sets) {
        if sets > 1 {
            line.push_str(&format!("  set {}/{}", set, sets));
        }
    }
    if let Some(name) = &snapshot.interval_name {
        line.push_str(&format!("  {}", name));
    } else if let Some(phase) = snapshot.phase {
        line.push_str(&format!("  {:?}", phase));
    }
    if let Some(left) = snapshot.interval_remaining {
        line.push_str(&format!(" {}", format_remaining(left)));
    }
    line
}
