//! Keyboard controls read line by line from stdin

use std::{str::FromStr, sync::Arc};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::engine::TimerControl;
use crate::state::TimerState;
use crate::timer::Timer;
use crate::workouts::Workout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Empty line: start, pause or resume depending on state
    Toggle,
    Start,
    Pause,
    Resume,
    Lap,
    Stop,
    Reset,
    Sound(bool),
    Status,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command: {0:?}")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_lowercase();
        let command = match line.as_str() {
            "" => Command::Toggle,
            "start" => Command::Start,
            "p" | "pause" => Command::Pause,
            "r" | "resume" => Command::Resume,
            "l" | "lap" | "round" => Command::Lap,
            "s" | "stop" | "q" | "quit" => Command::Stop,
            "x" | "reset" => Command::Reset,
            "sound on" | "unmute" => Command::Sound(true),
            "sound off" | "mute" => Command::Sound(false),
            "?" | "status" => Command::Status,
            _ => return Err(UnknownCommand(s.trim().to_string())),
        };
        Ok(command)
    }
}

/// Apply a command to the timer, returning whether anything changed
pub fn apply<E>(timer: &Timer<E>, command: Command) -> bool
where
    E: TimerControl<Behavior = Workout>,
{
    match command {
        Command::Toggle => match timer.state() {
            TimerState::Running => timer.pause(),
            TimerState::Paused => timer.resume(),
            _ => timer.start(),
        },
        Command::Start => timer.start(),
        Command::Pause => timer.pause(),
        Command::Resume => timer.resume(),
        Command::Lap => timer.lap(),
        Command::Stop => timer.stop(),
        Command::Reset => timer.reset(),
        Command::Sound(enabled) => {
            timer.set_sound_enabled(enabled);
            info!("Sound {}", if enabled { "on" } else { "off" });
            true
        }
        Command::Status => {
            match serde_json::to_string(&timer.snapshot()) {
                Ok(snapshot) => println!("{}", snapshot),
                Err(e) => warn!("Failed to serialize snapshot: {}", e),
            }
            false
        }
    }
}

/// Background task that turns stdin lines into timer commands until stdin
/// closes
pub async fn control_task<E>(timer: Arc<Timer<E>>)
where
    E: TimerControl<Behavior = Workout>,
{
    info!("Controls: <enter> start/pause/resume, l lap, s stop, x reset, mute/unmute, ? status");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match line.parse::<Command>() {
                Ok(command) => {
                    if !apply(&timer, command) {
                        debug!("{:?} had no effect while {}", command, timer.state());
                    }
                }
                Err(e) => warn!("{}", e),
            },
            Ok(None) => {
                debug!("Stdin closed, controls disabled");
                break;
            }
            Err(e) => {
                error!("Failed to read controls: {}", e);
                break;
            }
        }
    }
}
