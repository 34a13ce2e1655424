//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::error::ConfigError;
use crate::tasks::OutputMode;
use crate::workouts::{TimerConfig, WorkoutKind};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "workout-timer")]
#[command(about = "Drift-free workout timer: AMRAP, EMOM, Tabata, intervals and for time")]
#[command(version = "1.0.0")]
pub struct Config {
    /// JSON workout config file
    #[arg(short, long, conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in workout to run when no config file is given
    #[arg(short, long, default_value = "amrap")]
    pub preset: WorkoutKind,

    /// Countdown before the workout starts, in seconds
    #[arg(long)]
    pub countdown: Option<u32>,

    /// Suppress sound cues
    #[arg(short, long)]
    pub mute: bool,

    /// Print every event as a JSON line
    #[arg(long)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    /// Load the workout from `--config` or the preset; `--countdown`
    /// overrides whatever the file says
    pub fn timer_config(&self) -> Result<TimerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => TimerConfig::from_file(path)?,
            None => TimerConfig::preset(self.preset),
        };
        if let Some(seconds) = self.countdown {
            config.countdown = Some(seconds);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::tasks::OutputMode;
    use crate::workouts::WorkoutKind;
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn defaults_to_an_amrap_preset() {
        let config = Config::parse_from(["workout-timer"]);
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.output_mode(), OutputMode::Human);

        let timer = config.timer_config().expect("preset");
        assert_eq!(timer.kind(), WorkoutKind::Amrap);
        assert_eq!(timer.countdown, None);
    }

    #[test]
    fn countdown_flag_overrides_preset() {
        let config = Config::parse_from([
            "workout-timer",
            "--preset",
            "for-time",
            "--countdown",
            "10",
            "--json",
            "-v",
        ]);
        let timer = config.timer_config().expect("preset");
        assert_eq!(timer.kind(), WorkoutKind::ForTime);
        assert_eq!(timer.countdown_duration(), Duration::from_secs(10));
        assert_eq!(config.output_mode(), OutputMode::Json);
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Config::try_parse_from(["workout-timer", "--preset", "yoga"]).is_err());
    }

    #[test]
    fn missing_config_file_is_a_read_error() {
        let config = Config::parse_from(["workout-timer", "--config", "/nonexistent/workout.json"]);
        assert!(matches!(
            config.timer_config(),
            Err(crate::error::ConfigError::Read { .. })
        ));
    }
}
