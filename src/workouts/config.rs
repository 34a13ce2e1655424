//! Workout configuration model
//!
//! Configurations are immutable once a timer is built and are validated
//! before any variant is constructed, so zero-length workouts never reach
//! the derivation math.

use std::{fmt, fs, path::Path, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A workout description plus the optional pre-start countdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(flatten)]
    pub workout: WorkoutConfig,
    /// Countdown before the workout starts, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<u32>,
}

/// One variant per workout type, tagged by `type` in JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkoutConfig {
    Amrap(AmrapConfig),
    Emom(EmomConfig),
    Tabata(TabataConfig),
    Intervals(IntervalsConfig),
    ForTime(ForTimeConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmrapConfig {
    /// Seconds
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movements: Vec<Movement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmomConfig {
    pub rounds: u32,
    /// Seconds per round, usually 60
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movements: Vec<Movement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabataConfig {
    pub work_time: u32,
    pub rest_time: u32,
    pub rounds: u32,
    #[serde(default = "default_sets")]
    pub sets: u32,
    #[serde(default = "default_rest_between_sets")]
    pub rest_between_sets: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalsConfig {
    #[serde(default)]
    pub intervals: Vec<Interval>,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Advanced mode: when present, replaces `intervals`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<IntervalBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForTimeConfig {
    pub time_cap_minutes: u32,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub movements: Vec<Movement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub name: String,
    /// Seconds
    pub duration: u32,
    #[serde(rename = "type")]
    pub kind: IntervalKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalKind {
    Work,
    Rest,
    Prep,
}

/// Named group of intervals repeated `rounds` times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBlock {
    #[serde(default)]
    pub name: String,
    pub intervals: Vec<Interval>,
    pub rounds: u32,
}

/// Descriptive movement data; never affects timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

fn default_sets() -> u32 {
    1
}

fn default_rest_between_sets() -> u32 {
    60
}

fn default_rounds() -> u32 {
    1
}

/// Workout type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkoutKind {
    Amrap,
    Emom,
    Tabata,
    Intervals,
    ForTime,
}

impl WorkoutKind {
    pub const ALL: [WorkoutKind; 5] = [
        WorkoutKind::Amrap,
        WorkoutKind::Emom,
        WorkoutKind::Tabata,
        WorkoutKind::Intervals,
        WorkoutKind::ForTime,
    ];

    /// Tag used in JSON configs
    pub fn tag(&self) -> &'static str {
        match self {
            WorkoutKind::Amrap => "amrap",
            WorkoutKind::Emom => "emom",
            WorkoutKind::Tabata => "tabata",
            WorkoutKind::Intervals => "intervals",
            WorkoutKind::ForTime => "forTime",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for WorkoutKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl FromStr for WorkoutKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace(['-', '_'], "").to_lowercase();
        WorkoutKind::ALL
            .into_iter()
            .find(|kind| kind.tag().to_lowercase() == wanted)
            .ok_or_else(|| ConfigError::UnknownType(s.to_string()))
    }
}

impl TimerConfig {
    pub fn new(workout: WorkoutConfig) -> Self {
        Self {
            workout,
            countdown: None,
        }
    }

    pub fn with_countdown(mut self, seconds: u32) -> Self {
        self.countdown = Some(seconds);
        self
    }

    /// Default configuration for a workout type
    pub fn preset(kind: WorkoutKind) -> Self {
        Self::new(WorkoutConfig::preset(kind))
    }

    /// Parse and validate a JSON config.
    ///
    /// An unrecognised `type` tag is reported as [`ConfigError::UnknownType`]
    /// rather than a generic parse error.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        match value.get("type").and_then(|tag| tag.as_str()) {
            Some(tag) if WorkoutKind::ALL.iter().any(|kind| kind.tag() == tag) => {}
            Some(tag) => return Err(ConfigError::UnknownType(tag.to_string())),
            None => return Err(ConfigError::UnknownType(String::new())),
        }

        let config: TimerConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.workout.validate()
    }

    pub fn kind(&self) -> WorkoutKind {
        self.workout.kind()
    }

    pub fn countdown_duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.countdown.unwrap_or(0)))
    }
}

impl WorkoutConfig {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            WorkoutConfig::Amrap(_) => WorkoutKind::Amrap,
            WorkoutConfig::Emom(_) => WorkoutKind::Emom,
            WorkoutConfig::Tabata(_) => WorkoutKind::Tabata,
            WorkoutConfig::Intervals(_) => WorkoutKind::Intervals,
            WorkoutConfig::ForTime(_) => WorkoutKind::ForTime,
        }
    }

    pub fn preset(kind: WorkoutKind) -> Self {
        match kind {
            WorkoutKind::Amrap => WorkoutConfig::Amrap(AmrapConfig {
                duration: 300,
                movements: Vec::new(),
            }),
            WorkoutKind::Emom => WorkoutConfig::Emom(EmomConfig {
                rounds: 10,
                interval: 60,
                movements: Vec::new(),
            }),
            WorkoutKind::Tabata => WorkoutConfig::Tabata(TabataConfig {
                work_time: 20,
                rest_time: 10,
                rounds: 8,
                sets: 1,
                rest_between_sets: default_rest_between_sets(),
            }),
            WorkoutKind::Intervals => WorkoutConfig::Intervals(IntervalsConfig {
                intervals: vec![
                    Interval::new("Prepare", 10, IntervalKind::Prep),
                    Interval::new("Work", 45, IntervalKind::Work),
                    Interval::new("Rest", 15, IntervalKind::Rest),
                ],
                rounds: 3,
                blocks: Vec::new(),
            }),
            WorkoutKind::ForTime => WorkoutConfig::ForTime(ForTimeConfig {
                time_cap_minutes: 20,
                rounds: 3,
                movements: Vec::new(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            WorkoutConfig::Amrap(config) => positive("duration", config.duration)?,
            WorkoutConfig::Emom(config) => {
                positive("rounds", config.rounds)?;
                positive("interval", config.interval)?;
            }
            WorkoutConfig::Tabata(config) => {
                positive("workTime", config.work_time)?;
                positive("rounds", config.rounds)?;
                positive("sets", config.sets)?;
            }
            WorkoutConfig::Intervals(config) => config.validate()?,
            WorkoutConfig::ForTime(config) => {
                positive("timeCapMinutes", config.time_cap_minutes)?;
                positive("rounds", config.rounds)?;
            }
        }
        self.total_seconds().ok_or(ConfigError::TooLong)?;
        Ok(())
    }

    /// Whole workout length in seconds, `None` when it overflows
    pub fn total_seconds(&self) -> Option<u64> {
        match self {
            WorkoutConfig::Amrap(config) => Some(u64::from(config.duration)),
            WorkoutConfig::Emom(config) => {
                u64::from(config.interval).checked_mul(u64::from(config.rounds))
            }
            WorkoutConfig::Tabata(config) => {
                let round = u64::from(config.work_time) + u64::from(config.rest_time);
                let set = round.checked_mul(u64::from(config.rounds))?;
                let rests = u64::from(config.rest_between_sets)
                    .checked_mul(u64::from(config.sets.saturating_sub(1)))?;
                set.checked_mul(u64::from(config.sets))?.checked_add(rests)
            }
            WorkoutConfig::Intervals(config) => config
                .round_seconds()?
                .checked_mul(u64::from(config.rounds)),
            WorkoutConfig::ForTime(config) => Some(u64::from(config.time_cap_minutes) * 60),
        }
    }
}

/// Most intervals one round may expand to
pub const MAX_INTERVALS: usize = 10_000;

impl IntervalsConfig {
    /// Length of the interval list one round expands to, `None` on overflow
    pub fn interval_count(&self) -> Option<usize> {
        if self.blocks.is_empty() {
            return Some(self.intervals.len());
        }
        self.blocks.iter().try_fold(0usize, |count, block| {
            let rounds = usize::try_from(block.rounds).ok()?;
            count.checked_add(block.intervals.len().checked_mul(rounds)?)
        })
    }

    /// Seconds in one round, computed without expanding blocks
    fn round_seconds(&self) -> Option<u64> {
        let sum = |intervals: &[Interval]| {
            intervals
                .iter()
                .try_fold(0u64, |total, interval| {
                    total.checked_add(u64::from(interval.duration))
                })
        };
        if self.blocks.is_empty() {
            return sum(&self.intervals);
        }
        self.blocks.iter().try_fold(0u64, |total, block| {
            total.checked_add(sum(&block.intervals)?.checked_mul(u64::from(block.rounds))?)
        })
    }

    /// The interval list one round walks through, with blocks expanded
    pub fn effective_intervals(&self) -> Vec<Interval> {
        if self.blocks.is_empty() {
            return self.intervals.clone();
        }

        self.blocks
            .iter()
            .flat_map(|block| {
                (0..block.rounds).flat_map(move |_| block.intervals.iter().cloned())
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("rounds", self.rounds)?;
        for block in &self.blocks {
            positive("block rounds", block.rounds)?;
            if block.intervals.is_empty() {
                return Err(ConfigError::EmptyIntervals);
            }
        }
        match self.interval_count() {
            Some(count) if count <= MAX_INTERVALS => {}
            _ => return Err(ConfigError::TooManyIntervals { max: MAX_INTERVALS }),
        }

        let intervals = self.effective_intervals();
        if intervals.is_empty() {
            return Err(ConfigError::EmptyIntervals);
        }
        if let Some((index, interval)) = intervals
            .iter()
            .enumerate()
            .find(|(_, interval)| interval.duration == 0)
        {
            return Err(ConfigError::ZeroLengthInterval {
                index,
                name: interval.name.clone(),
            });
        }
        Ok(())
    }
}

impl Interval {
    pub fn new(name: impl Into<String>, duration: u32, kind: IntervalKind) -> Self {
        Self {
            name: name.into(),
            duration,
            kind,
        }
    }

    pub fn duration(&self) -> Duration {
        secs(self.duration)
    }
}

fn positive(field: &str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Whole seconds from a config field
pub(crate) fn secs(value: u32) -> Duration {
    Duration::from_secs(u64::from(value))
}
