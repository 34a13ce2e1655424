//! Clock formatting

use std::time::Duration;

/// `MM:SS` for a count-down value, rounding partial seconds up so the clock
/// reads `00:00` only when time is really up
pub fn format_remaining(duration: Duration) -> String {
    let millis = duration.as_millis();
    let seconds = u64::try_from(millis.div_ceil(1_000)).unwrap_or(u64::MAX);
    mm_ss(seconds)
}

/// `MM:SS` for a count-up value, truncating partial seconds
pub fn format_elapsed(duration: Duration) -> String {
    mm_ss(duration.as_secs())
}

fn mm_ss(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
