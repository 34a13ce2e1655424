//! Wall-clock elapsed time bookkeeping
//!
//! Elapsed time is always derived from the anchors
//! (`now - started_at - total_paused`), never accumulated from tick deltas,
//! so late or missed ticks cannot introduce drift.

use std::time::Duration;
use tokio::time::Instant;

/// Pause-aware elapsed time tracker owned by a single timer
#[derive(Debug, Clone, Default)]
pub struct Stopwatch {
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    total_paused: Duration,
    elapsed: Duration,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor the stopwatch at `now`, carrying over any elapsed time already
    /// recorded.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now.checked_sub(self.elapsed).unwrap_or(now));
        self.paused_at = None;
        self.total_paused = Duration::ZERO;
    }

    /// Freeze elapsed time at `now`
    pub fn pause(&mut self, now: Instant) {
        if self.started_at.is_none() || self.paused_at.is_some() {
            return;
        }
        self.sample(now);
        self.paused_at = Some(now);
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            let paused_for = now.saturating_duration_since(paused_at);
            self.total_paused = self.total_paused.saturating_add(paused_for);
        }
    }

    /// Recompute elapsed time from the anchors. Returns the frozen value while
    /// paused or before the first start.
    pub fn sample(&mut self, now: Instant) -> Duration {
        if let (Some(started_at), None) = (self.started_at, self.paused_at) {
            let elapsed = now
                .saturating_duration_since(started_at)
                .saturating_sub(self.total_paused);
            // Instant is monotonic, max() only guards against a caller
            // passing an older `now` than a previous call.
            self.elapsed = self.elapsed.max(elapsed);
        }
        self.elapsed
    }

    /// Last sampled elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::Stopwatch;
    use std::time::Duration;
    use tokio::time::Instant;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn elapsed_is_derived_from_anchor_not_tick_count() {
        let base = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(base);

        // One late sample gives the same answer as many frequent ones.
        assert_eq!(watch.sample(base + ms(1_730)), ms(1_730));

        let mut frequent = Stopwatch::new();
        frequent.start(base);
        for step in 1..=17 {
            frequent.sample(base + ms(step * 100));
        }
        assert_eq!(frequent.sample(base + ms(1_730)), ms(1_730));
    }

    #[test]
    fn pause_freezes_and_resume_excludes_paused_span() {
        let base = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(base);
        watch.sample(base + ms(2_000));

        watch.pause(base + ms(2_500));
        assert!(watch.is_paused());
        assert_eq!(watch.sample(base + ms(9_000)), ms(2_500));

        watch.resume(base + ms(10_500));
        assert_eq!(watch.sample(base + ms(11_000)), ms(3_000));
    }

    #[test]
    fn elapsed_never_decreases() {
        let base = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(base);
        let mut last = Duration::ZERO;
        for offset in [100, 250, 250, 900, 400, 1_200] {
            let sampled = watch.sample(base + ms(offset));
            assert!(sampled >= last);
            last = sampled;
        }
    }

    #[test]
    fn sample_before_start_is_zero() {
        let mut watch = Stopwatch::new();
        assert_eq!(watch.sample(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn clear_forgets_everything() {
        let base = Instant::now();
        let mut watch = Stopwatch::new();
        watch.start(base);
        watch.pause(base + ms(700));
        watch.clear();
        assert_eq!(watch.elapsed(), Duration::ZERO);
        assert!(!watch.is_paused());
        assert_eq!(watch.sample(base + ms(5_000)), Duration::ZERO);
    }
}
