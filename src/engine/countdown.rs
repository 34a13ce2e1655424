//! Pre-start countdown decorator

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{TimerControl, WorkoutAction};
use crate::events::{Cue, EventBus, TimerEvent};
use crate::state::{Stopwatch, TimerSnapshot, TimerState};

/// Whole seconds at which a countdown beep cue fires
const BEEP_SECONDS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The countdown owns the lifecycle (idle, counting, paused or stopped)
    Countdown,
    /// The inner timer started; the wrapper only relays
    Delegating,
}

/// Wraps a timer with a countdown that runs before it starts.
///
/// The wrapper publishes on the inner timer's bus, so once the inner timer
/// starts its events reach the wrapper's subscribers verbatim.
#[derive(Debug)]
pub struct CountdownWrapper<E> {
    inner: E,
    duration: Duration,
    phase: Phase,
    state: TimerState,
    stopwatch: Stopwatch,
    last_beep: Option<u32>,
    events: EventBus,
}

impl<E: TimerControl> CountdownWrapper<E> {
    /// A zero `duration` disables the countdown phase entirely.
    pub fn new(inner: E, duration: Duration) -> Self {
        let events = inner.events().clone();
        Self {
            inner,
            duration,
            phase: Phase::Countdown,
            state: TimerState::Idle,
            stopwatch: Stopwatch::new(),
            last_beep: None,
            events,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn is_counting_down(&self) -> bool {
        self.phase == Phase::Countdown && self.state.is_active()
    }

    fn countdown_snapshot(&self) -> TimerSnapshot {
        let mut snapshot =
            TimerSnapshot::new(self.state, self.stopwatch.elapsed(), self.duration).with_rounds(0, None);
        snapshot.is_countdown = Some(true);
        snapshot.countdown_remaining = Some(snapshot.remaining);
        snapshot
    }

    fn announce(&self, event: TimerEvent) {
        self.events.emit(event);
        self.events.state_changed(self.state, self.snapshot());
    }

    fn beep(&mut self, remaining: Duration) {
        let seconds = ceil_seconds(remaining);
        if seconds == 0 || seconds > BEEP_SECONDS || self.last_beep == Some(seconds) {
            return;
        }
        self.last_beep = Some(seconds);
        self.events.cue(Cue::CountdownBeep { seconds });
    }

    /// Hand over to the inner timer, anchored at the countdown deadline so
    /// tick lateness is not charged to the workout.
    fn hand_over(&mut self, now: Instant, elapsed: Duration) {
        let overshoot = elapsed.saturating_sub(self.duration);
        let anchor = now.checked_sub(overshoot).unwrap_or(now);

        info!("Countdown complete, starting workout");
        self.events.cue(Cue::CountdownGo);
        self.phase = Phase::Delegating;
        self.inner.start(anchor);
        self.state = self.inner.state();
    }
}

impl<E: TimerControl> TimerControl for CountdownWrapper<E> {
    type Behavior = E::Behavior;

    fn start(&mut self, now: Instant) -> bool {
        if !self.state().can_start() {
            debug!("Ignoring start while {}", self.state());
            return false;
        }

        if self.duration.is_zero() {
            self.phase = Phase::Delegating;
            let started = self.inner.start(now);
            self.state = self.inner.state();
            return started;
        }

        self.phase = Phase::Countdown;
        self.state = TimerState::Running;
        self.stopwatch.start(now);
        self.last_beep = None;
        info!("Countdown started ({:?})", self.duration);
        self.announce(TimerEvent::CountdownStart);
        true
    }

    fn pause(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Delegating => self.inner.pause(now),
            Phase::Countdown => {
                if self.state != TimerState::Running {
                    debug!("Ignoring pause while {}", self.state);
                    return false;
                }
                self.stopwatch.pause(now);
                self.state = TimerState::Paused;
                self.announce(TimerEvent::Pause);
                true
            }
        }
    }

    fn resume(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::Delegating => self.inner.resume(now),
            Phase::Countdown => {
                if self.state != TimerState::Paused {
                    debug!("Ignoring resume while {}", self.state);
                    return false;
                }
                self.stopwatch.resume(now);
                self.state = TimerState::Running;
                self.announce(TimerEvent::Resume);
                true
            }
        }
    }

    fn reset(&mut self) -> bool {
        self.phase = Phase::Countdown;
        self.state = TimerState::Idle;
        self.stopwatch.clear();
        self.last_beep = None;
        // The inner reset emits the single Reset/StateChange pair.
        self.inner.reset();
        self.events.update_snapshot(self.snapshot());
        true
    }

    fn stop(&mut self) -> bool {
        match self.phase {
            Phase::Delegating => self.inner.stop(),
            Phase::Countdown => {
                if self.state.is_terminal() {
                    debug!("Ignoring stop while {}", self.state);
                    return false;
                }
                self.state = TimerState::Cancelled;
                info!("Countdown stopped");
                self.announce(TimerEvent::Stop);
                true
            }
        }
    }

    fn tick(&mut self, now: Instant) {
        match self.phase {
            Phase::Delegating => self.inner.tick(now),
            Phase::Countdown => {
                if self.state != TimerState::Running {
                    return;
                }
                let elapsed = self.stopwatch.sample(now);
                if elapsed >= self.duration {
                    self.hand_over(now, elapsed);
                    return;
                }
                self.beep(self.duration - elapsed);
                self.events.tick(self.countdown_snapshot());
            }
        }
    }

    fn act(&mut self, action: WorkoutAction, now: Instant) -> bool {
        match self.phase {
            Phase::Delegating => self.inner.act(action, now),
            Phase::Countdown => {
                debug!("Ignoring {:?} during countdown", action);
                false
            }
        }
    }

    fn snapshot(&self) -> TimerSnapshot {
        match self.phase {
            Phase::Countdown if self.state != TimerState::Idle => self.countdown_snapshot(),
            _ => {
                let mut snapshot = self.inner.snapshot();
                snapshot.is_countdown = Some(false);
                snapshot
            }
        }
    }

    fn state(&self) -> TimerState {
        match self.phase {
            Phase::Delegating => self.inner.state(),
            Phase::Countdown => self.state,
        }
    }

    fn elapsed(&self) -> Duration {
        match self.phase {
            Phase::Countdown if self.state != TimerState::Idle => self.stopwatch.elapsed(),
            _ => self.inner.elapsed(),
        }
    }

    fn events(&self) -> &EventBus {
        &self.events
    }

    fn behavior(&self) -> &E::Behavior {
        self.inner.behavior()
    }

    fn set_sound_enabled(&mut self, enabled: bool) {
        self.inner.set_sound_enabled(enabled);
    }
}

fn ceil_seconds(duration: Duration) -> u32 {
    let millis = duration.as_millis();
    u32::try_from(millis.div_ceil(1_000)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::CountdownWrapper;
    use crate::engine::{TimerControl, TimerEngine, WorkoutAction};
    use crate::events::{drain, Cue, TimerEvent};
    use crate::state::TimerState;
    use crate::workouts::{Amrap, AmrapConfig, Emom, EmomConfig};
    use std::time::Duration;
    use tokio::time::Instant;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn wrapped_amrap(countdown_secs: u64) -> CountdownWrapper<TimerEngine<Amrap>> {
        let inner = TimerEngine::new(Amrap::new(&AmrapConfig {
            duration: 60,
            movements: Vec::new(),
        }));
        CountdownWrapper::new(inner, Duration::from_secs(countdown_secs))
    }

    #[test]
    fn zero_countdown_starts_inner_immediately() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(0);
        let mut rx = timer.events().subscribe();

        assert!(timer.start(base));
        assert_eq!(timer.inner().state(), TimerState::Running);

        timer.tick(base + ms(100));
        let events = drain(&mut rx);
        assert!(!events.contains(&TimerEvent::CountdownStart));
        for event in &events {
            if let TimerEvent::Tick { snapshot } = event {
                assert_ne!(snapshot.is_countdown, Some(true));
            }
        }
        assert_eq!(timer.snapshot().is_countdown, Some(false));
        assert_eq!(timer.snapshot().elapsed, ms(100));
    }

    #[test]
    fn countdown_ticks_then_hands_over() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(3);
        let mut rx = timer.events().subscribe();

        timer.start(base);
        assert!(timer.is_counting_down());
        assert_eq!(timer.inner().state(), TimerState::Idle);

        timer.tick(base + ms(1_000));
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.is_countdown, Some(true));
        assert_eq!(snapshot.countdown_remaining, Some(ms(2_000)));

        // Late tick: 150ms past the deadline is credited to the workout.
        timer.tick(base + ms(3_150));
        assert!(!timer.is_counting_down());
        assert_eq!(timer.inner().state(), TimerState::Running);

        timer.tick(base + ms(3_400));
        assert_eq!(timer.snapshot().elapsed, ms(400));
        assert_eq!(timer.snapshot().is_countdown, Some(false));

        let names: Vec<_> = drain(&mut rx)
            .iter()
            .filter(|e| !e.is_tick() && !matches!(e, TimerEvent::Cue { .. }))
            .map(|e| e.name())
            .collect();
        assert_eq!(
            names,
            vec!["countdownStart", "stateChange", "start", "stateChange"]
        );
    }

    #[test]
    fn countdown_beeps_once_per_second_then_go() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(5);
        let mut rx = timer.events().subscribe();
        timer.start(base);

        for offset in (100..=5_000).step_by(100) {
            timer.tick(base + ms(offset));
        }

        let cues: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                TimerEvent::Cue { cue } => Some(cue),
                _ => None,
            })
            .collect();
        assert_eq!(
            cues,
            vec![
                Cue::CountdownBeep { seconds: 3 },
                Cue::CountdownBeep { seconds: 2 },
                Cue::CountdownBeep { seconds: 1 },
                Cue::CountdownGo,
            ]
        );
    }

    #[test]
    fn muted_countdown_emits_no_cues() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(2);
        timer.set_sound_enabled(false);
        let mut rx = timer.events().subscribe();
        timer.start(base);
        for offset in (100..=2_500).step_by(100) {
            timer.tick(base + ms(offset));
        }
        assert!(drain(&mut rx)
            .iter()
            .all(|e| !matches!(e, TimerEvent::Cue { .. })));
        assert!(!timer.inner().events().sound_enabled());
    }

    #[test]
    fn pause_routes_to_active_phase() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(2);
        timer.start(base);

        assert!(timer.pause(base + ms(500)));
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.inner().state(), TimerState::Idle);
        timer.tick(base + ms(5_000));
        assert!(timer.is_counting_down());

        timer.resume(base + ms(10_500));
        timer.tick(base + ms(12_000));
        assert_eq!(timer.inner().state(), TimerState::Running);

        assert!(timer.pause(base + ms(13_000)));
        assert_eq!(timer.inner().state(), TimerState::Paused);
        assert_eq!(timer.state(), TimerState::Paused);
    }

    #[test]
    fn reset_resets_both_phases() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(1);
        timer.start(base);
        timer.tick(base + ms(1_000));
        timer.tick(base + ms(4_000));
        assert_eq!(timer.inner().elapsed(), ms(3_000));

        let mut rx = timer.events().subscribe();
        timer.reset();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.inner().state(), TimerState::Idle);
        assert_eq!(timer.elapsed(), Duration::ZERO);

        let resets = drain(&mut rx)
            .iter()
            .filter(|e| **e == TimerEvent::Reset)
            .count();
        assert_eq!(resets, 1);

        // A fresh start counts down again.
        timer.start(base + ms(5_000));
        assert!(timer.is_counting_down());
    }

    #[test]
    fn stop_during_countdown_is_terminal() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(5);
        timer.start(base);
        assert!(timer.stop());
        assert_eq!(timer.state(), TimerState::Cancelled);
        assert!(!timer.start(base + ms(100)));
        timer.tick(base + ms(6_000));
        assert_eq!(timer.inner().state(), TimerState::Idle);
    }

    #[test]
    fn actions_are_ignored_until_workout_starts() {
        let base = Instant::now();
        let mut timer = wrapped_amrap(1);
        timer.start(base);
        assert!(!timer.act(WorkoutAction::IncrementRound, base + ms(200)));

        timer.tick(base + ms(1_000));
        assert!(timer.act(WorkoutAction::IncrementRound, base + ms(1_500)));
        assert_eq!(timer.behavior().rounds(), 1);
    }

    #[test]
    fn inner_boundary_events_are_relayed() {
        let base = Instant::now();
        let inner = TimerEngine::new(Emom::new(&EmomConfig {
            rounds: 3,
            interval: 10,
            movements: Vec::new(),
        }));
        let mut timer = CountdownWrapper::new(inner, Duration::from_secs(1));
        let mut rx = timer.events().subscribe();

        timer.start(base);
        timer.tick(base + ms(1_000));
        timer.tick(base + ms(1_100));
        timer.tick(base + ms(11_100));

        let rounds: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                TimerEvent::RoundStart { round } => Some(round),
                _ => None,
            })
            .collect();
        assert_eq!(rounds, vec![1, 2]);
    }
}
