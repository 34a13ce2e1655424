//! Lifecycle engine shared by every workout variant

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use super::{ActionOutcome, TimerBehavior, TimerControl, WorkoutAction};
use crate::events::{EventBus, TimerEvent};
use crate::state::{Stopwatch, TimerSnapshot, TimerState};

/// Idle → Running ⇄ Paused → Finished | Cancelled, with `reset` back to Idle
/// from anywhere.
#[derive(Debug)]
pub struct TimerEngine<B> {
    behavior: B,
    state: TimerState,
    stopwatch: Stopwatch,
    events: EventBus,
}

impl<B: TimerBehavior> TimerEngine<B> {
    pub fn new(behavior: B) -> Self {
        Self::with_events(behavior, EventBus::new())
    }

    /// Create an engine publishing on an existing bus
    pub fn with_events(behavior: B, events: EventBus) -> Self {
        let engine = Self {
            behavior,
            state: TimerState::Idle,
            stopwatch: Stopwatch::new(),
            events,
        };
        engine.events.update_snapshot(engine.snapshot());
        engine
    }

    fn announce(&self, event: TimerEvent) {
        self.events.emit(event);
        self.events.state_changed(self.state, self.snapshot());
    }

    fn finish(&mut self) {
        let elapsed = self.stopwatch.elapsed();
        self.state = TimerState::Finished;
        info!("Timer finished after {:?}", elapsed);
        self.announce(TimerEvent::Finish);
        self.behavior.on_finish(elapsed, &self.events);
    }
}

impl<B: TimerBehavior> TimerControl for TimerEngine<B> {
    type Behavior = B;

    fn start(&mut self, now: Instant) -> bool {
        if !self.state.can_start() {
            debug!("Ignoring start while {}", self.state);
            return false;
        }

        self.state = TimerState::Running;
        self.stopwatch.start(now);
        info!("Timer started");
        self.announce(TimerEvent::Start);
        self.behavior.on_start(self.stopwatch.elapsed(), &self.events);
        true
    }

    fn pause(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Running {
            debug!("Ignoring pause while {}", self.state);
            return false;
        }

        self.stopwatch.pause(now);
        self.state = TimerState::Paused;
        info!("Timer paused at {:?}", self.stopwatch.elapsed());
        self.announce(TimerEvent::Pause);
        true
    }

    fn resume(&mut self, now: Instant) -> bool {
        if self.state != TimerState::Paused {
            debug!("Ignoring resume while {}", self.state);
            return false;
        }

        self.stopwatch.resume(now);
        self.state = TimerState::Running;
        info!("Timer resumed");
        self.announce(TimerEvent::Resume);
        true
    }

    fn reset(&mut self) -> bool {
        self.stopwatch.clear();
        self.behavior.on_reset();
        self.state = TimerState::Idle;
        info!("Timer reset");
        self.announce(TimerEvent::Reset);
        true
    }

    fn stop(&mut self) -> bool {
        if self.state.is_terminal() {
            debug!("Ignoring stop while {}", self.state);
            return false;
        }

        self.state = TimerState::Cancelled;
        info!("Timer stopped at {:?}", self.stopwatch.elapsed());
        self.announce(TimerEvent::Stop);
        true
    }

    fn tick(&mut self, now: Instant) {
        if self.state != TimerState::Running {
            return;
        }

        let elapsed = self.stopwatch.sample(now);
        self.behavior.on_tick(elapsed, &self.events);
        self.events.tick(self.snapshot());

        if self.behavior.is_complete(elapsed) {
            self.finish();
        }
    }

    fn act(&mut self, action: WorkoutAction, now: Instant) -> bool {
        // Elapsed only moves while running; a terminal timer keeps its final time.
        let elapsed = if self.state == TimerState::Running {
            self.stopwatch.sample(now)
        } else {
            self.stopwatch.elapsed()
        };
        match self
            .behavior
            .handle(action, self.state, elapsed, &self.events)
        {
            ActionOutcome::Ignored => {
                debug!("Ignoring {:?} while {}", action, self.state);
                false
            }
            ActionOutcome::Handled => {
                self.events.update_snapshot(self.snapshot());
                true
            }
            ActionOutcome::Finish => {
                self.finish();
                true
            }
        }
    }

    fn snapshot(&self) -> TimerSnapshot {
        self.behavior.snapshot(self.state, self.stopwatch.elapsed())
    }

    fn state(&self) -> TimerState {
        self.state
    }

    fn elapsed(&self) -> Duration {
        self.stopwatch.elapsed()
    }

    fn events(&self) -> &EventBus {
        &self.events
    }

    fn behavior(&self) -> &B {
        &self.behavior
    }
}
