//! Async timer handle
//!
//! [`Timer`] owns a synchronous engine behind a mutex and drives it with at
//! most one periodic tick task. The task exists only while the engine is
//! running: pausing, stopping or resetting aborts it, finishing ends it from
//! inside, and starting or resuming spawns a fresh one. All methods must be
//! called from within a tokio runtime.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::engine::{TimerControl, WorkoutAction, TICK_PERIOD};
use crate::events::{EventBus, TimerEvent};
use crate::state::{TimerSnapshot, TimerState};
use crate::workouts::{Interval, TabataPhase, Workout, WorkoutKind};

pub struct Timer<E: TimerControl> {
    engine: Arc<Mutex<E>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    events: EventBus,
}

impl<E: TimerControl> Timer<E> {
    pub fn new(engine: E) -> Self {
        let events = engine.events().clone();
        Self {
            engine: Arc::new(Mutex::new(engine)),
            ticker: Mutex::new(None),
            events,
        }
    }

    pub fn start(&self) -> bool {
        self.control(|engine, now| engine.start(now))
    }

    pub fn pause(&self) -> bool {
        self.control(|engine, now| engine.pause(now))
    }

    pub fn resume(&self) -> bool {
        self.control(|engine, now| engine.resume(now))
    }

    pub fn reset(&self) -> bool {
        self.control(|engine, _| engine.reset())
    }

    pub fn stop(&self) -> bool {
        self.control(|engine, _| engine.stop())
    }

    /// AMRAP lap
    pub fn increment_round(&self) -> bool {
        self.act(WorkoutAction::IncrementRound)
    }

    /// For-time round completion
    pub fn complete_round(&self) -> bool {
        self.act(WorkoutAction::CompleteRound)
    }

    pub fn act(&self, action: WorkoutAction) -> bool {
        self.control(|engine, now| engine.act(action, now))
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        lock(&self.engine).snapshot()
    }

    pub fn state(&self) -> TimerState {
        lock(&self.engine).state()
    }

    pub fn elapsed(&self) -> Duration {
        lock(&self.engine).elapsed()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.events.watch()
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        lock(&self.engine).set_sound_enabled(enabled);
    }

    pub fn sound_enabled(&self) -> bool {
        self.events.sound_enabled()
    }

    /// Read the engine under its lock
    pub fn inspect<R>(&self, f: impl FnOnce(&E) -> R) -> R {
        f(&lock(&self.engine))
    }

    /// Whether a tick task is currently alive
    pub fn is_ticking(&self) -> bool {
        lock(&self.ticker)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Resolve once the timer reaches `Finished` or `Cancelled`
    pub async fn wait_until_done(&self) -> TimerState {
        let mut snapshots = self.events.watch();
        loop {
            let state = self.state();
            if state.is_terminal() {
                return state;
            }
            if snapshots.changed().await.is_err() {
                return self.state();
            }
        }
    }

    fn control(&self, f: impl FnOnce(&mut E, Instant) -> bool) -> bool {
        let changed = f(&mut lock(&self.engine), Instant::now());
        self.sync_ticker();
        changed
    }

    /// Make the tick task match the engine: alive exactly while it ticks
    fn sync_ticker(&self) {
        let ticking = lock(&self.engine).is_ticking();
        let mut ticker = lock(&self.ticker);

        if !ticking {
            if let Some(handle) = ticker.take() {
                debug!("Stopping tick task");
                handle.abort();
            }
            return;
        }

        let alive = ticker.as_ref().is_some_and(|handle| !handle.is_finished());
        if !alive {
            debug!("Spawning tick task");
            *ticker = Some(spawn_ticker(Arc::clone(&self.engine)));
        }
    }
}

impl<E: TimerControl<Behavior = Workout>> Timer<E> {
    pub fn kind(&self) -> WorkoutKind {
        self.inspect(|engine| engine.behavior().kind())
    }

    /// Record a lap on workouts that take one (AMRAP, ForTime)
    pub fn lap(&self) -> bool {
        match self.inspect(|engine| engine.behavior().lap_action()) {
            Some(action) => self.act(action),
            None => {
                debug!("Lap ignored for {} workouts", self.kind());
                false
            }
        }
    }

    pub fn rounds(&self) -> Option<u32> {
        self.inspect(|engine| engine.behavior().rounds())
    }

    pub fn split_times(&self) -> Vec<Duration> {
        self.inspect(|engine| engine.behavior().split_times().to_vec())
    }

    pub fn intervals(&self) -> Vec<Interval> {
        self.inspect(|engine| engine.behavior().intervals().to_vec())
    }

    pub fn current_interval(&self) -> Option<Interval> {
        self.inspect(|engine| {
            engine
                .behavior()
                .current_interval(engine.elapsed())
                .cloned()
        })
    }

    pub fn current_phase(&self) -> Option<TabataPhase> {
        self.inspect(|engine| engine.behavior().current_phase(engine.elapsed()))
    }
}

impl<E: TimerControl> Drop for Timer<E> {
    fn drop(&mut self) {
        if let Some(handle) = lock(&self.ticker).take() {
            handle.abort();
        }
    }
}

fn spawn_ticker<E: TimerControl>(engine: Arc<Mutex<E>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let still_ticking = {
                let mut engine = lock(&engine);
                engine.tick(Instant::now());
                engine.is_ticking()
            };
            if !still_ticking {
                debug!("Engine stopped ticking, ending tick task");
                break;
            }
        }
    })
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("Timer lock poisoned, recovering");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::Timer;
    use crate::engine::TimerEngine;
    use crate::events::{drain, TimerEvent};
    use crate::state::TimerState;
    use crate::workouts::{Amrap, AmrapConfig};
    use std::time::Duration;
    use tokio::time::sleep;

    fn amrap(seconds: u32) -> Timer<TimerEngine<Amrap>> {
        Timer::new(TimerEngine::new(Amrap::new(&AmrapConfig {
            duration: seconds,
            movements: Vec::new(),
        })))
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_100ms_while_running() {
        let timer = amrap(60);
        let mut rx = timer.subscribe();
        assert!(!timer.is_ticking());

        timer.start();
        assert!(timer.is_ticking());
        sleep(ms(1_050)).await;

        let ticks = drain(&mut rx).iter().filter(|e| e.is_tick()).count();
        assert_eq!(ticks, 10);
        assert_eq!(timer.snapshot().elapsed, ms(1_000));
        assert_eq!(timer.watch().borrow().elapsed, ms(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_suspends_the_tick_task() {
        let timer = amrap(60);
        timer.start();
        sleep(ms(550)).await;

        assert!(timer.pause());
        assert!(!timer.is_ticking());
        let mut rx = timer.subscribe();
        sleep(ms(5_000)).await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(timer.elapsed(), ms(550));

        assert!(timer.resume());
        sleep(ms(250)).await;
        assert_eq!(timer.elapsed(), ms(750));
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_ends_the_tick_task() {
        let timer = amrap(1);
        let mut rx = timer.subscribe();
        timer.start();

        assert_eq!(timer.wait_until_done().await, TimerState::Finished);
        sleep(ms(2_000)).await;

        let events = drain(&mut rx);
        let finish = events
            .iter()
            .position(|e| *e == TimerEvent::Finish)
            .expect("finish emitted");
        assert!(events[finish..].iter().all(|e| !e.is_tick()));
        assert!(!timer.is_ticking());
        assert_eq!(timer.snapshot().remaining, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_terminal_and_observable() {
        let timer = amrap(60);
        timer.start();
        sleep(ms(300)).await;

        assert!(timer.stop());
        assert_eq!(timer.wait_until_done().await, TimerState::Cancelled);
        assert!(!timer.start());
        assert!(!timer.is_ticking());
    }
}
