//! Event notification channel
//!
//! Timers publish typed [`TimerEvent`]s on a broadcast channel and keep the
//! latest [`TimerSnapshot`] in a watch channel. Subscribing replaces `on`,
//! dropping the receiver replaces `off`. Each subscriber consumes events on
//! its own task, so a slow or panicking listener never blocks a tick or
//! another listener; a subscriber that falls behind sees
//! `RecvError::Lagged` and skips ahead.

pub mod event;

pub use event::{Cue, TimerEvent};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::{broadcast, watch};
use tracing::{trace, warn};

use crate::state::{TimerSnapshot, TimerState};

/// Capacity of the event broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Shared publishing side of a timer's event channels.
///
/// Cloning yields another handle onto the same channels; the countdown
/// decorator relies on this to relay its inner timer's events verbatim.
#[derive(Debug, Clone)]
pub struct EventBus {
    event_tx: broadcast::Sender<TimerEvent>,
    snapshot_tx: Arc<watch::Sender<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
    sound_enabled: Arc<AtomicBool>,
}

impl EventBus {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(TimerSnapshot::default());

        Self {
            event_tx,
            snapshot_tx: Arc::new(snapshot_tx),
            _snapshot_rx: snapshot_rx,
            sound_enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Subscribe to every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Watch the most recently published snapshot
    pub fn watch(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn emit(&self, event: TimerEvent) {
        // No subscribers is a normal condition, not a failure.
        if self.event_tx.send(event).is_err() {
            trace!("Timer event dropped, no subscribers");
        }
    }

    /// Publish a tick: the snapshot goes out as an event and becomes the
    /// watched value.
    pub fn tick(&self, snapshot: TimerSnapshot) {
        self.update_snapshot(snapshot.clone());
        self.emit(TimerEvent::Tick { snapshot });
    }

    /// Announce a lifecycle transition to `state`
    pub fn state_changed(&self, state: TimerState, snapshot: TimerSnapshot) {
        self.update_snapshot(snapshot);
        self.emit(TimerEvent::StateChange { state });
    }

    /// Replace the watched snapshot without emitting an event
    pub fn update_snapshot(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send snapshot update: {}", e);
        }
    }

    /// Emit an advisory cue if sound is enabled
    pub fn cue(&self, cue: Cue) {
        if self.sound_enabled() {
            self.emit(TimerEvent::Cue { cue });
        }
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.sound_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled.load(Ordering::Relaxed)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain every event currently buffered on `rx`, skipping over lag.
pub fn drain(rx: &mut broadcast::Receiver<TimerEvent>) -> Vec<TimerEvent> {
    let mut events = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!("Event receiver lagged, skipped {} events", skipped);
            }
            Err(_) => break,
        }
    }
    events
}
