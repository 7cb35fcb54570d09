use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::session::SessionKind;

/// Every externally visible state change produces one broadcast event.
/// Display surfaces subscribe; delivery is fire-and-forget and the absence
/// of any listener is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    TimerStarted {
        session_kind: SessionKind,
        time_left: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        time_left: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        time_left: u32,
        at: DateTime<Utc>,
    },
    TimerUpdate {
        time_left: u32,
        at: DateTime<Utc>,
    },
    SessionComplete {
        finished: SessionKind,
        next: SessionKind,
        completed_count: u32,
        time_left: u32,
        at: DateTime<Utc>,
    },
    OptionsChanged {
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn options_changed() -> Self {
        Event::OptionsChanged { at: Utc::now() }
    }
}

/// Typed broadcast bus for [`Event`].
///
/// Wraps `tokio::sync::broadcast`; publishing to zero receivers succeeds
/// silently, matching the fire-and-forget contract.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    ///
    /// Never fails from the publisher's point of view.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
