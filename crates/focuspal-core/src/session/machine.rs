//! Session state machine.
//!
//! The machine is tick-driven and free of wall-clock reads for countdown
//! purposes: the caller arms a one-second ticker and calls `tick()` on each
//! fire. It performs no IO -- persisting the state mirror, reconciling
//! blocking rules, and broadcasting events are the coordinator's job,
//! driven by the `Event` each command returns.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(k) -> Running(k) -> Idle(k)
//!            Running(k) -> Running(other k)   (completion auto-starts)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::durations::Durations;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Focus,
    Break,
}

impl SessionKind {
    pub fn other(self) -> Self {
        match self {
            SessionKind::Focus => SessionKind::Break,
            SessionKind::Break => SessionKind::Focus,
        }
    }
}

/// The authoritative timer state, mirrored to the persistent store after
/// every mutation.
///
/// Invariant: `blocking == (running && session_kind == Focus)` at every
/// observable point, and `time_left` never goes negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub running: bool,
    /// Remaining time in seconds for the current session.
    pub time_left: u32,
    pub session_kind: SessionKind,
    /// Focus sessions completed since the machine was last initialized.
    pub completed_count: u32,
    /// Cached derived flag; true iff a focus session is currently enforced.
    pub blocking: bool,
}

impl SessionState {
    /// A fresh idle state of `kind` with a full interval on the clock.
    pub fn initial(kind: SessionKind, durations: &Durations) -> Self {
        Self {
            running: false,
            time_left: durations.secs_for(kind),
            session_kind: kind,
            completed_count: 0,
            blocking: false,
        }
    }
}

/// Core session state machine.
pub struct SessionMachine {
    state: SessionState,
}

impl SessionMachine {
    pub fn new(state: SessionState) -> Self {
        Self { state }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Whether blocking rules should currently exist.
    pub fn blocking_desired(&self) -> bool {
        self.state.running && self.state.session_kind == SessionKind::Focus
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// `Idle(k) -> Running(k)`. No-op if already running.
    pub fn start(&mut self) -> Option<Event> {
        if self.state.running {
            return None;
        }
        self.state.running = true;
        self.state.blocking = self.blocking_desired();
        Some(Event::TimerStarted {
            session_kind: self.state.session_kind,
            time_left: self.state.time_left,
            at: Utc::now(),
        })
    }

    /// `Running(k) -> Idle(k)`, leaving `time_left` intact. No-op if idle.
    pub fn pause(&mut self) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.running = false;
        self.state.blocking = false;
        Some(Event::TimerPaused {
            time_left: self.state.time_left,
            at: Utc::now(),
        })
    }

    /// Any state -> `Idle(current kind)` with `time_left` recomputed from
    /// the current configured duration.
    pub fn reset(&mut self, durations: &Durations) -> Option<Event> {
        self.state.running = false;
        self.state.blocking = false;
        self.state.time_left = durations.secs_for(self.state.session_kind);
        Some(Event::TimerReset {
            time_left: self.state.time_left,
            at: Utc::now(),
        })
    }

    /// One-second advance. Only meaningful while running; completes the
    /// session when the countdown reaches zero.
    pub fn tick(&mut self, durations: &Durations) -> Option<Event> {
        if !self.state.running {
            return None;
        }
        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left == 0 {
            return Some(self.complete_session(durations));
        }
        Some(Event::TimerUpdate {
            time_left: self.state.time_left,
            at: Utc::now(),
        })
    }

    /// Manual skip: zero the countdown and complete the current session
    /// immediately, regardless of running state.
    pub fn force_end(&mut self, durations: &Durations) -> Event {
        self.state.time_left = 0;
        self.complete_session(durations)
    }

    /// Re-derive `time_left` from current durations, but only while idle;
    /// a running countdown is never disturbed by a settings edit.
    pub fn settings_changed(&mut self, durations: &Durations) -> Option<Event> {
        if self.state.running {
            return None;
        }
        self.state.time_left = durations.secs_for(self.state.session_kind);
        Some(Event::TimerUpdate {
            time_left: self.state.time_left,
            at: Utc::now(),
        })
    }

    /// Switch kind, credit a finished focus session, and auto-start the
    /// next session -- there is no idle gap unless the user pauses.
    fn complete_session(&mut self, durations: &Durations) -> Event {
        let finished = self.state.session_kind;
        if finished == SessionKind::Focus {
            self.state.completed_count = self.state.completed_count.saturating_add(1);
        }
        let next = finished.other();
        self.state.session_kind = next;
        self.state.time_left = durations.secs_for(next);
        self.state.running = true;
        self.state.blocking = self.blocking_desired();
        Event::SessionComplete {
            finished,
            next,
            completed_count: self.state.completed_count,
            time_left: self.state.time_left,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn machine() -> SessionMachine {
        SessionMachine::new(SessionState::initial(
            SessionKind::Focus,
            &Durations::default(),
        ))
    }

    fn blocking_invariant(m: &SessionMachine) -> bool {
        m.state().blocking == (m.state().running && m.state().session_kind == SessionKind::Focus)
    }

    #[test]
    fn start_enables_blocking_for_focus() {
        let mut m = machine();
        assert!(m.start().is_some());
        assert!(m.state().running);
        assert!(m.state().blocking);
        assert!(blocking_invariant(&m));
    }

    #[test]
    fn start_is_a_noop_while_running() {
        let mut m = machine();
        m.start();
        let before = m.state().clone();
        assert!(m.start().is_none());
        assert_eq!(*m.state(), before);
    }

    #[test]
    fn pause_keeps_time_left_and_disables_blocking() {
        let d = Durations::default();
        let mut m = machine();
        m.start();
        m.tick(&d);
        m.tick(&d);
        assert!(m.pause().is_some());
        assert!(!m.state().running);
        assert!(!m.state().blocking);
        assert_eq!(m.state().time_left, 25 * 60 - 2);
    }

    #[test]
    fn pause_twice_is_idempotent() {
        let mut m = machine();
        m.start();
        m.pause();
        let once = m.state().clone();
        assert!(m.pause().is_none());
        assert_eq!(*m.state(), once);
    }

    #[test]
    fn reset_twice_is_idempotent() {
        let d = Durations::default();
        let mut m = machine();
        m.start();
        m.tick(&d);
        m.reset(&d);
        let once = m.state().clone();
        m.reset(&d);
        assert_eq!(*m.state(), once);
        assert_eq!(m.state().time_left, 25 * 60);
        assert!(!m.state().blocking);
    }

    #[test]
    fn tick_while_idle_does_nothing() {
        let d = Durations::default();
        let mut m = machine();
        assert!(m.tick(&d).is_none());
        assert_eq!(m.state().time_left, 25 * 60);
    }

    // Scenario: 25-minute focus runs down to an auto-started break.
    #[test]
    fn full_focus_session_rolls_into_break() {
        let d = Durations::default();
        let mut m = machine();
        m.start();
        let mut completed = None;
        for _ in 0..1500 {
            if let Some(event @ Event::SessionComplete { .. }) = m.tick(&d) {
                completed = Some(event);
            }
        }
        match completed {
            Some(Event::SessionComplete {
                finished,
                next,
                completed_count,
                ..
            }) => {
                assert_eq!(finished, SessionKind::Focus);
                assert_eq!(next, SessionKind::Break);
                assert_eq!(completed_count, 1);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(m.state().session_kind, SessionKind::Break);
        assert_eq!(m.state().time_left, 5 * 60);
        assert!(m.state().running, "next session auto-starts");
        assert!(!m.state().blocking, "no blocking during break");
    }

    #[test]
    fn break_completion_returns_to_focus_without_crediting() {
        let d = Durations::default();
        let mut m = machine();
        m.start();
        for _ in 0..1500 {
            m.tick(&d);
        }
        assert_eq!(m.state().session_kind, SessionKind::Break);
        for _ in 0..300 {
            m.tick(&d);
        }
        assert_eq!(m.state().session_kind, SessionKind::Focus);
        assert_eq!(m.state().completed_count, 1, "break does not count");
        assert!(m.state().running);
        assert!(m.state().blocking);
    }

    // Scenario: manual skip fires the transition even while paused.
    #[test]
    fn force_end_completes_even_when_idle() {
        let d = Durations::default();
        let mut m = SessionMachine::new(SessionState {
            running: false,
            time_left: 600,
            session_kind: SessionKind::Focus,
            completed_count: 0,
            blocking: false,
        });
        let event = m.force_end(&d);
        assert!(matches!(event, Event::SessionComplete { .. }));
        assert_eq!(m.state().session_kind, SessionKind::Break);
        assert_eq!(m.state().completed_count, 1);
        assert!(m.state().running);
    }

    #[test]
    fn settings_changed_rederives_only_while_idle() {
        let mut m = machine();
        let longer = Durations {
            focus_min: 50,
            break_min: 10,
        };
        assert!(m.settings_changed(&longer).is_some());
        assert_eq!(m.state().time_left, 50 * 60);

        m.start();
        assert!(m.settings_changed(&Durations::default()).is_none());
        assert_eq!(m.state().time_left, 50 * 60);
    }

    proptest! {
        // time_left is strictly non-increasing across ticks within a
        // session and never negative; the blocking invariant holds after
        // every operation.
        #[test]
        fn tick_sequences_never_underflow(ops in proptest::collection::vec(0u8..5, 1..200)) {
            let d = Durations { focus_min: 1, break_min: 1 };
            let mut m = SessionMachine::new(SessionState::initial(SessionKind::Focus, &d));
            for op in ops {
                let before = m.state().time_left;
                let completed = match op {
                    0 => { m.start(); false }
                    1 => { m.pause(); false }
                    2 => { m.reset(&d); false }
                    3 => matches!(m.tick(&d), Some(Event::SessionComplete { .. })),
                    _ => { m.force_end(&d); true }
                };
                if op == 3 && !completed && m.state().running {
                    prop_assert!(m.state().time_left < before);
                }
                prop_assert!(blocking_invariant(&m));
            }
        }
    }
}
