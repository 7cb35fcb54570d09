//! Session coordinator: single logical owner of the authoritative state.
//!
//! Every mutation -- tick, user command, or blocklist change notification
//! -- flows through one queue and is handled to completion before the next
//! is processed, so `SessionState` needs no lock. Store and rule-engine
//! calls may suspend, but the queue guarantees no second mutation overlaps
//! one in flight.
//!
//! Collaborators are injected behind traits so tests run against fakes:
//! [`StateStore`], [`RuleEngine`], [`Notifier`], [`TickTimer`].

use chrono::{Local, NaiveDate};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::blocking::{reconcile, RuleEngine};
use crate::clock::TickTimer;
use crate::error::CoreError;
use crate::events::{Event, EventBus};
use crate::notify::{AudioSignal, Notification, Notifier};
use crate::session::{Durations, SessionKind, SessionMachine, SessionState};
use crate::stats::{self, DailyStats};
use crate::storage::{keys, StateStore};

const QUEUE_DEPTH: usize = 64;

/// Everything the coordinator can be asked to do.
#[derive(Debug)]
pub enum Command {
    StartTimer,
    PauseTimer,
    ResetTimer,
    /// Alias: skip session.
    ForceSessionEnd,
    /// Re-derive `time_left` from current durations if idle.
    TimerSettingsChanged,
    /// The external blocklist editor changed `blockedSites`.
    BlocklistChanged,
    Tick,
    GetState(oneshot::Sender<SessionState>),
    Shutdown,
}

pub struct Coordinator {
    machine: SessionMachine,
    stats: DailyStats,
    store: Box<dyn StateStore>,
    rules: Box<dyn RuleEngine>,
    notifier: Box<dyn Notifier>,
    ticker: Box<dyn TickTimer>,
    bus: EventBus,
    redirect_target: String,
    queue_tx: mpsc::Sender<Command>,
    queue_rx: mpsc::Receiver<Command>,
}

impl Coordinator {
    /// Build a coordinator around the persisted state mirror.
    ///
    /// The mirror is restored verbatim; call [`recover`](Self::recover)
    /// when this process is the (re)starting owner of the timer.
    pub fn new(
        store: Box<dyn StateStore>,
        rules: Box<dyn RuleEngine>,
        notifier: Box<dyn Notifier>,
        ticker: Box<dyn TickTimer>,
        redirect_target: String,
    ) -> Result<Self, CoreError> {
        let durations = read_durations(&*store);
        let machine = match read_state(&*store) {
            Some(state) => SessionMachine::new(state),
            None => SessionMachine::new(SessionState::initial(SessionKind::Focus, &durations)),
        };
        let stats = read_stats(&*store);
        let (queue_tx, queue_rx) = mpsc::channel(QUEUE_DEPTH);
        Ok(Self {
            machine,
            stats,
            store,
            rules,
            notifier,
            ticker,
            bus: EventBus::default(),
            redirect_target,
            queue_tx,
            queue_rx,
        })
    }

    /// Queue handle for tickers and external callers.
    pub fn sender(&self) -> mpsc::Sender<Command> {
        self.queue_tx.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    pub fn state(&self) -> &SessionState {
        self.machine.state()
    }

    pub fn stats(&self) -> &DailyStats {
        &self.stats
    }

    /// Startup recovery: keep the persisted session kind but come up idle
    /// with a full interval, and clear any rules a previous process left
    /// behind (no ghost blocking across restarts).
    pub async fn recover(&mut self) {
        let durations = read_durations(&*self.store);
        let kind = self.machine.state().session_kind;
        self.machine = SessionMachine::new(SessionState::initial(kind, &durations));
        self.persist_state();
        self.sync_blocking().await;
    }

    /// Process queued commands until [`Command::Shutdown`].
    pub async fn run(mut self) {
        while let Some(command) = self.queue_rx.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle(command).await;
        }
        self.ticker.disarm();
        self.persist_state();
    }

    /// Handle one command to completion (run-to-completion semantics).
    pub async fn handle(&mut self, command: Command) {
        match command {
            Command::StartTimer => {
                if let Some(event) = self.machine.start() {
                    self.ticker.arm(self.queue_tx.clone());
                    self.persist_state();
                    self.sync_blocking().await;
                    self.notifier.audio(AudioSignal::Play);
                    self.bus.publish(event);
                }
            }
            Command::PauseTimer => {
                if let Some(event) = self.machine.pause() {
                    self.ticker.disarm();
                    self.persist_state();
                    self.sync_blocking().await;
                    self.notifier.audio(AudioSignal::Pause);
                    self.bus.publish(event);
                }
            }
            Command::ResetTimer => {
                let durations = read_durations(&*self.store);
                if let Some(event) = self.machine.reset(&durations) {
                    self.ticker.disarm();
                    self.persist_state();
                    self.sync_blocking().await;
                    self.notifier.audio(AudioSignal::Pause);
                    self.bus.publish(event);
                }
            }
            Command::ForceSessionEnd => {
                let durations = read_durations(&*self.store);
                let event = self.machine.force_end(&durations);
                self.finish_session(event).await;
            }
            Command::Tick => {
                let durations = read_durations(&*self.store);
                match self.machine.tick(&durations) {
                    Some(event @ Event::SessionComplete { .. }) => {
                        self.finish_session(event).await;
                    }
                    Some(event) => {
                        self.persist_state();
                        self.bus.publish(event);
                    }
                    None => {}
                }
            }
            Command::TimerSettingsChanged => {
                let durations = read_durations(&*self.store);
                if let Some(event) = self.machine.settings_changed(&durations) {
                    self.persist_state();
                    self.bus.publish(event);
                }
                self.bus.publish(Event::options_changed());
            }
            Command::BlocklistChanged => {
                // Keeps blocking exactly in step with edits made mid-session.
                self.sync_blocking().await;
                self.bus.publish(Event::options_changed());
            }
            Command::GetState(reply) => {
                let _ = reply.send(self.machine.state().clone());
            }
            Command::Shutdown => {}
        }
    }

    /// Session completion: credit stats, re-arm the tick for the
    /// auto-started next session, reconcile blocking, notify.
    async fn finish_session(&mut self, event: Event) {
        let next = match &event {
            Event::SessionComplete { finished, next, .. } => {
                if *finished == SessionKind::Focus {
                    self.stats = stats::record_completion(local_today(), &self.stats);
                    self.persist_stats();
                }
                *next
            }
            _ => return,
        };
        self.ticker.arm(self.queue_tx.clone());
        self.persist_state();
        self.sync_blocking().await;
        self.notifier.notify(&Notification::for_completion(next));
        self.notifier.audio(match next {
            SessionKind::Focus => AudioSignal::Play,
            SessionKind::Break => AudioSignal::Pause,
        });
        self.bus.publish(event);
    }

    async fn sync_blocking(&self) {
        let patterns = read_blocklist(&*self.store);
        let desired = self.machine.blocking_desired();
        match reconcile(&*self.rules, &patterns, desired, &self.redirect_target).await {
            Ok(count) => debug!(count, desired, "reconciled blocking rules"),
            Err(error) => warn!(%error, "blocking reconciliation failed"),
        }
    }

    /// Mirror the state to the store, best effort.
    fn persist_state(&self) {
        let state = self.machine.state();
        match serde_json::to_string(state) {
            Ok(raw) => {
                if let Err(error) = self.store.kv_set(keys::TIMER_STATE, &raw) {
                    warn!(%error, "failed to persist timer state");
                }
            }
            Err(error) => warn!(%error, "failed to encode timer state"),
        }
        if let Err(error) = self
            .store
            .kv_set(keys::COMPLETED_SESSIONS, &state.completed_count.to_string())
        {
            warn!(%error, "failed to persist completed-session count");
        }
    }

    fn persist_stats(&self) {
        let writes = [
            (keys::STREAK, self.stats.streak.to_string()),
            (keys::SESSIONS_TODAY, self.stats.sessions_today.to_string()),
            (
                keys::LAST_SESSION_DATE,
                self.stats
                    .last_session_date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
            ),
        ];
        for (key, value) in writes {
            if let Err(error) = self.store.kv_set(key, &value) {
                warn!(key, %error, "failed to persist stats");
            }
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn read_durations(store: &dyn StateStore) -> Durations {
    let focus = kv_get_logged(store, keys::FOCUS_TIME);
    let brk = kv_get_logged(store, keys::BREAK_TIME);
    Durations::from_store_values(focus.as_deref(), brk.as_deref())
}

fn read_state(store: &dyn StateStore) -> Option<SessionState> {
    let raw = kv_get_logged(store, keys::TIMER_STATE)?;
    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(error) => {
            warn!(%error, "discarding malformed persisted timer state");
            None
        }
    }
}

fn read_stats(store: &dyn StateStore) -> DailyStats {
    let last_session_date = kv_get_logged(store, keys::LAST_SESSION_DATE)
        .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok());
    let streak = kv_get_logged(store, keys::STREAK)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0);
    let sessions_today = kv_get_logged(store, keys::SESSIONS_TODAY)
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(0);
    DailyStats {
        last_session_date,
        streak,
        sessions_today,
    }
}

/// Read the ordered blocklist; malformed content fails open to empty.
pub fn read_blocklist(store: &dyn StateStore) -> Vec<String> {
    kv_get_logged(store, keys::BLOCKED_SITES)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default()
}

fn kv_get_logged(store: &dyn StateStore, key: &str) -> Option<String> {
    match store.kv_get(key) {
        Ok(value) => value,
        Err(error) => {
            warn!(key, %error, "store read failed; continuing with defaults");
            None
        }
    }
}
