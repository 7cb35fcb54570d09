//! # FocusPal Core Library
//!
//! Core business logic for FocusPal, a focus/break interval timer that
//! blocks distracting sites while a focus session runs. The CLI binary is
//! a thin layer over this library; any other display surface subscribes to
//! the same event bus.
//!
//! ## Architecture
//!
//! - **Session machine**: a tick-driven state machine; the caller arms a
//!   one-second ticker and feeds `tick()` commands
//! - **Coordinator**: single owner of the state, processing all commands
//!   run-to-completion through one queue
//! - **Blocking synchronizer**: recomputes and wholesale-replaces the
//!   external redirect rule set whenever blocking should change
//! - **Storage**: SQLite key-value mirror plus TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: timer state machine
//! - [`Coordinator`]: command loop and collaborator wiring
//! - [`StateStore`] / [`RuleEngine`] / [`Notifier`] / [`TickTimer`]:
//!   injected collaborator boundaries

pub mod blocking;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod notify;
pub mod session;
pub mod stats;
pub mod storage;

pub use blocking::{BlockRule, FileRuleEngine, RuleEngine};
pub use clock::{NoopTicker, TickTimer, TokioTicker};
pub use coordinator::{Command, Coordinator};
pub use error::{ConfigError, CoreError, RuleEngineError, StoreError};
pub use events::{Event, EventBus};
pub use notify::{AudioSignal, GatedNotifier, LogNotifier, Notification, Notifier};
pub use session::{Durations, SessionKind, SessionMachine, SessionState};
pub use stats::DailyStats;
pub use storage::{data_dir, Config, MemoryStore, SqliteStore, StateStore};
