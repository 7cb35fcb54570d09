//! Recurring tick capability.
//!
//! The coordinator arms a ticker when a session starts and disarms it on
//! pause/reset. Arming always clears any existing timer first so a
//! duplicate tick source can never exist.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::coordinator::Command;

/// Injected clock boundary; replaceable by a no-op in tests where ticks
/// are driven by hand.
pub trait TickTimer: Send {
    /// Arm the recurring tick, clearing any existing one first.
    fn arm(&mut self, queue: mpsc::Sender<Command>);
    /// Cancel the recurring tick. Safe to call when not armed.
    fn disarm(&mut self);
}

/// Tokio-backed one-second ticker feeding the coordinator queue.
pub struct TokioTicker {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl TokioTicker {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    /// Shorter periods are useful for demos and soak tests.
    pub fn with_period(period: Duration) -> Self {
        Self { period, task: None }
    }
}

impl Default for TokioTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickTimer for TokioTicker {
    fn arm(&mut self, queue: mpsc::Sender<Command>) {
        self.disarm();
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first interval tick fires immediately; skip it so the
            // countdown starts a full period after start().
            interval.tick().await;
            loop {
                interval.tick().await;
                if queue.send(Command::Tick).await.is_err() {
                    break;
                }
            }
        }));
    }

    fn disarm(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTicker {
    fn drop(&mut self) {
        self.disarm();
    }
}

/// Ticker that never fires; tests send `Command::Tick` themselves.
pub struct NoopTicker;

impl TickTimer for NoopTicker {
    fn arm(&mut self, _queue: mpsc::Sender<Command>) {}
    fn disarm(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ticker_sends_ticks_until_disarmed() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = TokioTicker::with_period(Duration::from_millis(5));
        ticker.arm(tx);
        assert!(matches!(rx.recv().await, Some(Command::Tick)));
        assert!(matches!(rx.recv().await, Some(Command::Tick)));
        ticker.disarm();
    }

    #[tokio::test]
    async fn rearm_replaces_the_previous_timer() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut ticker = TokioTicker::with_period(Duration::from_millis(5));
        ticker.arm(tx.clone());
        ticker.arm(tx);
        assert!(matches!(rx.recv().await, Some(Command::Tick)));
        ticker.disarm();
    }
}
