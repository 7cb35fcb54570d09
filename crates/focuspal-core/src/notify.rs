//! User notifications and the two-state audio signal.

use serde::{Deserialize, Serialize};

use crate::session::SessionKind;

/// Play/pause signal routed to any listening audio surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioSignal {
    Play,
    Pause,
}

/// A user-facing notification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Optional icon name or path; desktop notifiers use it, the log
    /// notifier ignores it.
    pub icon: Option<String>,
}

impl Notification {
    /// The completion notification, chosen by the kind of the session that
    /// is about to begin.
    pub fn for_completion(next: SessionKind) -> Self {
        match next {
            SessionKind::Break => Self {
                title: "Focus complete!".to_string(),
                body: "Nice work - it's break time. Enjoy a short rest, you've earned it!"
                    .to_string(),
                icon: None,
            },
            SessionKind::Focus => Self {
                title: "Break's over".to_string(),
                body: "Let's refocus and get back into your flow. Time for your next session!"
                    .to_string(),
                icon: None,
            },
        }
    }
}

/// Notification sink. Both calls are fire-and-forget; implementations must
/// swallow their own delivery failures.
pub trait Notifier: Send {
    fn notify(&self, notification: &Notification);
    fn audio(&self, signal: AudioSignal);
}

impl<N: Notifier + Sync> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: &Notification) {
        (**self).notify(notification)
    }

    fn audio(&self, signal: AudioSignal) {
        (**self).audio(signal)
    }
}

/// Notifier writing to the log, for headless runs.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) {
        tracing::info!(title = %notification.title, body = %notification.body, "notification");
    }

    fn audio(&self, signal: AudioSignal) {
        tracing::debug!(?signal, "audio signal");
    }
}

/// Wrapper honoring the notification and audio-sync preferences: calls for
/// a disabled channel are dropped before they reach the inner notifier.
pub struct GatedNotifier<N> {
    inner: N,
    notifications_enabled: bool,
    audio_enabled: bool,
}

impl<N: Notifier> GatedNotifier<N> {
    pub fn new(inner: N, notifications_enabled: bool, audio_enabled: bool) -> Self {
        Self {
            inner,
            notifications_enabled,
            audio_enabled,
        }
    }
}

impl<N: Notifier> Notifier for GatedNotifier<N> {
    fn notify(&self, notification: &Notification) {
        if self.notifications_enabled {
            self.inner.notify(notification);
        }
    }

    fn audio(&self, signal: AudioSignal) {
        if self.audio_enabled {
            self.inner.audio(signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn completion_copy_follows_the_next_kind() {
        let to_break = Notification::for_completion(SessionKind::Break);
        assert_eq!(to_break.title, "Focus complete!");
        assert!(to_break.icon.is_none());
        let to_focus = Notification::for_completion(SessionKind::Focus);
        assert_eq!(to_focus.title, "Break's over");
    }

    #[derive(Default)]
    struct Recording {
        notifications: Mutex<u32>,
        audio: Mutex<u32>,
    }

    impl Notifier for Recording {
        fn notify(&self, _notification: &Notification) {
            *self.notifications.lock().unwrap() += 1;
        }

        fn audio(&self, _signal: AudioSignal) {
            *self.audio.lock().unwrap() += 1;
        }
    }

    #[test]
    fn gated_notifier_drops_disabled_channels() {
        let inner = std::sync::Arc::new(Recording::default());
        let gated = GatedNotifier::new(inner.clone(), false, true);
        gated.notify(&Notification::for_completion(SessionKind::Break));
        gated.audio(AudioSignal::Play);
        assert_eq!(*inner.notifications.lock().unwrap(), 0);
        assert_eq!(*inner.audio.lock().unwrap(), 1);
    }

    #[test]
    fn gated_notifier_forwards_when_enabled() {
        let inner = std::sync::Arc::new(Recording::default());
        let gated = GatedNotifier::new(inner.clone(), true, false);
        gated.notify(&Notification::for_completion(SessionKind::Focus));
        gated.audio(AudioSignal::Pause);
        assert_eq!(*inner.notifications.lock().unwrap(), 1);
        assert_eq!(*inner.audio.lock().unwrap(), 0);
    }
}
