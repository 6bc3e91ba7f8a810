//! Single-slot toast notifications.
//!
//! The slot is a `watch` channel: showing a toast overwrites whatever is in
//! it, so there is never a backlog. Each toast owns one timer task that walks
//! it through fade-in, display and fade-out; the timer only touches the slot
//! while its own toast is still there.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sabzi_config::ui::UiConfig;
use sabzi_types::ToastKind;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPhase {
    FadingIn,
    Visible,
    FadingOut,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub created_at: DateTime<Utc>,
    pub phase: ToastPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTiming {
    pub fade_in: Duration,
    pub display: Duration,
    pub fade_out: Duration,
}

impl ToastTiming {
    pub fn from_config(config: &UiConfig) -> Self {
        let (fade_in, display, fade_out) = config.toast_timing();
        Self {
            fade_in,
            display,
            fade_out,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.fade_in + self.display + self.fade_out
    }
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self::from_config(&UiConfig::default())
    }
}

pub struct Notifier {
    slot: Arc<watch::Sender<Option<Toast>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
    next_id: AtomicU64,
    timing: ToastTiming,
}

impl Notifier {
    pub fn new(timing: ToastTiming) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
            timer: Mutex::new(None),
            next_id: AtomicU64::new(1),
            timing,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.slot.subscribe()
    }

    pub fn current(&self) -> Option<Toast> {
        self.slot.borrow().clone()
    }

    /// Replace the current toast. Must be called inside a tokio runtime.
    pub fn show(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = message.into();
        tracing::debug!("[TOAST] #{} {}: {}", id, kind.label(), message);

        self.cancel_timer();
        self.slot.send_replace(Some(Toast {
            id,
            message,
            kind,
            created_at: Utc::now(),
            phase: ToastPhase::FadingIn,
        }));

        let handle = tokio::spawn(run_timer(self.slot.clone(), id, self.timing));
        if let Ok(mut timer) = self.timer.lock() {
            *timer = Some(handle);
        }

        id
    }

    /// Remove the current toast right away
    pub fn dismiss(&self) {
        self.cancel_timer();
        self.slot.send_replace(None);
    }

    fn cancel_timer(&self) {
        let handle = match self.timer.lock() {
            Ok(mut timer) => timer.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

async fn run_timer(slot: Arc<watch::Sender<Option<Toast>>>, id: u64, timing: ToastTiming) {
    tokio::time::sleep(timing.fade_in).await;
    set_phase(&slot, id, ToastPhase::Visible);

    tokio::time::sleep(timing.display).await;
    set_phase(&slot, id, ToastPhase::FadingOut);

    tokio::time::sleep(timing.fade_out).await;
    slot.send_if_modified(|current| match current {
        Some(toast) if toast.id == id => {
            *current = None;
            true
        }
        _ => false,
    });
}

fn set_phase(slot: &watch::Sender<Option<Toast>>, id: u64, phase: ToastPhase) {
    slot.send_if_modified(|current| match current {
        Some(toast) if toast.id == id => {
            toast.phase = phase;
            true
        }
        _ => false,
    });
}
