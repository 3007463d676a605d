//! Toast notification queue.
//!
//! At most [`MAX_TOASTS`] toasts are held; pushing past that evicts the
//! oldest. Toasts with a non-zero duration are removed by a one-shot timer
//! task when a tokio runtime is available.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use tokio::task::AbortHandle;

pub const MAX_TOASTS: usize = 5;

pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: ToastId,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    /// Zero means the toast stays until dismissed or evicted
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct QueueState {
    toasts: VecDeque<Toast>,
    timers: HashMap<ToastId, AbortHandle>,
    last_id: ToastId,
}

impl QueueState {
    fn remove(&mut self, id: ToastId) -> bool {
        if let Some(timer) = self.timers.remove(&id) {
            timer.abort();
        }
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }
}

/// Shared handle to the toast queue. Clones point at the same queue.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    state: Arc<Mutex<QueueState>>,
    default_duration: Duration,
}

impl NotificationQueue {
    pub fn new(default_duration: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState::default())),
            default_duration,
        }
    }

    pub fn success(&self, title: &str, message: &str, duration: Option<Duration>) -> ToastId {
        self.show(ToastKind::Success, title, message, duration)
    }

    pub fn error(&self, title: &str, message: &str, duration: Option<Duration>) -> ToastId {
        self.show(ToastKind::Error, title, message, duration)
    }

    pub fn info(&self, title: &str, message: &str, duration: Option<Duration>) -> ToastId {
        self.show(ToastKind::Info, title, message, duration)
    }

    pub fn warning(&self, title: &str, message: &str, duration: Option<Duration>) -> ToastId {
        self.show(ToastKind::Warning, title, message, duration)
    }

    /// Queue a toast; `None` uses the configured default duration.
    pub fn show(
        &self,
        kind: ToastKind,
        title: &str,
        message: &str,
        duration: Option<Duration>,
    ) -> ToastId {
        let duration = duration.unwrap_or(self.default_duration);
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;

        state.toasts.push_back(Toast {
            id,
            kind,
            title: title.to_string(),
            message: message.to_string(),
            duration,
        });

        while state.toasts.len() > MAX_TOASTS {
            if let Some(evicted) = state.toasts.pop_front() {
                if let Some(timer) = state.timers.remove(&evicted.id) {
                    timer.abort();
                }
                tracing::debug!(toast_id = evicted.id, "Evicted oldest toast");
            }
        }

        if !duration.is_zero() {
            if let Some(timer) = spawn_expiry(Arc::downgrade(&self.state), id, duration) {
                state.timers.insert(id, timer);
            }
        }

        id
    }

    /// Remove a toast now and cancel its timer. Unknown ids are ignored.
    pub fn dismiss(&self, id: ToastId) -> bool {
        self.lock().remove(id)
    }

    pub fn dismiss_all(&self) {
        let mut state = self.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.toasts.clear();
    }

    /// Snapshot of the queued toasts, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(Duration::from_millis(5_000))
    }
}

fn spawn_expiry(
    state: Weak<Mutex<QueueState>>,
    id: ToastId,
    duration: Duration,
) -> Option<AbortHandle> {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::debug!(toast_id = id, "No runtime; toast will not auto-dismiss");
        return None;
    };

    let task = runtime.spawn(async move {
        tokio::time::sleep(duration).await;
        if let Some(state) = state.upgrade() {
            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            state.timers.remove(&id);
            state.toasts.retain(|toast| toast.id != id);
        }
    });
    Some(task.abort_handle())
}
