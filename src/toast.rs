//! Notification queue: transient toast messages.
//!
//! DESIGN
//! ======
//! Each toast expires `TOAST_TTL_MS` after its own creation. When a tokio
//! runtime is available, `push` spawns a detached timer that removes the
//! toast; reads also filter by age, so the active set is exact even between
//! timer wake-ups or when no runtime is running. Toasts never reset each
//! other's timers and are kept in creation order.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::debug;

use crate::consts::TOAST_TTL_MS;

const TOAST_TTL: Duration = Duration::from_millis(TOAST_TTL_MS);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToastMessage {
    /// Monotonic per queue.
    pub id: u64,
    pub text: String,
    pub severity: Severity,
    #[serde(skip)]
    created_at: Instant,
}

impl ToastMessage {
    fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) < TOAST_TTL
    }
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    toasts: Vec<ToastMessage>,
}

/// Shared toast queue. Clones observe and mutate the same messages.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    inner: Arc<Mutex<QueueInner>>,
}

impl NotificationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a toast and schedule its removal. Returns the toast id.
    pub fn push(&self, text: impl Into<String>, severity: Severity) -> u64 {
        let created_at = Instant::now();
        let text = text.into();
        let id = {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.next_id += 1;
            let id = inner.next_id;
            debug!(toast_id = id, ?severity, %text, "toast pushed");
            inner.toasts.push(ToastMessage { id, text, severity, created_at });
            id
        };

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let queue = self.clone();
            handle.spawn(async move {
                tokio::time::sleep_until(created_at + TOAST_TTL).await;
                queue.dismiss(id);
            });
        }
        id
    }

    /// Remove a toast before it expires. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let before = inner.toasts.len();
        inner.toasts.retain(|t| t.id != id);
        inner.toasts.len() != before
    }

    /// Unexpired toasts, oldest first.
    #[must_use]
    pub fn active(&self) -> Vec<ToastMessage> {
        let now = Instant::now();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.toasts.retain(|t| t.is_live(now));
        inner.toasts.clone()
    }
}
