//! Notification lifecycle management.
//!
//! Each notification moves through three states:
//!
//! - **active**: visible, auto-dismiss timer running;
//! - **leaving**: dismissed (by timer or by hand), auto-dismiss timer
//!   cancelled, `leaving` flag published so the exit animation can run, a
//!   short removal timer pending;
//! - **removed**: purged from the published list, all timers torn down.
//!
//! Dismissing an item that is already leaving is a no-op, so the removal
//! timer can never be doubled. The manager keeps no render cap; consumers
//! slice with [`NotificationCenter::recent`] and off-screen items keep
//! their timers running until they dismiss naturally.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

use crate::constants::timing::{NOTIFICATION_LEAVE_MS, NOTIFICATION_TIMEOUT_MS};
use crate::store::{NotificationItem, ShellStore};

#[derive(Default)]
struct ItemTimers {
    auto_dismiss: Option<JoinHandle<()>>,
    remove: Option<JoinHandle<()>>,
}

struct Inner {
    next_id: u64,
    timers: HashMap<u64, ItemTimers>,
}

/// Owns notification ids and per-item timers; publishes through the store.
pub struct NotificationCenter {
    store: Arc<ShellStore>,
    // Timer tasks reference the center weakly, so dropping it stops them.
    this: Weak<Self>,
    inner: Mutex<Inner>,
}

impl NotificationCenter {
    /// Creates the center. One per process, next to the store.
    #[must_use]
    pub fn new(store: Arc<ShellStore>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            store,
            this: this.clone(),
            inner: Mutex::new(Inner { next_id: 0, timers: HashMap::new() }),
        })
    }

    /// Pushes a notification with the default auto-dismiss timeout.
    pub fn push(&self, title: &str, body: &str) -> u64 {
        self.push_with_timeout(title, body, Duration::from_millis(NOTIFICATION_TIMEOUT_MS))
    }

    /// Pushes a notification that auto-dismisses after `timeout`.
    ///
    /// Returns the assigned id, unique and increasing for the process
    /// lifetime.
    pub fn push_with_timeout(&self, title: &str, body: &str, timeout: Duration) -> u64 {
        let id = {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            inner.next_id
        };

        let item = NotificationItem {
            id,
            title: title.to_string(),
            body: body.to_string(),
            timeout,
            leaving: false,
        };
        self.store.notifications.update(|items| {
            let mut items = items.clone();
            items.push(item.clone());
            items
        });

        let mut inner = self.inner.lock();
        let center = self.this.clone();
        // Spawned under the lock: even a zero timeout cannot observe the
        // timers map before this entry lands in it.
        let auto_dismiss = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(center) = center.upgrade() {
                center.dismiss(id);
            }
        });
        inner.timers.insert(id, ItemTimers { auto_dismiss: Some(auto_dismiss), remove: None });

        id
    }

    /// Moves an active notification into the leaving state.
    ///
    /// No-op for unknown ids and for items already leaving.
    pub fn dismiss(&self, id: u64) {
        {
            let mut inner = self.inner.lock();
            let Some(timers) = inner.timers.get_mut(&id) else {
                return;
            };
            if timers.remove.is_some() {
                // Already leaving.
                return;
            }
            if let Some(auto_dismiss) = timers.auto_dismiss.take() {
                auto_dismiss.abort();
            }

            let center = self.this.clone();
            timers.remove = Some(tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(NOTIFICATION_LEAVE_MS)).await;
                if let Some(center) = center.upgrade() {
                    center.purge(id);
                }
            }));
        }

        self.store.notifications.update(|items| {
            items
                .iter()
                .map(|item| {
                    if item.id == id {
                        let mut item = item.clone();
                        item.leaving = true;
                        item
                    } else {
                        item.clone()
                    }
                })
                .collect()
        });
    }

    /// The newest `count` notifications, newest first. What a consumer
    /// typically renders.
    #[must_use]
    pub fn recent(&self, count: usize) -> Vec<NotificationItem> {
        self.store.notifications.get().iter().rev().take(count).cloned().collect()
    }

    fn purge(&self, id: u64) {
        if let Some(timers) = self.inner.lock().timers.remove(&id) {
            if let Some(handle) = timers.auto_dismiss {
                handle.abort();
            }
            if let Some(handle) = timers.remove {
                handle.abort();
            }
        }
        self.store.notifications.update(|items| {
            items.iter().filter(|item| item.id != id).cloned().collect()
        });
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        for timers in self.inner.lock().timers.values_mut() {
            if let Some(handle) = timers.auto_dismiss.take() {
                handle.abort();
            }
            if let Some(handle) = timers.remove.take() {
                handle.abort();
            }
        }
    }
}
