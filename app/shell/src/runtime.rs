//! Store runtime wiring.
//!
//! [`ShellRuntime::start`] builds the store and everything that keeps it
//! truthful: initial refreshes, the event bridge, the theme watcher, the
//! clock tick, the safety-net poll, the request socket, and the overlay
//! effect subscriptions. Dropping or shutting down the runtime tears all of
//! it down again.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::constants::timing::{CLOCK_TICK_SECS, SAFETY_POLL_SECS};
use crate::error::ShellError;
use crate::hypr::bridge::EventBridge;
use crate::hypr::{refresh_hypr_state, refresh_overview};
use crate::ipc;
use crate::notifications::NotificationCenter;
use crate::store::{Overlay, ShellStore, Subscription};
use crate::system::{refresh_media, refresh_system};
use crate::theme::{ThemeWatcher, default_artifact_paths, default_rebuild_command};

/// The running shell core.
pub struct ShellRuntime {
    store: Arc<ShellStore>,
    notifications: Arc<NotificationCenter>,
    bridge: Arc<EventBridge>,
    theme: ThemeWatcher,
    tasks: Vec<JoinHandle<()>>,
    subscriptions: Vec<Subscription>,
}

impl ShellRuntime {
    /// Builds the store and starts every background concern.
    ///
    /// Must be called from within the tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Err` when the request socket cannot be bound. Everything
    /// else degrades instead of failing.
    pub fn start() -> Result<Self, ShellError> {
        let store = Arc::new(ShellStore::new());
        let notifications = NotificationCenter::new(Arc::clone(&store));

        store.clock_text.set(format_clock());

        // Initial refreshes; each absorbs its own failures into fallbacks.
        spawn_refresh(&store, |store| async move { refresh_hypr_state(&store).await });
        spawn_refresh(&store, |store| async move { refresh_media(&store).await });
        spawn_refresh(&store, |store| async move { refresh_system(&store).await });

        let bridge = EventBridge::new(Arc::clone(&store));
        bridge.start();

        let theme = ThemeWatcher::start(&default_artifact_paths(), default_rebuild_command());

        let mut tasks = Vec::new();

        let clock_store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(CLOCK_TICK_SECS)).await;
                clock_store.clock_text.set(format_clock());
            }
        }));

        // The safety net runs even while the event bridge is healthy. The
        // redundancy is deliberate: a hung helper can stop delivering
        // events without closing its stream, and this bounds staleness to
        // about a second regardless.
        let poll_store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(SAFETY_POLL_SECS)).await;
                refresh_hypr_state(&poll_store).await;
            }
        }));

        tasks.push(ipc::server::start(Arc::clone(&store))?);

        let subscriptions = vec![subscribe_overlay_effects(&store)];

        Ok(Self { store, notifications, bridge, theme, tasks, subscriptions })
    }

    /// The shared store.
    #[must_use]
    pub fn store(&self) -> &Arc<ShellStore> { &self.store }

    /// The notification center.
    #[must_use]
    pub fn notifications(&self) -> &Arc<NotificationCenter> { &self.notifications }

    /// The event bridge, for health inspection.
    #[must_use]
    pub fn bridge(&self) -> &Arc<EventBridge> { &self.bridge }

    /// Stops every background concern. Values stay readable afterwards but
    /// are no longer refreshed.
    pub fn shutdown(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.bridge.stop();
        self.theme.stop();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ShellRuntime {
    fn drop(&mut self) { self.shutdown() }
}

fn spawn_refresh<F, Fut>(store: &Arc<ShellStore>, refresh: F)
where
    F: FnOnce(Arc<ShellStore>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(refresh(Arc::clone(store)));
}

/// Opening an overlay refreshes the data it is about to show; closing all
/// overlays re-syncs the bar.
fn subscribe_overlay_effects(store: &Arc<ShellStore>) -> Subscription {
    let effects_store = Arc::clone(store);
    store.active_overlay.subscribe(move |overlay| match overlay {
        Overlay::Overview => {
            spawn_refresh(&effects_store, |store| async move { refresh_overview(&store).await });
        }
        Overlay::ControlCenter => {
            spawn_refresh(&effects_store, |store| async move { refresh_media(&store).await });
            spawn_refresh(&effects_store, |store| async move { refresh_system(&store).await });
        }
        Overlay::None => {
            spawn_refresh(&effects_store, |store| async move { refresh_hypr_state(&store).await });
            spawn_refresh(&effects_store, |store| async move { refresh_media(&store).await });
        }
        Overlay::Launcher => {}
    })
}

/// Local time as shown in the bar.
fn format_clock() -> String { chrono::Local::now().format("%a %d %b  %H:%M").to_string() }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_format_produces_a_plausible_line() {
        let clock = format_clock();
        assert!(!clock.is_empty());
        assert!(clock.contains(':'));
        assert_ne!(clock, crate::constants::fallback::CLOCK_TEXT);
    }

    #[tokio::test]
    async fn overlay_effects_subscription_survives_toggling() {
        let store = Arc::new(ShellStore::new());
        let subscription = subscribe_overlay_effects(&store);

        store.toggle_overlay(Overlay::Overview);
        store.toggle_overlay(Overlay::Overview);
        store.toggle_overlay(Overlay::ControlCenter);

        subscription.unsubscribe();
        assert_eq!(store.active_overlay.subscriber_count(), 0);
    }
}
