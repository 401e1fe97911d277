//! The reactive state store.
//!
//! One [`ShellStore`] is created at process start and shared for the process
//! lifetime. Every value the rendering layer can display is an
//! [`Observable`] field here; components keep them truthful, subscribers
//! react. Nothing outside this module mutates a value in place.

pub mod observable;
pub mod workspace;

use std::time::Duration;

pub use observable::{Observable, Subscription};

use crate::constants::fallback;

/// The overlay surfaces the shell can show, at most one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    /// No overlay is open.
    #[default]
    None,
    /// The application launcher.
    Launcher,
    /// The control center (quick toggles, sliders, media).
    ControlCenter,
    /// The window overview.
    Overview,
}

impl Overlay {
    /// Stable string form used in responses and logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Launcher => "launcher",
            Self::ControlCenter => "control-center",
            Self::Overview => "overview",
        }
    }
}

/// A launchable application entry shown in the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub name: String,
    pub command: String,
    pub icon: String,
}

/// One notification as published to subscribers.
///
/// `leaving` flips to `true` while the exit animation runs; the item is
/// purged from the list shortly after. See the `notifications` module for
/// the lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationItem {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub timeout: Duration,
    pub leaving: bool,
}

/// All published shell state.
pub struct ShellStore {
    pub active_overlay: Observable<Overlay>,
    pub launcher_query: Observable<String>,
    pub current_workspace: Observable<i32>,
    pub workspace_ids: Observable<Vec<i32>>,
    pub active_window_title: Observable<String>,
    pub media_info: Observable<String>,
    pub clock_text: Observable<String>,
    pub volume: Observable<u8>,
    pub brightness: Observable<u8>,
    pub wifi_enabled: Observable<bool>,
    pub battery_text: Observable<String>,
    pub overview_windows: Observable<Vec<String>>,
    pub notifications: Observable<Vec<NotificationItem>>,
    pub app_entries: Observable<Vec<AppEntry>>,
}

impl ShellStore {
    /// Creates the store with its startup values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active_overlay: Observable::new(Overlay::None),
            launcher_query: Observable::new(String::new()),
            current_workspace: Observable::new(fallback::WORKSPACE_ID),
            workspace_ids: Observable::new(workspace::BASELINE_WORKSPACES.to_vec()),
            active_window_title: Observable::new(fallback::WINDOW_TITLE.to_string()),
            media_info: Observable::new(fallback::MEDIA_INFO.to_string()),
            clock_text: Observable::new(fallback::CLOCK_TEXT.to_string()),
            volume: Observable::new(45),
            brightness: Observable::new(55),
            wifi_enabled: Observable::new(true),
            battery_text: Observable::new(fallback::BATTERY_TEXT.to_string()),
            overview_windows: Observable::new(Vec::new()),
            notifications: Observable::new(Vec::new()),
            app_entries: Observable::new(crate::apps::default_entries()),
        }
    }

    /// Opens the given overlay, or closes it when it is already open.
    pub fn toggle_overlay(&self, overlay: Overlay) {
        self.active_overlay.update(|prev| if *prev == overlay { Overlay::None } else { overlay });
    }

    /// Closes whichever overlay is open and resets the launcher query.
    pub fn close_overlays(&self) {
        self.active_overlay.set(Overlay::None);
        self.launcher_query.set(String::new());
    }
}

impl Default for ShellStore {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_starts_with_fallback_values() {
        let store = ShellStore::new();
        assert_eq!(store.active_overlay.get(), Overlay::None);
        assert_eq!(store.current_workspace.get(), 1);
        assert_eq!(store.workspace_ids.get(), vec![1, 2, 3]);
        assert_eq!(store.active_window_title.get(), "Desktop");
        assert_eq!(store.clock_text.get(), "--:--");
        assert!(store.notifications.get().is_empty());
        assert!(!store.app_entries.get().is_empty());
    }

    #[test]
    fn toggle_overlay_is_idempotent_per_pair() {
        let store = ShellStore::new();

        store.toggle_overlay(Overlay::Launcher);
        assert_eq!(store.active_overlay.get(), Overlay::Launcher);

        store.toggle_overlay(Overlay::Launcher);
        assert_eq!(store.active_overlay.get(), Overlay::None);
    }

    #[test]
    fn toggling_a_different_overlay_replaces_the_open_one() {
        let store = ShellStore::new();

        store.toggle_overlay(Overlay::Launcher);
        store.toggle_overlay(Overlay::Overview);
        assert_eq!(store.active_overlay.get(), Overlay::Overview);
    }

    #[test]
    fn close_overlays_resets_query() {
        let store = ShellStore::new();

        store.toggle_overlay(Overlay::Launcher);
        store.launcher_query.set("fire".to_string());

        store.close_overlays();
        assert_eq!(store.active_overlay.get(), Overlay::None);
        assert_eq!(store.launcher_query.get(), "");
    }

    #[test]
    fn overlay_string_forms_are_stable() {
        assert_eq!(Overlay::None.as_str(), "none");
        assert_eq!(Overlay::Launcher.as_str(), "launcher");
        assert_eq!(Overlay::ControlCenter.as_str(), "control-center");
        assert_eq!(Overlay::Overview.as_str(), "overview");
    }
}
