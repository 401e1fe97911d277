//! Launcher application entries.

use std::process::Stdio;
use std::sync::Arc;

use tokio::process::Command;

use crate::notifications::NotificationCenter;
use crate::store::{AppEntry, ShellStore};

/// The built-in launcher catalogue.
#[must_use]
pub fn default_entries() -> Vec<AppEntry> {
    [
        ("Terminal", "foot", "\u{f0489}"),
        ("Browser", "firefox", "\u{f0239}"),
        ("Files", "nautilus", "\u{f024b}"),
        ("Editor", "code", "\u{f0a1e}"),
        ("Music", "spotify", "\u{f04c7}"),
    ]
    .into_iter()
    .map(|(name, command, icon)| AppEntry {
        name: name.to_string(),
        command: command.to_string(),
        icon: icon.to_string(),
    })
    .collect()
}

/// Entries whose names contain the query, case-insensitively. An empty or
/// whitespace query returns everything.
#[must_use]
pub fn filtered_entries(store: &ShellStore, query: &str) -> Vec<AppEntry> {
    let query = query.trim().to_lowercase();
    let entries = store.app_entries.get();
    if query.is_empty() {
        return entries;
    }
    entries.into_iter().filter(|entry| entry.name.to_lowercase().contains(&query)).collect()
}

/// Launches the entry's command detached from the shell, announces the
/// outcome, and closes the overlays either way.
pub fn launch_app(store: &ShellStore, notifications: &Arc<NotificationCenter>, entry: &AppEntry) {
    let spawned = Command::new(&entry.command)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(_child) => {
            notifications.push("App Launcher", &format!("Opened {}", entry.name));
        }
        Err(err) => {
            tracing::warn!(command = %entry.command, error = %err, "app launch failed");
            notifications.push("Launch failed", &err.to_string());
        }
    }

    store.close_overlays();
}
