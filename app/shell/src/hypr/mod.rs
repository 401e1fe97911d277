//! Hyprland integration: queries, refresh operations, and the event bridge.
//!
//! The store never trusts a cached view of the window manager. Refreshes
//! re-query everything they publish, and every query failure degrades to a
//! fallback value instead of propagating. The event bridge decides *when*
//! to refresh; this module decides *what* a refresh means.

pub mod bridge;
pub mod queries;

use crate::constants::fallback;
use crate::store::ShellStore;
use crate::store::workspace::normalize_workspace_ids;

/// Refreshes the active window title, the active workspace id, and the
/// workspace id list. Each part falls back independently.
pub async fn refresh_hypr_state(store: &ShellStore) {
    match queries::active_window_title().await {
        Ok(title) => store.active_window_title.set(title),
        Err(err) => {
            tracing::debug!(error = %err, "active window query failed");
            store.active_window_title.set(fallback::WINDOW_TITLE.to_string());
        }
    }

    match queries::active_workspace_id().await {
        Ok(id) => store.current_workspace.set(id),
        Err(err) => {
            tracing::debug!(error = %err, "active workspace query failed");
            store.current_workspace.set(fallback::WORKSPACE_ID);
        }
    }

    let active = store.current_workspace.get();
    match queries::workspace_ids().await {
        Ok(ids) => store.workspace_ids.set(normalize_workspace_ids(&ids, active)),
        Err(err) => {
            tracing::debug!(error = %err, "workspace list query failed");
            store.workspace_ids.set(normalize_workspace_ids(&[], active));
        }
    }
}

/// Refreshes the overview window list.
pub async fn refresh_overview(store: &ShellStore) {
    let windows = match queries::client_titles().await {
        Ok(titles) if !titles.is_empty() => titles,
        Ok(_) => vec![fallback::OVERVIEW_EMPTY.to_string()],
        Err(err) => {
            tracing::debug!(error = %err, "client list query failed");
            vec![fallback::OVERVIEW_EMPTY.to_string()]
        }
    };
    store.overview_windows.set(windows);
}
