//! The inbound request dispatcher.
//!
//! Requests arrive as argv-style string vectors over the request socket and
//! map onto store mutations or reads. The vocabulary is closed; anything
//! else answers with the `unknown-command` sentinel rather than an error.

use crate::store::{Overlay, ShellStore};

/// Response for requests outside the vocabulary.
pub const UNKNOWN_COMMAND: &str = "unknown-command";

/// Dispatches one request against the store and returns the response text.
#[must_use]
pub fn handle_request(store: &ShellStore, argv: &[String]) -> String {
    let command = argv.first().map_or("", String::as_str);
    match command {
        "toggle-launcher" => {
            store.toggle_overlay(Overlay::Launcher);
            "ok".to_string()
        }
        "toggle-control" => {
            store.toggle_overlay(Overlay::ControlCenter);
            "ok".to_string()
        }
        "toggle-overview" => {
            store.toggle_overlay(Overlay::Overview);
            "ok".to_string()
        }
        "close-overlays" => {
            store.close_overlays();
            "ok".to_string()
        }
        "get-workspace" => store.current_workspace.get().to_string(),
        "get-workspace-list" => {
            let ids = store.workspace_ids.get();
            ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
        }
        _ => UNKNOWN_COMMAND.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(store: &ShellStore, command: &str) -> String {
        handle_request(store, &[command.to_string()])
    }

    #[test]
    fn toggling_twice_returns_to_none() {
        let store = ShellStore::new();

        assert_eq!(request(&store, "toggle-launcher"), "ok");
        assert_eq!(store.active_overlay.get(), Overlay::Launcher);

        assert_eq!(request(&store, "toggle-launcher"), "ok");
        assert_eq!(store.active_overlay.get(), Overlay::None);
    }

    #[test]
    fn each_overlay_has_its_toggle() {
        let store = ShellStore::new();

        request(&store, "toggle-control");
        assert_eq!(store.active_overlay.get(), Overlay::ControlCenter);

        request(&store, "toggle-overview");
        assert_eq!(store.active_overlay.get(), Overlay::Overview);
    }

    #[test]
    fn close_overlays_clears_everything() {
        let store = ShellStore::new();
        request(&store, "toggle-launcher");
        store.launcher_query.set("mus".to_string());

        assert_eq!(request(&store, "close-overlays"), "ok");
        assert_eq!(store.active_overlay.get(), Overlay::None);
        assert_eq!(store.launcher_query.get(), "");
    }

    #[test]
    fn workspace_reads_format_the_store() {
        let store = ShellStore::new();
        store.current_workspace.set(4);
        store.workspace_ids.set(vec![1, 2, 3, 4, 7]);

        assert_eq!(request(&store, "get-workspace"), "4");
        assert_eq!(request(&store, "get-workspace-list"), "1,2,3,4,7");
    }

    #[test]
    fn unknown_requests_answer_with_the_sentinel() {
        let store = ShellStore::new();
        assert_eq!(request(&store, "make-coffee"), UNKNOWN_COMMAND);
        assert_eq!(handle_request(&store, &[]), UNKNOWN_COMMAND);
    }

    #[test]
    fn extra_arguments_are_tolerated() {
        let store = ShellStore::new();
        let argv = vec!["toggle-launcher".to_string(), "now".to_string()];
        assert_eq!(handle_request(&store, &argv), "ok");
    }
}
