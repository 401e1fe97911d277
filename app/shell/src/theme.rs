//! Theme artifact watcher.
//!
//! Matugen regenerates the shell's palette files when the wallpaper
//! changes. The watcher monitors those files and, once a burst of writes
//! has settled, runs one external rebuild-and-relaunch command. Only
//! events that mean "a complete file is now in place" count; the partial
//! writes an atomic-save editor or matugen itself produces are ignored.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::event::{AccessKind, AccessMode, EventKind, ModifyKind, RenameMode};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::constants::timing::THEME_DEBOUNCE_MS;
use crate::debounce::Debouncer;
use crate::utils::command::run_detached;

/// Watches theme artifacts and triggers the rebuild command.
pub struct ThemeWatcher {
    // Held to keep the notify backend alive until stop.
    watcher: Option<RecommendedWatcher>,
    rebuild: Arc<Debouncer>,
}

impl ThemeWatcher {
    /// Starts watching `paths`; any settled change runs `rebuild_command`
    /// (a program and its arguments).
    ///
    /// Watch setup failures are per-path: a path that cannot be watched is
    /// logged and skipped without affecting the others. Must be called from
    /// within the tokio runtime.
    #[must_use]
    pub fn start(paths: &[PathBuf], rebuild_command: Vec<String>) -> Self {
        let rebuild = Arc::new(Debouncer::new(Duration::from_millis(THEME_DEBOUNCE_MS), move || {
            let Some((program, args)) = rebuild_command.split_first() else {
                return;
            };
            tracing::info!(command = %program, "theme artifacts changed, rebuilding");
            run_detached(program, args.to_vec());
        }));

        let filenames: HashSet<OsString> =
            paths.iter().filter_map(|path| path.file_name().map(OsString::from)).collect();

        let handler_rebuild = Arc::clone(&rebuild);
        let watcher = notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
            match result {
                Ok(event) => {
                    let matches_artifact = event
                        .paths
                        .iter()
                        .any(|path| path.file_name().is_some_and(|name| filenames.contains(name)));
                    if matches_artifact && is_settled_change(&event.kind) {
                        handler_rebuild.trigger();
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "theme watch error");
                }
            }
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create theme watcher");
                return Self { watcher: None, rebuild };
            }
        };

        for path in paths {
            // Watch the parent so artifact replacement by rename is seen.
            let target = path.parent().filter(|parent| !parent.as_os_str().is_empty());
            let target = target.map_or(path.as_path(), |parent| parent);
            if let Err(err) = watcher.watch(target, RecursiveMode::NonRecursive) {
                tracing::warn!(path = %path.display(), error = %err, "failed to watch theme artifact");
            }
        }

        Self { watcher: Some(watcher), rebuild }
    }

    /// Drops the watch and cancels a pending rebuild.
    pub fn stop(&mut self) {
        self.watcher = None;
        self.rebuild.cancel();
    }
}

/// Whether an event kind means a complete file landed on disk.
fn is_settled_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Access(AccessKind::Close(AccessMode::Write))
            | EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Name(RenameMode::To))
    )
}

/// The artifact paths matugen writes for this shell.
#[must_use]
pub fn default_artifact_paths() -> Vec<PathBuf> {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let style = config.join("brim").join("style");
    vec![style.join("_matugen.scss"), style.join("_matugen.generated.scss")]
}

/// The default rebuild-and-relaunch command.
#[must_use]
pub fn default_rebuild_command() -> Vec<String> {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    let shell_dir = config.join("brim");
    vec![
        "sh".to_string(),
        "-lc".to_string(),
        format!(
            "cd {} && ./build.sh && (pkill brim || true) && brim >/tmp/brim-theme.log 2>&1 &",
            shell_dir.display()
        ),
    ]
}
