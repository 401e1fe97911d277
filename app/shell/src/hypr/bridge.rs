//! The Hyprland event bridge.
//!
//! Hyprland publishes window-manager events as text lines on a per-instance
//! unix socket. The bridge tails that socket through a `socat` subprocess
//! and turns relevant lines into coalesced state refreshes. It has to stay
//! correct while the outside world misbehaves:
//!
//! - the subprocess can die, or its stream can close or error; either way
//!   one restart is scheduled after a fixed delay, never more, even when
//!   both signals arrive in the same tick;
//! - `socat` may not be installed at all, in which case the bridge switches
//!   permanently to a one-second refresh poll for this session;
//! - the environment may not describe a Hyprland instance, in which case
//!   the bridge does nothing and the runtime's safety-net poll carries the
//!   session alone.
//!
//! Bridge failures only ever cost freshness, never correctness: published
//! values are bounded-stale, not wrong.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::constants::timing::{BRIDGE_RESTART_DELAY_MS, EVENT_DEBOUNCE_MS, FALLBACK_POLL_SECS};
use crate::debounce::Debouncer;
use crate::store::ShellStore;
use crate::utils::command::resolve_binary;

/// Socket lines that warrant a state refresh, by prefix.
const REFRESH_PREFIXES: [&str; 4] =
    ["workspace>>", "focusedmon>>", "activewindow>>", "activewindowv2>>"];

/// Resolves when the event source is gone for good (for a subprocess, when
/// it has exited).
pub(crate) type ExitSignal = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A live connection to the event source.
pub(crate) struct EventSession {
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
    pub exit: ExitSignal,
}

/// Why a spawn attempt produced no session.
pub(crate) enum SpawnError {
    /// The helper tool is not installed; retrying will not help.
    HelperMissing,
    /// The spawn itself failed; worth retrying after the restart delay.
    Io(io::Error),
}

/// Source of event sessions. The production implementation spawns `socat`;
/// tests substitute a fake.
pub(crate) trait SpawnEvents: Send + Sync + 'static {
    fn spawn(&self, socket_path: &Path) -> Result<EventSession, SpawnError>;
}

struct SocatSpawner;

impl SpawnEvents for SocatSpawner {
    fn spawn(&self, socket_path: &Path) -> Result<EventSession, SpawnError> {
        let socat = resolve_binary("socat").map_err(|_| SpawnError::HelperMissing)?;

        let mut child = Command::new(socat)
            .arg("-u")
            .arg(format!("UNIX-CONNECT:{}", socket_path.display()))
            .arg("STDOUT")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(SpawnError::Io)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpawnError::Io(io::Error::other("socat stdout not captured")))?;

        // The exit future owns the child; dropping it (session teardown)
        // reaps the subprocess through kill_on_drop.
        let exit: ExitSignal = Box::pin(async move {
            let _ = child.wait().await;
        });

        Ok(EventSession { reader: Box::new(stdout), exit })
    }
}

struct SessionTasks {
    read_task: JoinHandle<()>,
    exit_task: JoinHandle<()>,
}

/// Owns the single live session, the refresh coalescer, and the restart
/// timer. Constructed once at process start; start/stop bound its lifetime.
pub struct EventBridge {
    socket_path: Option<PathBuf>,
    spawner: Box<dyn SpawnEvents>,
    on_refresh: Arc<dyn Fn() + Send + Sync>,
    refresh: Debouncer,
    restart: Debouncer,
    // Session tasks reference the bridge weakly, so dropping it stops them.
    this: Weak<Self>,
    session: Mutex<Option<SessionTasks>>,
    fallback_poll: Mutex<Option<JoinHandle<()>>>,
}

impl EventBridge {
    /// Creates the production bridge: socket path from the environment,
    /// `socat` sessions, debounced full refreshes into `store`.
    ///
    /// Must be called from within the tokio runtime.
    #[must_use]
    pub fn new(store: Arc<ShellStore>) -> Arc<Self> {
        let on_refresh: Arc<dyn Fn() + Send + Sync> = Arc::new(move || {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                super::refresh_hypr_state(&store).await;
            });
        });
        Self::with_spawner(socket_path_from_env(), Box::new(SocatSpawner), on_refresh)
    }

    pub(crate) fn with_spawner(
        socket_path: Option<PathBuf>,
        spawner: Box<dyn SpawnEvents>,
        on_refresh: Arc<dyn Fn() + Send + Sync>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let refresh_action = Arc::clone(&on_refresh);
            let refresh = Debouncer::new(Duration::from_millis(EVENT_DEBOUNCE_MS), move || {
                refresh_action();
            });

            let restart_target = weak.clone();
            let restart = Debouncer::new(Duration::from_millis(BRIDGE_RESTART_DELAY_MS), move || {
                if let Some(bridge) = restart_target.upgrade() {
                    bridge.start();
                }
            });

            Self {
                socket_path,
                spawner,
                on_refresh,
                refresh,
                restart,
                this: weak.clone(),
                session: Mutex::new(None),
                fallback_poll: Mutex::new(None),
            }
        })
    }

    /// Establishes a session, or arranges the appropriate degraded mode.
    ///
    /// No-op when the environment describes no Hyprland instance or when a
    /// session is already live.
    pub fn start(&self) {
        let Some(socket_path) = self.socket_path.clone() else {
            return;
        };

        let mut slot = self.session.lock();
        if slot.is_some() {
            return;
        }

        match self.spawner.spawn(&socket_path) {
            Ok(EventSession { reader, exit }) => {
                // Spawned under the session lock: neither task can tear the
                // session down before it is recorded.
                let read_target = self.this.clone();
                let read_task = tokio::spawn(read_loop(reader, read_target));

                let exit_target = self.this.clone();
                let exit_task = tokio::spawn(async move {
                    exit.await;
                    if let Some(bridge) = exit_target.upgrade() {
                        bridge.session_ended("helper process exited");
                    }
                });

                *slot = Some(SessionTasks { read_task, exit_task });
                tracing::info!(socket = %socket_path.display(), "event bridge connected");
            }
            Err(SpawnError::HelperMissing) => {
                drop(slot);
                self.start_fallback_poll();
            }
            Err(SpawnError::Io(err)) => {
                drop(slot);
                tracing::warn!(error = %err, "event bridge spawn failed");
                self.restart.trigger();
            }
        }
    }

    /// Tears down the session, pending timers, and the fallback poller.
    pub fn stop(&self) {
        self.restart.cancel();
        self.refresh.cancel();
        if let Some(tasks) = self.session.lock().take() {
            tasks.read_task.abort();
            tasks.exit_task.abort();
        }
        if let Some(poll) = self.fallback_poll.lock().take() {
            poll.abort();
        }
    }

    /// Whether a socket session is currently live.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.session.lock().is_some() }

    /// Whether the bridge degraded to polling because the helper tool is
    /// missing.
    #[must_use]
    pub fn is_polling(&self) -> bool { self.fallback_poll.lock().is_some() }

    fn handle_event_line(&self, line: &str) {
        if REFRESH_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
            self.refresh.trigger();
        }
    }

    /// Clears the session and schedules the guarded restart. Stream close
    /// and process exit both land here; the restart timer's single slot
    /// keeps the second signal from stacking another attempt.
    fn session_ended(&self, reason: &str) {
        if let Some(tasks) = self.session.lock().take() {
            tracing::debug!(reason, "event bridge session ended");
            tasks.read_task.abort();
            tasks.exit_task.abort();
        }
        self.restart.trigger();
    }

    fn start_fallback_poll(&self) {
        let mut slot = self.fallback_poll.lock();
        if slot.is_some() {
            return;
        }

        tracing::warn!("socat not found on PATH, polling for window manager state instead");
        let on_refresh = Arc::clone(&self.on_refresh);
        *slot = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_secs(FALLBACK_POLL_SECS)).await;
                on_refresh();
            }
        }));
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) { self.stop() }
}

async fn read_loop(reader: Box<dyn AsyncRead + Send + Unpin>, bridge: Weak<EventBridge>) {
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(bridge) = bridge.upgrade() else {
                    return;
                };
                bridge.handle_event_line(&line);
            }
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(error = %err, "event stream read failed");
                break;
            }
        }
    }

    if let Some(bridge) = bridge.upgrade() {
        bridge.session_ended("event stream closed");
    }
}

/// Socket path of the running Hyprland instance, if the environment
/// describes one.
fn socket_path_from_env() -> Option<PathBuf> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").ok().filter(|dir| !dir.is_empty())?;
    let instance =
        std::env::var("HYPRLAND_INSTANCE_SIGNATURE").ok().filter(|sig| !sig.is_empty())?;
    Some(PathBuf::from(runtime_dir).join("hypr").join(instance).join(".socket2.sock"))
}
