//! Brim - reactive state core for a Hyprland desktop shell.
//!
//! The rendering layer (bar, launcher, overlays) is thin glue over this
//! crate: it subscribes to published values and calls command functions.
//! Everything that keeps those values truthful lives here instead; the
//! observable store, the debounced coalescer, the notification lifecycle,
//! the Hyprland event bridge with its restart and fallback machinery, the
//! theme rebuild watcher, and the request dispatcher.
//!
//! The binary serves both roles: `brim` with no arguments runs the shell
//! core, `brim <request...>` talks to the running instance over its
//! request socket.

pub mod apps;
pub mod commands;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod hypr;
pub mod ipc;
pub mod notifications;
pub mod runtime;
pub mod store;
pub mod system;
pub mod theme;
mod utils;

pub use error::ShellError;
pub use runtime::ShellRuntime;

/// Runs the shell core until interrupted.
///
/// # Errors
///
/// Returns `Err` when startup fails (request socket) or the interrupt
/// signal cannot be installed.
pub async fn run() -> Result<(), ShellError> {
    let mut runtime = ShellRuntime::start()?;

    tokio::signal::ctrl_c()
        .await
        .map_err(|err| ShellError::Io(format!("failed to wait for interrupt: {err}")))?;

    tracing::info!("interrupt received, shutting down");
    runtime.shutdown();
    Ok(())
}
