//! Error types for Brim.
//!
//! External-query failures are normally absorbed into fallback values at the
//! refresh boundary (see the `hypr` and `system` modules); these types cover
//! the paths that do propagate, such as IPC transport and setup.

use thiserror::Error;

/// Errors that can occur during shell core execution.
#[derive(Debug, Error)]
pub enum ShellError {
    /// An external command failed to run or exited non-zero.
    #[error("Command error: {0}")]
    Command(String),
    /// Output from an external command could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
    /// Request socket communication failed.
    #[error("IPC error: {0}")]
    Ipc(String),
    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self { Self::Io(err.to_string()) }
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self { Self::Parse(err.to_string()) }
}
