//! External command helpers.
//!
//! Everything the shell learns about the outside world comes from short
//! subprocess invocations. These helpers keep the failure surface small:
//! captures are bounded by a timeout and detached commands log instead of
//! propagating.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;

use crate::constants::timing::QUERY_TIMEOUT_MS;
use crate::error::ShellError;

/// Resolve the absolute path to an executable binary.
///
/// Checks, in order: an absolute path as given, any directory in
/// `BRIM_EXTRA_PATHS` (colon-separated), the process `PATH`, and a short
/// list of directories where user-installed tools commonly live.
///
/// # Errors
///
/// Returns `Err` when the binary cannot be found or is not executable.
pub fn resolve_binary(binary: &str) -> Result<PathBuf, ShellError> {
    if binary.is_empty() {
        return Err(ShellError::Command("Binary name cannot be empty".to_string()));
    }

    let candidate = Path::new(binary);
    if candidate.is_absolute() {
        return if is_executable(candidate) {
            Ok(candidate.to_path_buf())
        } else {
            Err(ShellError::Command(format!(
                "Binary at {} is not executable",
                candidate.display()
            )))
        };
    }

    let mut search_paths = Vec::new();

    if let Ok(extra) = env::var("BRIM_EXTRA_PATHS") {
        search_paths.extend(extra.split(':').map(PathBuf::from));
    }

    if let Some(path_var) = env::var_os("PATH") {
        search_paths.extend(env::split_paths(&path_var));
    }

    search_paths.push(PathBuf::from("/usr/local/bin"));
    if let Some(home) = env::var_os("HOME").map(PathBuf::from) {
        search_paths.push(home.join(".local/bin"));
        search_paths.push(home.join(".cargo/bin"));
    }

    for directory in search_paths {
        if directory.as_os_str().is_empty() {
            continue;
        }

        let candidate_path = directory.join(binary);
        if is_executable(&candidate_path) {
            return Ok(candidate_path);
        }
    }

    Err(ShellError::Command(format!(
        "Unable to locate executable '{binary}' in known search paths"
    )))
}

fn is_executable(path: &Path) -> bool {
    use std::fs;

    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}

/// Runs a command and captures its stdout as UTF-8, bounded by the query
/// timeout.
///
/// # Errors
///
/// Returns `Err` when the command cannot be spawned, exits non-zero, times
/// out, or produces invalid UTF-8.
pub async fn capture(program: &str, args: &[&str]) -> Result<String, ShellError> {
    let output = tokio::time::timeout(
        Duration::from_millis(QUERY_TIMEOUT_MS),
        Command::new(program).args(args).kill_on_drop(true).output(),
    )
    .await
    .map_err(|_| ShellError::Command(format!("{program} timed out")))?
    .map_err(|err| ShellError::Command(format!("failed to run {program}: {err}")))?;

    if !output.status.success() {
        return Err(ShellError::Command(format!(
            "{program} exited with status {:?}",
            output.status.code()
        )));
    }

    String::from_utf8(output.stdout)
        .map_err(|err| ShellError::Parse(format!("{program} returned invalid UTF-8: {err}")))
}

/// Spawns a command without waiting for it; failures are logged, never
/// returned. For volume, brightness, and radio commands where the store has
/// already moved on.
pub fn run_detached(program: &str, args: Vec<String>) {
    let program = program.to_string();
    tokio::spawn(async move {
        match Command::new(&program).args(&args).status().await {
            Ok(status) if !status.success() => {
                tracing::warn!(command = %program, code = ?status.code(), "command exited non-zero");
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(command = %program, error = %err, "failed to run command");
            }
        }
    });
}
