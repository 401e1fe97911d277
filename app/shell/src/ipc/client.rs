//! One-shot request client used by the CLI form of the binary.

use std::time::Duration;

use tokio::net::UnixStream;

use super::{read_frame, socket_path, write_frame};
use crate::error::ShellError;

/// How long a request may take end to end.
const REQUEST_TIMEOUT_MS: u64 = 1000;

/// Sends one argv request to the running shell and returns its response.
///
/// # Errors
///
/// Returns `Err` when no shell is listening or the exchange fails or times
/// out.
pub async fn send_request(argv: &[String]) -> Result<String, ShellError> {
    let path = socket_path();
    if !path.exists() {
        return Err(ShellError::Ipc("shell is not running".to_string()));
    }

    let exchange = async {
        let mut stream = UnixStream::connect(&path).await.map_err(|err| {
            if matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionRefused | std::io::ErrorKind::NotFound
            ) {
                ShellError::Ipc("shell is not running".to_string())
            } else {
                ShellError::Ipc(format!("failed to connect: {err}"))
            }
        })?;

        let payload = serde_json::to_vec(argv)?;
        write_frame(&mut stream, &payload)
            .await
            .map_err(|err| ShellError::Ipc(format!("failed to send request: {err}")))?;

        let response = read_frame(&mut stream)
            .await
            .map_err(|err| ShellError::Ipc(format!("failed to read response: {err}")))?;
        String::from_utf8(response)
            .map_err(|err| ShellError::Parse(format!("response was not UTF-8: {err}")))
    };

    tokio::time::timeout(Duration::from_millis(REQUEST_TIMEOUT_MS), exchange)
        .await
        .map_err(|_| ShellError::Ipc("request timed out".to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_socket_reports_shell_not_running() {
        // SAFETY: tests in this module run on their own process; the
        // variable is restored before the test ends.
        unsafe {
            std::env::set_var("XDG_RUNTIME_DIR", "/nonexistent/path/for/testing");
        }

        let result = send_request(&["get-workspace".to_string()]).await;
        assert!(matches!(result, Err(ShellError::Ipc(_))));

        unsafe {
            std::env::remove_var("XDG_RUNTIME_DIR");
        }
    }
}
