//! The request socket server.

use std::sync::Arc;

use tokio::net::{UnixListener, UnixStream};
use tokio::task::JoinHandle;

use super::{read_frame, socket_path, write_frame};
use crate::commands::handle_request;
use crate::error::ShellError;
use crate::store::ShellStore;

/// Binds the request socket and serves requests until the returned task is
/// aborted.
///
/// A stale socket file from a previous run is removed first.
///
/// # Errors
///
/// Returns `Err` when the socket cannot be bound.
pub fn start(store: Arc<ShellStore>) -> Result<JoinHandle<()>, ShellError> {
    let path = socket_path();

    if path.exists() {
        std::fs::remove_file(&path).ok();
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let listener = UnixListener::bind(&path)
        .map_err(|err| ShellError::Ipc(format!("failed to bind {}: {err}", path.display())))?;
    tracing::info!(socket = %path.display(), "request socket listening");

    Ok(tokio::spawn(serve(store, listener)))
}

async fn serve(store: Arc<ShellStore>, listener: UnixListener) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    handle_connection(&store, stream).await;
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "request socket accept failed");
            }
        }
    }
}

async fn handle_connection(store: &ShellStore, mut stream: UnixStream) {
    let payload = match read_frame(&mut stream).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(error = %err, "dropping request with bad frame");
            return;
        }
    };

    let argv: Vec<String> = match serde_json::from_slice(&payload) {
        Ok(argv) => argv,
        Err(err) => {
            tracing::debug!(error = %err, "dropping request with bad payload");
            return;
        }
    };

    let response = handle_request(store, &argv);
    if let Err(err) = write_frame(&mut stream, response.as_bytes()).await {
        tracing::debug!(error = %err, "failed to write response");
    }
}

#[cfg(test)]
mod tests {
    use tokio::net::UnixStream;

    use super::*;

    async fn roundtrip(stream: &mut UnixStream, argv: &[&str]) -> String {
        let argv: Vec<String> = argv.iter().map(ToString::to_string).collect();
        let payload = serde_json::to_vec(&argv).unwrap();
        write_frame(stream, &payload).await.unwrap();
        String::from_utf8(read_frame(stream).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn serves_requests_over_a_unix_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brim-test.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let store = Arc::new(ShellStore::new());
        let server = tokio::spawn(serve(Arc::clone(&store), listener));

        let mut stream = UnixStream::connect(&path).await.unwrap();
        assert_eq!(roundtrip(&mut stream, &["toggle-launcher"]).await, "ok");
        assert_eq!(store.active_overlay.get(), crate::store::Overlay::Launcher);

        let mut stream = UnixStream::connect(&path).await.unwrap();
        assert_eq!(roundtrip(&mut stream, &["get-workspace"]).await, "1");

        let mut stream = UnixStream::connect(&path).await.unwrap();
        assert_eq!(roundtrip(&mut stream, &["nope"]).await, "unknown-command");

        server.abort();
    }

    #[tokio::test]
    async fn malformed_payloads_close_the_connection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("brim-test.sock");
        let listener = UnixListener::bind(&path).unwrap();

        let store = Arc::new(ShellStore::new());
        let server = tokio::spawn(serve(store, listener));

        let mut stream = UnixStream::connect(&path).await.unwrap();
        write_frame(&mut stream, b"not json").await.unwrap();
        // The server drops the connection without a response frame.
        assert!(read_frame(&mut stream).await.is_err());

        server.abort();
    }
}
