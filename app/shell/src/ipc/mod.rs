//! Request socket plumbing.
//!
//! The running shell listens on a unix socket; the `brim <request...>` CLI
//! form connects, sends one argv frame, and prints the response. Frames are
//! length-prefixed (u32 little-endian) with a JSON string-array payload for
//! requests and plain UTF-8 text for responses.

pub mod client;
pub mod server;

use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Socket file name for the request socket.
const SOCKET_NAME: &str = "brim.sock";

/// Frames larger than this are rejected as corrupt.
const MAX_FRAME_BYTES: u32 = 1024 * 1024;

/// Gets the path to the request socket.
///
/// Uses `XDG_RUNTIME_DIR` if available, otherwise falls back to
/// `~/.local/run` or `/tmp`.
#[must_use]
pub fn socket_path() -> PathBuf {
    std::env::var("XDG_RUNTIME_DIR").map_or_else(
        |_| {
            dirs::home_dir().map_or_else(
                || PathBuf::from("/tmp").join(SOCKET_NAME),
                |home| home.join(".local").join("run").join(SOCKET_NAME),
            )
        },
        |runtime_dir| PathBuf::from(runtime_dir).join(SOCKET_NAME),
    )
}

/// Reads one length-prefixed frame.
async fn read_frame<R: AsyncRead + Unpin>(stream: &mut R) -> std::io::Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream.read_exact(&mut len_buf).await?;

    let len = u32::from_le_bytes(len_buf);
    if len > MAX_FRAME_BYTES {
        return Err(std::io::Error::other(format!("frame of {len} bytes exceeds limit")));
    }

    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Writes one length-prefixed frame.
async fn write_frame<W: AsyncWrite + Unpin>(stream: &mut W, payload: &[u8]) -> std::io::Result<()> {
    let len = u32::try_from(payload.len())
        .map_err(|_| std::io::Error::other("frame payload too large"))?;
    stream.write_all(&len.to_le_bytes()).await?;
    stream.write_all(payload).await?;
    stream.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frames_round_trip() {
        let (mut a, mut b) = tokio::io::duplex(256);

        write_frame(&mut a, b"hello frame").await.unwrap();
        let payload = read_frame(&mut b).await.unwrap();
        assert_eq!(payload, b"hello frame");
    }

    #[tokio::test]
    async fn empty_frames_are_valid() {
        let (mut a, mut b) = tokio::io::duplex(64);

        write_frame(&mut a, b"").await.unwrap();
        assert!(read_frame(&mut b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let (mut a, mut b) = tokio::io::duplex(64);

        let bogus = (MAX_FRAME_BYTES + 1).to_le_bytes();
        tokio::io::AsyncWriteExt::write_all(&mut a, &bogus).await.unwrap();
        assert!(read_frame(&mut b).await.is_err());
    }

    #[test]
    fn socket_path_ends_with_socket_name() {
        assert!(socket_path().to_string_lossy().ends_with(SOCKET_NAME));
    }
}
