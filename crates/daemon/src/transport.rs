// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport (C1): accepts local client connections, frames
//! newline-delimited JSON, and owns per-connection read/write buffers.
//!
//! POSIX binds a Unix domain socket; the `#[cfg(windows)]` stub documents
//! the named-pipe substitution this core would need on Windows (not
//! implemented, since the daemon only ships on POSIX today).

use std::sync::Arc;

use atlas_core::ConnectionId;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Mutex as AsyncMutex;
use tracing::warn;

use crate::protocol::{codec, ReadError};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(std::path::PathBuf, std::io::Error),
    #[error("accept failed: {0}")]
    AcceptFailed(std::io::Error),
}

/// Remove a stale socket path left behind by a crashed daemon before binding.
pub fn clear_stale_socket(path: &std::path::Path) -> std::io::Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

pub async fn bind(path: &std::path::Path) -> Result<UnixListener, TransportError> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    clear_stale_socket(path).map_err(|e| TransportError::BindFailed(path.to_path_buf(), e))?;
    UnixListener::bind(path).map_err(|e| TransportError::BindFailed(path.to_path_buf(), e))
}

/// Owns one accepted connection's write half plus the serialized-write
/// discipline that keeps responses for a connection in request order.
pub struct ConnectionWriter {
    write_half: AsyncMutex<OwnedWriteHalf>,
}

impl ConnectionWriter {
    /// Write one JSON line, appending the trailing newline the wire format requires.
    pub async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut writer = self.write_half.lock().await;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await
    }
}

/// A live connection's read side: owns the growable buffer lines are split
/// out of, and the socket it reads from.
pub struct ConnectionReader {
    read_half: OwnedReadHalf,
    buf: Vec<u8>,
    scratch: [u8; 4096],
}

pub enum NextLine {
    Line(String),
    /// Peer closed the connection (EOF with no pending partial data, or a
    /// read error); the caller should tear the connection down.
    Closed,
}

impl ConnectionReader {
    /// Pull the next complete line, reading more bytes from the socket as needed.
    pub async fn next_line(&mut self) -> Result<NextLine, ReadError> {
        loop {
            if let Some(line) = codec::read_line(&mut self.buf)? {
                return Ok(NextLine::Line(line));
            }
            let n = match self.read_half.read(&mut self.scratch).await {
                Ok(0) => return Ok(NextLine::Closed),
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "connection read error");
                    return Ok(NextLine::Closed);
                }
            };
            self.buf.extend_from_slice(&self.scratch[..n]);
        }
    }
}

pub struct Connection {
    pub id: ConnectionId,
    pub reader: ConnectionReader,
    pub writer: Arc<ConnectionWriter>,
}

/// Split a freshly accepted stream into its framed reader/writer halves and
/// assign it the next connection id.
pub fn accept_connection(stream: UnixStream, id: ConnectionId) -> Connection {
    let (read_half, write_half) = stream.into_split();
    Connection {
        id,
        reader: ConnectionReader {
            read_half,
            buf: Vec::new(),
            scratch: [0u8; 4096],
        },
        writer: Arc::new(ConnectionWriter {
            write_half: AsyncMutex::new(write_half),
        }),
    }
}

// A Windows build would bind `tokio::net::windows::named_pipe` at
// `\\.\pipe\atlas` behind the same Connection/ConnectionReader/Writer
// surface above; this crate only ships the POSIX backend.

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
