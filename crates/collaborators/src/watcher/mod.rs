// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File watcher collaborator contract.
//!
//! The filesystem-notification backend itself is out of scope for the
//! daemon core; this module specifies the interface the ingest lane calls
//! through to register a path for continuous watching and to receive
//! change notifications. The wire schema between this collaborator and
//! the ingest worker is an Atlas-level choice (see `DESIGN.md`): each
//! change is reported as a [`WatchEvent`] carrying the canonical path and
//! a [`ChangeKind`]; the ingest worker re-reads and re-chunks the whole
//! file rather than trying to diff it.

mod noop;

pub use noop::NoOpFileWatcher;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFileWatcher, WatcherCall};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("path does not exist: {0}")]
    PathNotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

#[derive(Debug, Clone)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

/// Interface the ingest lane calls into the filesystem-notification
/// backend through.
#[async_trait]
pub trait FileWatcher: Send + Sync + 'static {
    /// Start watching `path`, delivering subsequent changes on `sender`.
    /// Idempotent: watching an already-watched path is a no-op.
    async fn watch(&self, path: PathBuf, sender: mpsc::Sender<WatchEvent>) -> Result<(), WatcherError>;

    /// Stop watching `path`. Idempotent.
    async fn unwatch(&self, path: &PathBuf) -> Result<(), WatcherError>;

    /// Paths currently being watched.
    async fn watched_paths(&self) -> Vec<PathBuf>;
}
