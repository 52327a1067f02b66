// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake file watcher for daemon tests: change events are
//! injected by the test via [`FakeFileWatcher::emit`] rather than coming
//! from a real filesystem-notification backend.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChangeKind, FileWatcher, WatchEvent, WatcherError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub enum WatcherCall {
    Watch { path: PathBuf },
    Unwatch { path: PathBuf },
}

struct FakeState {
    senders: HashMap<PathBuf, mpsc::Sender<WatchEvent>>,
    calls: Vec<WatcherCall>,
}

#[derive(Clone)]
pub struct FakeFileWatcher {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeFileWatcher {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                senders: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeFileWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WatcherCall> {
        self.inner.lock().calls.clone()
    }

    /// Simulate a filesystem change on a watched path. Returns `false` if
    /// the path isn't currently watched.
    pub async fn emit(&self, path: &PathBuf, kind: ChangeKind) -> bool {
        let sender = self.inner.lock().senders.get(path).cloned();
        match sender {
            Some(sender) => sender
                .send(WatchEvent {
                    path: path.clone(),
                    kind,
                })
                .await
                .is_ok(),
            None => false,
        }
    }
}

#[async_trait]
impl FileWatcher for FakeFileWatcher {
    async fn watch(&self, path: PathBuf, sender: mpsc::Sender<WatchEvent>) -> Result<(), WatcherError> {
        let mut inner = self.inner.lock();
        inner.calls.push(WatcherCall::Watch { path: path.clone() });
        inner.senders.insert(path, sender);
        Ok(())
    }

    async fn unwatch(&self, path: &PathBuf) -> Result<(), WatcherError> {
        let mut inner = self.inner.lock();
        inner.calls.push(WatcherCall::Unwatch { path: path.clone() });
        inner.senders.remove(path);
        Ok(())
    }

    async fn watched_paths(&self) -> Vec<PathBuf> {
        self.inner.lock().senders.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watch_then_emit_delivers_event() {
        let watcher = FakeFileWatcher::new();
        let path = PathBuf::from("/tmp/notes.md");
        let (tx, mut rx) = mpsc::channel(4);
        watcher.watch(path.clone(), tx).await.unwrap();

        assert!(watcher.emit(&path, ChangeKind::Modified).await);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.path, path);
        assert_eq!(event.kind, ChangeKind::Modified);
    }

    #[tokio::test]
    async fn emit_on_unwatched_path_returns_false() {
        let watcher = FakeFileWatcher::new();
        assert!(!watcher.emit(&PathBuf::from("/tmp/missing"), ChangeKind::Created).await);
    }

    #[tokio::test]
    async fn unwatch_stops_delivery() {
        let watcher = FakeFileWatcher::new();
        let path = PathBuf::from("/tmp/notes.md");
        let (tx, _rx) = mpsc::channel(4);
        watcher.watch(path.clone(), tx).await.unwrap();
        watcher.unwatch(&path).await.unwrap();

        assert!(watcher.watched_paths().await.is_empty());
        assert!(!watcher.emit(&path, ChangeKind::Removed).await);
    }
}
