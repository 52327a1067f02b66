// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op file watcher: reports itself unconfigured rather than panicking.
//! Used when Atlas is started without a watch backend; auto-watch
//! requests on `atlas.ingest.start {watch:true}` then fail at the
//! scheduler boundary rather than silently doing nothing.

use super::{FileWatcher, WatchEvent, WatcherError};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFileWatcher;

impl NoOpFileWatcher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileWatcher for NoOpFileWatcher {
    async fn watch(&self, _path: PathBuf, _sender: mpsc::Sender<WatchEvent>) -> Result<(), WatcherError> {
        Err(WatcherError::BackendUnavailable(
            "no file watcher backend configured".to_string(),
        ))
    }

    async fn unwatch(&self, _path: &PathBuf) -> Result<(), WatcherError> {
        Ok(())
    }

    async fn watched_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}
