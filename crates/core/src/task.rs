// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingest task data model.

use crate::id::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Terminal-or-not status of an ingest task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Running,
    Completed,
    Failed,
    Stopped,
}

impl IngestStatus {
    /// `completedAt` is set iff status is terminal.
    pub fn is_terminal(self) -> bool {
        !matches!(self, IngestStatus::Running)
    }
}

/// One file-level ingestion error collected onto the owning task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileError {
    pub file_path: String,
    pub error: String,
}

/// A single concurrent ingest task, mutated exclusively by the background
/// worker that owns it. Readers observe a snapshot without synchronizing
/// with the writer beyond per-field consistency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestTask {
    pub id: TaskId,
    pub paths: Vec<PathBuf>,
    pub status: IngestStatus,
    pub watching: bool,
    pub files_processed: u64,
    pub chunks_stored: u64,
    pub errors: Vec<FileError>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl IngestTask {
    pub fn new(id: TaskId, paths: Vec<PathBuf>, watching: bool, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            paths,
            status: IngestStatus::Running,
            watching,
            files_processed: 0,
            chunks_stored: 0,
            errors: Vec::new(),
            started_at,
            completed_at: None,
        }
    }

    /// Mark the task terminal. `completedAt` is always set alongside a
    /// terminal status, preserving the data-model invariant.
    pub fn mark_terminal(&mut self, status: IngestStatus, at: DateTime<Utc>) {
        debug_assert!(status.is_terminal());
        self.status = status;
        self.completed_at = Some(at);
    }

    /// Record progress on a single processed file. Counters are
    /// monotonically non-decreasing by construction: callers only ever add.
    pub fn record_file(&mut self, chunks: u64) {
        self.files_processed += 1;
        self.chunks_stored += chunks;
    }

    pub fn record_error(&mut self, file_path: impl Into<String>, error: impl Into<String>) {
        self.errors.push(FileError {
            file_path: file_path.into(),
            error: error.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> IngestTask {
        IngestTask::new(TaskId::generate(), vec![PathBuf::from("/tmp/a")], false, Utc::now())
    }

    #[test]
    fn new_task_starts_running_with_zero_counters() {
        let t = task();
        assert_eq!(t.status, IngestStatus::Running);
        assert_eq!(t.files_processed, 0);
        assert_eq!(t.chunks_stored, 0);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn record_file_is_monotonically_non_decreasing() {
        let mut t = task();
        t.record_file(3);
        assert_eq!((t.files_processed, t.chunks_stored), (1, 3));
        t.record_file(5);
        assert_eq!((t.files_processed, t.chunks_stored), (2, 8));
    }

    #[test]
    fn mark_terminal_sets_completed_at() {
        let mut t = task();
        let now = Utc::now();
        t.mark_terminal(IngestStatus::Stopped, now);
        assert_eq!(t.status, IngestStatus::Stopped);
        assert_eq!(t.completed_at, Some(now));
    }

    #[test]
    fn serializes_camel_case_for_protocol_boundary() {
        let t = task();
        let value = serde_json::to_value(&t).unwrap();
        assert!(value.get("filesProcessed").is_some());
        assert!(value.get("chunksStored").is_some());
        assert!(value.get("startedAt").is_some());
        assert!(value.get("completedAt").is_none());
    }
}
