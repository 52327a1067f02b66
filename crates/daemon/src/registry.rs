// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Task Registry (C5): the single source of truth for in-flight ingest
//! and consolidation tasks, plus the auto-watch path -> task mapping.
//!
//! The consolidation lock itself is `atlas_core::ConsolidationLock`; this
//! module only adds the path -> task bookkeeping the daemon needs on top
//! of it.

use atlas_core::{ConsolidationLock, IngestTask, TaskId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Default)]
struct RegistryState {
    ingest_tasks: HashMap<TaskId, IngestTask>,
    /// Populated only for watching ingest tasks; lets a second `ingest`
    /// call on an already-watched path find the owning task.
    watched_paths: HashMap<PathBuf, TaskId>,
}

/// Shared, cloneable handle onto the daemon's task bookkeeping.
#[derive(Clone)]
pub struct TaskRegistry {
    state: Arc<Mutex<RegistryState>>,
    pub consolidation_lock: Arc<ConsolidationLock>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState::default())),
            consolidation_lock: Arc::new(ConsolidationLock::new()),
        }
    }
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, task: IngestTask) {
        let mut state = self.state.lock();
        if task.watching {
            for path in &task.paths {
                state.watched_paths.insert(path.clone(), task.id.clone());
            }
        }
        state.ingest_tasks.insert(task.id.clone(), task);
    }

    pub fn get(&self, id: &TaskId) -> Option<IngestTask> {
        self.state.lock().ingest_tasks.get(id).cloned()
    }

    /// Mutate a task in place via `f`, returning whether the task existed.
    pub fn update(&self, id: &TaskId, f: impl FnOnce(&mut IngestTask)) -> bool {
        let mut state = self.state.lock();
        match state.ingest_tasks.get_mut(id) {
            Some(task) => {
                f(task);
                true
            }
            None => false,
        }
    }

    /// Task id already watching `path`, if any.
    pub fn watcher_for(&self, path: &PathBuf) -> Option<TaskId> {
        self.state.lock().watched_paths.get(path).cloned()
    }

    pub fn stop_watching(&self, id: &TaskId) {
        let mut state = self.state.lock();
        state.watched_paths.retain(|_, watching_id| watching_id != id);
    }

    pub fn all_tasks(&self) -> Vec<IngestTask> {
        self.state.lock().ingest_tasks.values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
