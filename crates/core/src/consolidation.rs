// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-entry consolidation lock.
//!
//! A process-global record `{ locked, taskId, startedAt }`. `acquire` is an
//! atomic test-and-set; at most one consolidation task is `locked=true` at
//! any instant. The lock is strictly in-memory and does not survive a
//! restart — on startup it is always released.

use crate::id::TaskId;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

#[derive(Debug, Clone, Default)]
struct LockState {
    task_id: Option<TaskId>,
    started_at: Option<DateTime<Utc>>,
}

/// Thread-safe single-entry lock guarding consolidation passes.
#[derive(Default)]
pub struct ConsolidationLock {
    state: Mutex<LockState>,
}

/// Snapshot of the lock for status queries.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationLockStatus {
    pub locked: bool,
    pub task_id: Option<TaskId>,
    pub started_at: Option<DateTime<Utc>>,
}

impl ConsolidationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically transition `locked: false -> true`, recording `task_id` and
    /// `started_at`. Returns `true` on success, `false` if already locked —
    /// in which case the caller can read [`Self::status`] for the incumbent.
    pub fn acquire(&self, task_id: TaskId, started_at: DateTime<Utc>) -> bool {
        let mut state = self.state.lock();
        if state.task_id.is_some() {
            return false;
        }
        state.task_id = Some(task_id);
        state.started_at = Some(started_at);
        true
    }

    /// Release the lock. Idempotent: releasing an already-unlocked lock is a no-op.
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.task_id = None;
        state.started_at = None;
    }

    pub fn status(&self) -> ConsolidationLockStatus {
        let state = self.state.lock();
        ConsolidationLockStatus {
            locked: state.task_id.is_some(),
            task_id: state.task_id.clone(),
            started_at: state.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_succeeds_when_unlocked() {
        let lock = ConsolidationLock::new();
        assert!(lock.acquire(TaskId::generate(), Utc::now()));
        assert!(lock.status().locked);
    }

    #[test]
    fn second_acquire_fails_while_locked() {
        let lock = ConsolidationLock::new();
        let first = TaskId::generate();
        assert!(lock.acquire(first.clone(), Utc::now()));
        assert!(!lock.acquire(TaskId::generate(), Utc::now()));
        assert_eq!(lock.status().task_id, Some(first));
    }

    #[test]
    fn release_then_acquire_succeeds_again() {
        let lock = ConsolidationLock::new();
        lock.acquire(TaskId::generate(), Utc::now());
        lock.release();
        assert!(!lock.status().locked);
        assert!(lock.acquire(TaskId::generate(), Utc::now()));
    }

    #[test]
    fn release_is_idempotent() {
        let lock = ConsolidationLock::new();
        lock.release();
        lock.release();
        assert!(!lock.status().locked);
    }

    #[test]
    fn at_most_one_locked_at_any_instant() {
        let lock = ConsolidationLock::new();
        let mut successes = 0;
        for _ in 0..5 {
            if lock.acquire(TaskId::generate(), Utc::now()) {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
