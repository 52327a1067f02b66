// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive Concurrency Controller (C7).
//!
//! One [`LaneController`] per [`LaneKind`], each admitting work up to a
//! `target` that the System Pressure Monitor scheduler recomputes via
//! `atlas_core::pressure::next_target`. Admission is FIFO: callers that
//! arrive while a lane is saturated queue on an internal waiter list and
//! are released in arrival order as permits free up.
//!
//! Unlike a `tokio::sync::Semaphore`, `target` can shrink at runtime
//! without forcibly cancelling in-flight work — a shrink only holds back
//! admission of new work until `in_flight` drops under the new target.

use atlas_core::{LaneKind, PressureLevel};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::oneshot;

struct LaneState {
    target: u32,
    in_flight: u32,
    waiters: VecDeque<oneshot::Sender<()>>,
}

struct Lane {
    state: Mutex<LaneState>,
    min: u32,
    max: u32,
}

impl Lane {
    fn new(min: u32, max: u32) -> Self {
        Self {
            state: Mutex::new(LaneState {
                target: max,
                in_flight: 0,
                waiters: VecDeque::new(),
            }),
            min,
            max,
        }
    }

    fn set_target(&self, level: PressureLevel) {
        let mut state = self.state.lock();
        state.target = atlas_core::pressure::next_target(level, state.target, self.min, self.max);
        Self::admit_waiters(&mut state);
    }

    fn admit_waiters(state: &mut LaneState) {
        while state.in_flight < state.target {
            let Some(waiter) = state.waiters.pop_front() else {
                break;
            };
            if waiter.send(()).is_ok() {
                state.in_flight += 1;
            }
            // A dropped receiver (caller gave up) is simply skipped: no
            // slot consumed, loop continues to the next waiter.
        }
    }

    async fn acquire(self: &Arc<Self>) -> LanePermit {
        let rx = {
            let mut state = self.state.lock();
            if state.in_flight < state.target {
                state.in_flight += 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                Some(rx)
            }
        };
        if let Some(rx) = rx {
            // The sender side only ever calls `send(())` while holding the
            // lock right before incrementing `in_flight`, so a dropped
            // sender can't happen on the success path.
            let _ = rx.await;
        }
        LanePermit { lane: self.clone() }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        Self::admit_waiters(&mut state);
    }

    fn queue_depth(&self) -> usize {
        self.state.lock().waiters.len()
    }

    fn current_target(&self) -> u32 {
        self.state.lock().target
    }
}

/// RAII admission permit: dropping it frees the slot for the next queued caller.
pub struct LanePermit {
    lane: Arc<Lane>,
}

impl Drop for LanePermit {
    fn drop(&mut self) {
        self.lane.release();
    }
}

/// Owns one [`Lane`] per [`LaneKind`]; environment overrides
/// (`LLM_CONCURRENCY`, `QNTM_CONCURRENCY`) set a lane's `max` at construction.
#[derive(Clone)]
pub struct ConcurrencyController {
    lanes: Arc<HashMap<LaneKind, Arc<Lane>>>,
}

/// Per-lane `(min, max)` bounds at construction time.
pub struct LaneBounds {
    pub kind: LaneKind,
    pub min: u32,
    pub max: u32,
}

impl ConcurrencyController {
    pub fn new(bounds: impl IntoIterator<Item = LaneBounds>) -> Self {
        let lanes = bounds
            .into_iter()
            .map(|b| (b.kind, Arc::new(Lane::new(b.min.max(1), b.max.max(b.min.max(1))))))
            .collect();
        Self { lanes: Arc::new(lanes) }
    }

    /// Default bounds for every lane kind, overridable by environment.
    pub fn from_env() -> Self {
        let llm = std::env::var("LLM_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(4);
        let qntm = std::env::var("QNTM_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        Self::new([
            LaneBounds { kind: LaneKind::Ingest, min: 1, max: llm },
            LaneBounds { kind: LaneKind::Search, min: 1, max: 8 },
            LaneBounds { kind: LaneKind::Consolidate, min: 1, max: qntm },
            LaneBounds { kind: LaneKind::Watch, min: 1, max: 4 },
            LaneBounds { kind: LaneKind::Admin, min: 1, max: 4 },
        ])
    }

    fn lane(&self, kind: LaneKind) -> &Arc<Lane> {
        self.lanes
            .get(&kind)
            .unwrap_or_else(|| panic!("no lane configured for {:?}", kind))
    }

    pub async fn acquire(&self, kind: LaneKind) -> LanePermit {
        self.lane(kind).acquire().await
    }

    /// Called by the System Pressure Monitor scheduler on each tick.
    pub fn retarget_all(&self, level: PressureLevel) {
        for lane in self.lanes.values() {
            lane.set_target(level);
        }
    }

    pub fn queue_depth(&self, kind: LaneKind) -> usize {
        self.lane(kind).queue_depth()
    }

    pub fn current_target(&self, kind: LaneKind) -> u32 {
        self.lane(kind).current_target()
    }

    /// Wait for every lane to drain to zero in-flight callers; used during
    /// graceful shutdown to let outstanding work finish before exit.
    pub async fn drain(&self) {
        loop {
            let still_busy = self
                .lanes
                .values()
                .any(|lane| lane.state.lock().in_flight > 0);
            if !still_busy {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
    }
}

#[cfg(test)]
#[path = "concurrency_tests.rs"]
mod tests;
