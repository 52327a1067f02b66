// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction so timestamps can be frozen in tests.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// Source of wall-clock and monotonic time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time, used for `startedAt`/`completedAt` timestamps.
    fn now_utc(&self) -> DateTime<Utc>;

    /// Current monotonic instant, used for uptime and pressure sampling.
    fn now(&self) -> Instant;
}

/// Real clock backed by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Deterministic clock for tests: both the wall-clock and monotonic readings
/// only advance when explicitly told to.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

struct FakeClockState {
    utc: DateTime<Utc>,
    monotonic: Instant,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                utc: start,
                monotonic: Instant::now(),
            })),
        }
    }

    /// Advance both readings by `duration`.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut state = self.inner.lock();
        state.utc += duration;
        if let Ok(std_dur) = duration.to_std() {
            state.monotonic += std_dur;
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for FakeClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.inner.lock().utc
    }

    fn now(&self) -> Instant {
        self.inner.lock().monotonic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fake_clock_advances_on_command() {
        let clock = FakeClock::new(Utc::now());
        let before = clock.now_utc();
        clock.advance(chrono::Duration::seconds(30));
        let after = clock.now_utc();
        assert_eq!((after - before).num_seconds(), 30);
    }

    #[test]
    fn fake_clock_monotonic_tracks_utc_advance() {
        let clock = FakeClock::default();
        let before = clock.now();
        clock.advance(chrono::Duration::milliseconds(5));
        assert!(clock.now() >= before);
    }
}
