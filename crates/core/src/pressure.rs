// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System pressure levels and the pure target-concurrency model used by the
//! adaptive concurrency controller.

use serde::{Deserialize, Serialize};

/// Coarse classification of system pressure, derived from CPU utilization,
/// memory pressure, and process-level queue depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PressureLevel {
    Low,
    Normal,
    High,
    Critical,
}

/// The logical queue a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneKind {
    Ingest,
    Search,
    Consolidate,
    Watch,
    Admin,
}

impl LaneKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LaneKind::Ingest => "ingest",
            LaneKind::Search => "search",
            LaneKind::Consolidate => "consolidate",
            LaneKind::Watch => "watch",
            LaneKind::Admin => "admin",
        }
    }
}

fn clamp(value: i64, min: i64, max: i64) -> i64 {
    value.clamp(min, max)
}

/// Recompute `target` for a lane given the observed pressure level and the
/// lane's current state, per the model in the adaptive concurrency
/// controller's design:
///
/// - `low` -> `target = max`
/// - `normal` -> `target = clamp(current, min+1, max)`
/// - `high` -> `target = clamp(current - 1, min, max)`
/// - `critical` -> `target = min`
pub fn next_target(level: PressureLevel, current: u32, min: u32, max: u32) -> u32 {
    let current = current as i64;
    let min = min as i64;
    let max = max as i64;

    let target = match level {
        PressureLevel::Low => max,
        PressureLevel::Normal => clamp(current, min + 1, max),
        PressureLevel::High => clamp(current - 1, min, max),
        PressureLevel::Critical => min,
    };
    target.clamp(min, max) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_pressure_targets_max() {
        assert_eq!(next_target(PressureLevel::Low, 2, 1, 8), 8);
    }

    #[test]
    fn normal_pressure_clamps_between_min_plus_one_and_max() {
        assert_eq!(next_target(PressureLevel::Normal, 4, 1, 8), 4);
        // current below min+1 is raised
        assert_eq!(next_target(PressureLevel::Normal, 1, 1, 8), 2);
        // current above max is capped
        assert_eq!(next_target(PressureLevel::Normal, 20, 1, 8), 8);
    }

    #[test]
    fn high_pressure_decrements_current_within_bounds() {
        assert_eq!(next_target(PressureLevel::High, 4, 1, 8), 3);
        assert_eq!(next_target(PressureLevel::High, 1, 1, 8), 1);
    }

    #[test]
    fn critical_pressure_targets_min() {
        assert_eq!(next_target(PressureLevel::Critical, 8, 1, 8), 1);
    }

    #[test]
    fn min_is_always_at_least_one_in_practice() {
        // min >= 1 is a construction-time invariant enforced by the caller;
        // the pure function still behaves sanely at the boundary.
        assert_eq!(next_target(PressureLevel::Critical, 3, 1, 1), 1);
    }
}
