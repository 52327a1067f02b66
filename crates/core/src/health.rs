// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Health probe result for `atlas.health`.

use serde::{Deserialize, Serialize};

/// Health of one collaborator, or of the daemon overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthState {
    /// Combine dependency health into an overall verdict: unhealthy beats
    /// degraded beats healthy. Missing credentials surface as `degraded`,
    /// never fatal, per the core's policy toward collaborator configuration.
    pub fn worst_of(states: impl IntoIterator<Item = HealthState>) -> HealthState {
        states
            .into_iter()
            .fold(HealthState::Healthy, |acc, s| acc.combine(s))
    }

    fn rank(self) -> u8 {
        match self {
            HealthState::Healthy => 0,
            HealthState::Degraded => 1,
            HealthState::Unhealthy => 2,
        }
    }

    fn combine(self, other: HealthState) -> HealthState {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DependencyHealth {
    pub name: String,
    pub state: HealthState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub overall: HealthState,
    pub dependencies: Vec<DependencyHealth>,
}

impl HealthReport {
    pub fn new(dependencies: Vec<DependencyHealth>) -> Self {
        let overall = HealthState::worst_of(dependencies.iter().map(|d| d.state));
        Self {
            overall,
            dependencies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overall_health_is_worst_dependency() {
        let report = HealthReport::new(vec![
            DependencyHealth {
                name: "vector_store".into(),
                state: HealthState::Healthy,
                detail: None,
            },
            DependencyHealth {
                name: "embedding".into(),
                state: HealthState::Degraded,
                detail: Some("missing API key".into()),
            },
        ]);
        assert_eq!(report.overall, HealthState::Degraded);
    }

    #[test]
    fn any_unhealthy_dependency_makes_overall_unhealthy() {
        let report = HealthReport::new(vec![
            DependencyHealth {
                name: "vector_store".into(),
                state: HealthState::Unhealthy,
                detail: None,
            },
            DependencyHealth {
                name: "embedding".into(),
                state: HealthState::Degraded,
                detail: None,
            },
        ]);
        assert_eq!(report.overall, HealthState::Unhealthy);
    }

    #[test]
    fn no_dependencies_is_healthy() {
        let report = HealthReport::new(vec![]);
        assert_eq!(report.overall, HealthState::Healthy);
    }
}
