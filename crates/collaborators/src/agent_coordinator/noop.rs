// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op agent coordinator: reports itself unconfigured rather than panicking.

use super::{AgentCoordinator, AgentCoordinatorError};
use async_trait::async_trait;
use atlas_core::HealthState;
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAgentCoordinator;

impl NoOpAgentCoordinator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentCoordinator for NoOpAgentCoordinator {
    async fn execute_work(&self, _graph: Value) -> Result<Value, AgentCoordinatorError> {
        Err(AgentCoordinatorError::BackendUnavailable(
            "no agent coordinator configured".to_string(),
        ))
    }

    async fn health(&self) -> HealthState {
        HealthState::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_coordinator_refuses_execution() {
        let coordinator = NoOpAgentCoordinator::new();
        assert!(coordinator.execute_work(serde_json::json!({})).await.is_err());
    }

    #[tokio::test]
    async fn noop_coordinator_reports_degraded_health() {
        let coordinator = NoOpAgentCoordinator::new();
        assert_eq!(coordinator.health().await, HealthState::Degraded);
    }
}
