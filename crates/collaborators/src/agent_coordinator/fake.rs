// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fake agent coordinator for daemon tests: echoes the work
//! graph back wrapped in a `{"executed": <graph>}` envelope rather than
//! actually scheduling anything.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AgentCoordinator, AgentCoordinatorError};
use async_trait::async_trait;
use atlas_core::HealthState;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum AgentCoordinatorCall {
    ExecuteWork { graph: Value },
}

struct FakeState {
    calls: Vec<AgentCoordinatorCall>,
}

#[derive(Clone)]
pub struct FakeAgentCoordinator {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeAgentCoordinator {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState { calls: Vec::new() })),
        }
    }
}

impl FakeAgentCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<AgentCoordinatorCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl AgentCoordinator for FakeAgentCoordinator {
    async fn execute_work(&self, graph: Value) -> Result<Value, AgentCoordinatorError> {
        self.inner.lock().calls.push(AgentCoordinatorCall::ExecuteWork { graph: graph.clone() });
        Ok(json!({"executed": graph}))
    }

    async fn health(&self) -> HealthState {
        HealthState::Healthy
    }
}
