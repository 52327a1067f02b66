// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent coordinator contract.
//!
//! `atlas.execute_work` hands a declarative work graph (a DAG of named
//! steps with dependencies, opaque to the core) to this collaborator and
//! returns whatever it produces. The scheduling, retry, and multi-agent
//! orchestration logic this implies is entirely out of scope for the
//! daemon core — the core only needs the one entry point.

mod noop;

pub use noop::NoOpAgentCoordinator;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCoordinatorCall, FakeAgentCoordinator};

use async_trait::async_trait;
use atlas_core::HealthState;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentCoordinatorError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("work graph rejected: {0}")]
    InvalidWorkGraph(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

#[async_trait]
pub trait AgentCoordinator: Send + Sync {
    /// Execute a declarative work graph, returning whatever result shape
    /// the coordinator produces.
    async fn execute_work(&self, graph: Value) -> Result<Value, AgentCoordinatorError>;

    async fn health(&self) -> HealthState;
}
