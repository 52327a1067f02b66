// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `atlas.health` / `atlas.status`.

use atlas_core::{DependencyHealth, HealthReport};
use serde::Serialize;

use crate::service::AppContext;

pub async fn health(ctx: &AppContext) -> HealthReport {
    HealthReport::new(vec![
        DependencyHealth {
            name: "vector_store".to_string(),
            state: ctx.vector_store.health().await,
            detail: None,
        },
        DependencyHealth {
            name: "llm".to_string(),
            state: ctx.llm.health().await,
            detail: None,
        },
        DependencyHealth {
            name: "embedding".to_string(),
            state: ctx.embedding.health().await,
            detail: None,
        },
        DependencyHealth {
            name: "agent_coordinator".to_string(),
            state: ctx.agent_coordinator.health().await,
            detail: None,
        },
    ])
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub pid: u32,
    pub uptime_seconds: u64,
    pub socket_path: String,
    pub connected_clients: usize,
    pub version: &'static str,
}

pub fn status(ctx: &AppContext) -> StatusReport {
    StatusReport {
        pid: ctx.pid,
        uptime_seconds: ctx.start_time.elapsed().as_secs(),
        socket_path: ctx.socket_path.to_string_lossy().to_string(),
        connected_clients: ctx.event_bus.subscriber_count(),
        version: env!("CARGO_PKG_VERSION"),
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
