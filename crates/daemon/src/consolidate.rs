// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consolidation lane: finds and merges near-duplicate chunks, guarded by
//! the single-entry `atlas_core::ConsolidationLock`.

use atlas_core::{Event, LaneKind, TaskId};
use serde::Serialize;
use serde_json::json;

use crate::service::AppContext;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateResult {
    pub groups_found: u64,
    pub chunks_merged: u64,
}

async fn run_consolidation(ctx: &AppContext, task_id: &TaskId, dry_run: bool) -> ConsolidateResult {
    let _permit = ctx.concurrency.acquire(LaneKind::Consolidate).await;
    let groups = ctx.vector_store.find_duplicates(&ctx.collection).await.unwrap_or_default();
    let mut chunks_merged = 0u64;

    if !dry_run {
        for group in &groups {
            match ctx.vector_store.merge_duplicates(&ctx.collection, group).await {
                Ok(removed) => chunks_merged += removed,
                Err(error) => {
                    ctx.event_bus.emit(Event::new(
                        "consolidate.progress",
                        json!({"taskId": task_id.as_str(), "error": error.to_string()}),
                    ));
                }
            }
        }
    }

    ConsolidateResult {
        groups_found: groups.len() as u64,
        chunks_merged,
    }
}

/// `atlas.consolidate`: synchronous pass, typically called with `dryRun: true` in tests.
pub async fn consolidate_sync(ctx: &AppContext, dry_run: bool) -> ConsolidateResult {
    let task_id = TaskId::new(ctx.id_gen.next());
    run_consolidation(ctx, &task_id, dry_run).await
}

/// `atlas.consolidate.start`: attempt to acquire the lock; on success spawn
/// a background worker, on failure report the incumbent.
pub struct ConsolidateStart {
    pub locked: bool,
    pub task_id: TaskId,
    pub message: String,
}

pub fn start_consolidation(ctx: AppContext, dry_run: bool) -> ConsolidateStart {
    let status = ctx.registry.consolidation_lock.status();
    if status.locked {
        return ConsolidateStart {
            locked: false,
            task_id: status.task_id.expect("locked implies a task id"),
            message: "Consolidation already running".to_string(),
        };
    }

    let task_id = TaskId::new(ctx.id_gen.next());
    let acquired = ctx.registry.consolidation_lock.acquire(task_id.clone(), ctx.clock.now_utc());
    if !acquired {
        // Lost the race between the status check and the acquire.
        let status = ctx.registry.consolidation_lock.status();
        return ConsolidateStart {
            locked: false,
            task_id: status.task_id.expect("locked implies a task id"),
            message: "Consolidation already running".to_string(),
        };
    }

    ctx.event_bus
        .emit(Event::new("consolidate.started", json!({"taskId": task_id.as_str()})));

    let worker_task_id = task_id.clone();
    tokio::spawn(async move {
        let result = run_consolidation(&ctx, &worker_task_id, dry_run).await;
        ctx.registry.consolidation_lock.release();
        ctx.event_bus.emit(Event::new(
            "consolidate.completed",
            json!({
                "taskId": worker_task_id.as_str(),
                "groupsFound": result.groups_found,
                "chunksMerged": result.chunks_merged,
            }),
        ));
    });

    ConsolidateStart {
        locked: true,
        task_id,
        message: "started".to_string(),
    }
}

/// `atlas.consolidate.stop`: release the lock; best-effort against the collaborator.
pub fn stop_consolidation(ctx: &AppContext) -> bool {
    let was_locked = ctx.registry.consolidation_lock.status().locked;
    ctx.registry.consolidation_lock.release();
    was_locked
}

#[cfg(test)]
#[path = "consolidate_tests.rs"]
mod tests;
