// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Router / Dispatcher (C4): the method catalog named in `spec.md` §4.4.
//!
//! `dispatch` is the single entry point used by the transport's per-connection
//! read loop: it looks up the method, deserializes `params` into the
//! handler's expected shape, calls the handler, and turns both success and
//! failure into the `result`/`error` half of a JSON-RPC response. Handlers
//! never see the raw `RpcRequest` — only `(params, client_id)` — matching
//! the facade boundary `spec.md` §4.10 describes.

use atlas_core::{ConnectionId, ErrorCode, RpcError, SearchFilters, SubscriptionPattern, TaskId};
use serde::Deserialize;
use serde_json::{json, Value};

use atlas_collaborators::{AgentCoordinatorError, LlmError, VectorStoreError};

use crate::consolidate::{consolidate_sync, start_consolidation, stop_consolidation};
use crate::ingest::{ingest_sync, spawn_ingest, stop_ingest};
use crate::protocol::RpcRequest;
use crate::qntm::generate_tags;
use crate::search::{get_agent_context, search, timeline};
use crate::service::AppContext;
use crate::session_ingestor::handle_session_event;

fn invalid_params(err: impl std::fmt::Display) -> RpcError {
    RpcError::with_data(ErrorCode::InvalidParams, err.to_string())
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: &Value) -> Result<T, RpcError> {
    serde_json::from_value(params.clone()).map_err(invalid_params)
}

impl From<VectorStoreError> for RpcError {
    fn from(err: VectorStoreError) -> Self {
        match err {
            VectorStoreError::CollectionNotFound(detail) => RpcError::with_data(ErrorCode::CollectionNotFound, detail),
            VectorStoreError::BackendUnavailable(detail) => RpcError::with_data(ErrorCode::BackendUnavailable, detail),
            VectorStoreError::SearchFailed(detail) => RpcError::with_data(ErrorCode::SearchFailed, detail),
        }
    }
}

impl From<LlmError> for RpcError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::BackendUnavailable(detail) => RpcError::with_data(ErrorCode::BackendUnavailable, detail),
            LlmError::UnknownPrompt(detail) | LlmError::GenerationFailed(detail) => {
                RpcError::with_data(ErrorCode::InternalError, detail)
            }
        }
    }
}

impl From<AgentCoordinatorError> for RpcError {
    fn from(err: AgentCoordinatorError) -> Self {
        match err {
            AgentCoordinatorError::BackendUnavailable(detail) => RpcError::with_data(ErrorCode::BackendUnavailable, detail),
            AgentCoordinatorError::InvalidWorkGraph(detail) => RpcError::with_data(ErrorCode::InvalidParams, detail),
            AgentCoordinatorError::ExecutionFailed(detail) => RpcError::with_data(ErrorCode::InternalError, detail),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestParams {
    paths: Vec<std::path::PathBuf>,
    #[serde(default)]
    recursive: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IngestStartParams {
    paths: Vec<std::path::PathBuf>,
    #[serde(default)]
    recursive: bool,
    #[serde(default)]
    watch: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskIdParams {
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    query: String,
    #[serde(flatten)]
    filters: SearchFilters,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConsolidateParams {
    #[serde(default)]
    dry_run: bool,
}

#[derive(Debug, Deserialize)]
struct QntmGenerateParams {
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentContextParams {
    qntm_keys: Vec<String>,
    #[serde(default = "default_limit_per_key")]
    limit_per_key: u32,
}

fn default_limit_per_key() -> u32 {
    3
}

#[derive(Debug, Deserialize)]
struct ExecuteWorkParams {
    graph: Value,
}

#[derive(Debug, Deserialize)]
struct SubscriptionParams {
    patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionEventParams {
    #[serde(rename = "type")]
    kind: String,
    session_id: String,
    transcript_path: std::path::PathBuf,
}

/// Dispatch one parsed request, returning the JSON value for `result` on
/// success or an `RpcError` to report back to the caller. Mirrors
/// `spec.md` §4.4: unknown method -> `MethodNotFound`; malformed params
/// bubble up from `parse_params` as `InvalidParams`; anything else a
/// handler returns is translated by the `From<...> for RpcError` impls
/// above, never as a raw internal error unless the handler itself has no
/// more specific taxonomy entry (`spec.md` §7).
pub async fn dispatch(ctx: &AppContext, client_id: &ConnectionId, request: &RpcRequest) -> Result<Value, RpcError> {
    match request.method.as_str() {
        "atlas.ingest" => {
            let params: IngestParams = parse_params(&request.params)?;
            let result = ingest_sync(ctx, params.paths, params.recursive).await;
            Ok(serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))?)
        }
        "atlas.search" => {
            let params: SearchParams = parse_params(&request.params)?;
            let results = search(ctx, &params.query, &params.filters).await?;
            Ok(serde_json::to_value(results).map_err(|e| RpcError::internal(e.to_string()))?)
        }
        "atlas.consolidate" => {
            let params: ConsolidateParams = if request.params.is_null() {
                ConsolidateParams::default()
            } else {
                parse_params(&request.params)?
            };
            let result = consolidate_sync(ctx, params.dry_run).await;
            Ok(serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))?)
        }
        "atlas.qntm.generate" => {
            let params: QntmGenerateParams = parse_params(&request.params)?;
            let tags = generate_tags(ctx, &params.text).await?;
            Ok(json!({ "tags": tags }))
        }
        "atlas.timeline" => {
            let filters: SearchFilters = if request.params.is_null() {
                SearchFilters::default()
            } else {
                parse_params(&request.params)?
            };
            let results = timeline(ctx, &filters).await?;
            Ok(serde_json::to_value(results).map_err(|e| RpcError::internal(e.to_string()))?)
        }
        "atlas.health" => {
            let report = crate::health::health(ctx).await;
            Ok(serde_json::to_value(report).map_err(|e| RpcError::internal(e.to_string()))?)
        }
        "atlas.status" => {
            let report = crate::health::status(ctx);
            Ok(serde_json::to_value(report).map_err(|e| RpcError::internal(e.to_string()))?)
        }
        "atlas.subscribe" => {
            let params: SubscriptionParams = parse_params(&request.params)?;
            let patterns: Vec<SubscriptionPattern> = params.patterns.into_iter().map(SubscriptionPattern::new).collect();
            ctx.event_bus.subscribe(client_id, patterns);
            Ok(json!({ "status": "subscribed" }))
        }
        "atlas.unsubscribe" => {
            let params: SubscriptionParams = parse_params(&request.params)?;
            let patterns: Vec<SubscriptionPattern> = params.patterns.into_iter().map(SubscriptionPattern::new).collect();
            ctx.event_bus.unsubscribe(client_id, &patterns);
            Ok(json!({ "status": "unsubscribed" }))
        }
        "atlas.get_agent_context" => {
            let params: AgentContextParams = parse_params(&request.params)?;
            let context = get_agent_context(ctx, &params.qntm_keys, params.limit_per_key).await?;
            Ok(json!({ "context": context }))
        }
        "atlas.execute_work" => {
            let params: ExecuteWorkParams = parse_params(&request.params)?;
            let result = ctx.agent_coordinator.execute_work(params.graph).await?;
            Ok(result)
        }
        "atlas.ingest.start" => {
            let params: IngestStartParams = parse_params(&request.params)?;
            let watch_path = params.paths.first().cloned();
            let task_id = spawn_ingest(ctx.clone(), params.paths, params.recursive, params.watch);
            if params.watch {
                if let Some(path) = watch_path {
                    if let Err(error) = ctx.watcher_schedulers.spawn(ctx.clone(), task_id.clone(), path).await {
                        return Err(RpcError::with_data(ErrorCode::BackendUnavailable, error.to_string()));
                    }
                }
            }
            Ok(json!({ "taskId": task_id.as_str(), "watching": params.watch, "message": "started" }))
        }
        "atlas.ingest.status" => {
            let params: TaskIdParams = if request.params.is_null() {
                TaskIdParams { task_id: None }
            } else {
                parse_params(&request.params)?
            };
            match params.task_id {
                Some(id) => {
                    let task = ctx.registry.get(&TaskId::new(id.clone()));
                    match task {
                        Some(task) => Ok(serde_json::to_value(task).map_err(|e| RpcError::internal(e.to_string()))?),
                        None => Err(RpcError::with_data(ErrorCode::FileNotFound, format!("no such task: {id}"))),
                    }
                }
                None => Ok(serde_json::to_value(ctx.registry.all_tasks()).map_err(|e| RpcError::internal(e.to_string()))?),
            }
        }
        "atlas.ingest.stop" => {
            let params: TaskIdParams = parse_params(&request.params)?;
            let id = params.task_id.ok_or_else(|| invalid_params("taskId is required"))?;
            let task_id = TaskId::new(id.clone());
            if stop_ingest(ctx, &task_id) {
                ctx.watcher_schedulers.stop(&task_id).await;
                Ok(json!({ "taskId": id, "status": "stopped" }))
            } else {
                Err(RpcError::with_data(ErrorCode::FileNotFound, format!("no such task: {id}")))
            }
        }
        "atlas.consolidate.start" => {
            let params: ConsolidateParams = if request.params.is_null() {
                ConsolidateParams::default()
            } else {
                parse_params(&request.params)?
            };
            let outcome = start_consolidation(ctx.clone(), params.dry_run);
            Ok(json!({
                "locked": outcome.locked,
                "taskId": outcome.task_id.as_str(),
                "message": outcome.message,
            }))
        }
        "atlas.consolidate.status" => {
            let status = ctx.registry.consolidation_lock.status();
            Ok(json!({
                "locked": status.locked,
                "taskId": status.task_id.as_ref().map(TaskId::as_str),
                "startedAt": status.started_at,
            }))
        }
        "atlas.consolidate.stop" => {
            let released = stop_consolidation(ctx);
            Ok(json!({ "released": released }))
        }
        "atlas.session_event" => {
            let params: SessionEventParams = parse_params(&request.params)?;
            if params.kind != "session.compacting" && params.kind != "session.ended" {
                return Err(invalid_params(format!("unknown session event type: {}", params.kind)));
            }
            Ok(handle_session_event(ctx.clone(), params.session_id, params.transcript_path))
        }
        other => Err(RpcError::with_data(ErrorCode::MethodNotFound, format!("unknown method: {other}"))),
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
