use super::*;
use atlas_collaborators::{FakeEmbeddingBackend, FakeFileWatcher, FakeLlmRunner, FakeVectorStore};
use atlas_core::{ConnectionId, SequentialIdGen, SystemClock};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn context() -> AppContext {
    AppContext::new(
        Arc::new(FakeVectorStore::new()),
        Arc::new(FakeEmbeddingBackend::new(8)),
        Arc::new(FakeLlmRunner::new()),
        Arc::new(FakeFileWatcher::new()),
        Arc::new(atlas_collaborators::FakeAgentCoordinator::new()),
        Arc::new(SystemClock),
        Arc::new(SequentialIdGen::new("task")),
        std::path::PathBuf::from("/tmp/atlas-test.sock"),
    )
}

fn client() -> ConnectionId {
    ConnectionId::new("conn-1")
}

fn request(method: &str, params: Value) -> RpcRequest {
    RpcRequest {
        id: json!(1),
        method: method.to_string(),
        params,
    }
}

#[tokio::test]
async fn unknown_method_is_method_not_found() {
    let ctx = context();
    let err = dispatch(&ctx, &client(), &request("atlas.bogus", Value::Null))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::MethodNotFound.code());
}

#[tokio::test]
async fn ingest_missing_params_is_invalid_params() {
    let ctx = context();
    let err = dispatch(&ctx, &client(), &request("atlas.ingest", Value::Null))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParams.code());
}

#[tokio::test]
async fn ingest_sync_round_trips_a_real_file() {
    let ctx = context();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.md");
    std::fs::write(&file, "some notes about the router dispatch table").unwrap();

    let result = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest", json!({"paths": [file], "recursive": false})),
    )
    .await
    .unwrap();
    assert_eq!(result["filesProcessed"], 1);
    assert!(result["chunksStored"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn search_returns_results_as_camel_case() {
    let ctx = context();
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.md");
    std::fs::write(&file, "content about authentication tokens").unwrap();
    dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest", json!({"paths": [file]})),
    )
    .await
    .unwrap();

    let result = dispatch(
        &ctx,
        &client(),
        &request("atlas.search", json!({"query": "authentication"})),
    )
    .await
    .unwrap();
    let hits = result.as_array().unwrap();
    assert!(!hits.is_empty());
    assert!(hits[0].get("filePath").is_some());
}

#[tokio::test]
async fn health_and_status_round_trip() {
    let ctx = context();
    let health = dispatch(&ctx, &client(), &request("atlas.health", Value::Null)).await.unwrap();
    assert_eq!(health["overall"], "healthy");

    let status = dispatch(&ctx, &client(), &request("atlas.status", Value::Null)).await.unwrap();
    assert_eq!(status["socketPath"], "/tmp/atlas-test.sock");
}

#[tokio::test]
async fn subscribe_then_unsubscribe_restores_prior_delivery() {
    let ctx = context();
    let id = client();
    ctx.event_bus.register(id.clone(), tokio::sync::mpsc::channel(16).0);

    dispatch(&ctx, &id, &request("atlas.subscribe", json!({"patterns": ["ingest.*"]})))
        .await
        .unwrap();
    dispatch(&ctx, &id, &request("atlas.unsubscribe", json!({"patterns": ["ingest.*"]})))
        .await
        .unwrap();

    // no direct accessor on EventBus for a single client's patterns; the
    // round trip itself not erroring, combined with subscription.rs's own
    // unit coverage of union/remove, is the contract this router enforces.
}

#[tokio::test]
async fn ingest_start_then_status_then_stop() {
    let ctx = context();
    let dir = TempDir::new().unwrap();

    let started = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest.start", json!({"paths": [dir.path()], "recursive": true})),
    )
    .await
    .unwrap();
    let task_id = started["taskId"].as_str().unwrap().to_string();

    let status = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest.status", json!({"taskId": task_id})),
    )
    .await
    .unwrap();
    assert_eq!(status["id"], task_id);

    let stop = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest.stop", json!({"taskId": task_id})),
    )
    .await
    .unwrap();
    assert_eq!(stop["status"], "stopped");
}

#[tokio::test]
async fn ingest_start_with_watch_registers_and_tears_down_a_file_watcher() {
    let ctx = context();
    let dir = TempDir::new().unwrap();

    let started = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest.start", json!({"paths": [dir.path()], "watch": true})),
    )
    .await
    .unwrap();
    assert_eq!(started["watching"], true);
    let task_id = started["taskId"].as_str().unwrap().to_string();

    let stop = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest.stop", json!({"taskId": task_id})),
    )
    .await
    .unwrap();
    assert_eq!(stop["status"], "stopped");
}

#[tokio::test]
async fn ingest_stop_unknown_task_is_file_not_found() {
    let ctx = context();
    let err = dispatch(
        &ctx,
        &client(),
        &request("atlas.ingest.stop", json!({"taskId": "does-not-exist"})),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::FileNotFound.code());
}

#[tokio::test]
async fn consolidate_start_then_status_then_stop() {
    let ctx = context();
    let start = dispatch(&ctx, &client(), &request("atlas.consolidate.start", json!({"dryRun": true})))
        .await
        .unwrap();
    assert_eq!(start["locked"], true);

    let status = dispatch(&ctx, &client(), &request("atlas.consolidate.status", Value::Null))
        .await
        .unwrap();
    assert_eq!(status["locked"], true);

    let stop = dispatch(&ctx, &client(), &request("atlas.consolidate.stop", Value::Null))
        .await
        .unwrap();
    assert_eq!(stop["released"], true);
}

#[tokio::test]
async fn consolidate_start_twice_reports_incumbent_without_locking_again() {
    let ctx = context();
    let first = dispatch(&ctx, &client(), &request("atlas.consolidate.start", json!({"dryRun": true})))
        .await
        .unwrap();
    let second = dispatch(&ctx, &client(), &request("atlas.consolidate.start", json!({"dryRun": true})))
        .await
        .unwrap();
    assert_eq!(second["locked"], false);
    assert_eq!(second["taskId"], first["taskId"]);
}

#[tokio::test]
async fn execute_work_forwards_the_graph_to_the_coordinator() {
    let ctx = context();
    let graph = json!({"steps": ["a", "b"]});
    let result = dispatch(&ctx, &client(), &request("atlas.execute_work", json!({"graph": graph.clone()})))
        .await
        .unwrap();
    assert_eq!(result["executed"], graph);
}

#[tokio::test]
async fn session_event_with_unknown_type_is_invalid_params() {
    let ctx = context();
    let err = dispatch(
        &ctx,
        &client(),
        &request(
            "atlas.session_event",
            json!({"type": "session.bogus", "sessionId": "s1", "transcriptPath": "/tmp/x.jsonl"}),
        ),
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidParams.code());
}

#[tokio::test]
async fn session_event_queues_immediately() {
    let ctx = context();
    let result = dispatch(
        &ctx,
        &client(),
        &request(
            "atlas.session_event",
            json!({"type": "session.ended", "sessionId": "s1", "transcriptPath": "/tmp/does-not-exist.jsonl"}),
        ),
    )
    .await
    .unwrap();
    assert_eq!(result["status"], "queued");
}
