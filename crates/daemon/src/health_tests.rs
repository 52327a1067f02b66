use super::*;
use atlas_collaborators::{FakeEmbeddingBackend, FakeFileWatcher, FakeLlmRunner, FakeVectorStore};
use atlas_core::{HealthState, SequentialIdGen, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;

fn context() -> AppContext {
    AppContext::new(
        Arc::new(FakeVectorStore::new()),
        Arc::new(FakeEmbeddingBackend::new(8)),
        Arc::new(FakeLlmRunner::new()),
        Arc::new(FakeFileWatcher::new()),
        Arc::new(atlas_collaborators::FakeAgentCoordinator::new()),
        Arc::new(SystemClock),
        Arc::new(SequentialIdGen::new("task")),
        PathBuf::from("/tmp/atlas-test.sock"),
    )
}

#[tokio::test]
async fn healthy_fakes_report_overall_healthy() {
    let ctx = context();
    let report = health(&ctx).await;
    assert_eq!(report.overall, HealthState::Healthy);
    assert_eq!(report.dependencies.len(), 4);
}

#[tokio::test]
async fn unhealthy_vector_store_degrades_overall() {
    let ctx = context();
    let fake = FakeVectorStore::new();
    fake.set_health(HealthState::Unhealthy);
    let ctx = AppContext {
        vector_store: Arc::new(fake),
        ..ctx
    };
    let report = health(&ctx).await;
    assert_eq!(report.overall, HealthState::Unhealthy);
}

#[test]
fn status_reports_pid_and_socket_path() {
    let ctx = context();
    let report = status(&ctx);
    assert_eq!(report.pid, std::process::id());
    assert_eq!(report.socket_path, "/tmp/atlas-test.sock");
    assert_eq!(report.connected_clients, 0);
}
