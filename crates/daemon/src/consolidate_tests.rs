use super::*;
use crate::ingest::ingest_sync;
use atlas_collaborators::{FakeEmbeddingBackend, FakeFileWatcher, FakeLlmRunner, FakeVectorStore};
use atlas_core::{SequentialIdGen, SystemClock};
use std::path::PathBuf;
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
        PathBuf::from("/tmp/atlas-test.sock"),
    )
}

async fn ingest_duplicate_content(ctx: &AppContext) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "same exact content").unwrap();
    std::fs::write(dir.path().join("b.txt"), "same exact content").unwrap();
    ingest_sync(ctx, vec![dir.path().to_path_buf()], false).await;
}

#[tokio::test]
async fn dry_run_finds_groups_but_does_not_merge() {
    let ctx = context();
    ingest_duplicate_content(&ctx).await;

    let result = consolidate_sync(&ctx, true).await;
    assert!(result.groups_found > 0);
    assert_eq!(result.chunks_merged, 0);
}

#[tokio::test]
async fn non_dry_run_merges_found_groups() {
    let ctx = context();
    ingest_duplicate_content(&ctx).await;

    let result = consolidate_sync(&ctx, false).await;
    assert!(result.chunks_merged > 0);
}

#[tokio::test]
async fn start_twice_in_quick_succession_returns_incumbent_on_second() {
    let ctx = context();
    ingest_duplicate_content(&ctx).await;

    let first = start_consolidation(ctx.clone(), true);
    assert!(first.locked);

    let second = start_consolidation(ctx.clone(), true);
    assert!(!second.locked);
    assert_eq!(second.task_id, first.task_id);
    assert!(second.message.contains("already running"));
}

#[tokio::test]
async fn stop_releases_the_lock() {
    let ctx = context();
    let start = start_consolidation(ctx.clone(), true);
    assert!(start.locked);

    assert!(stop_consolidation(&ctx));
    assert!(!ctx.registry.consolidation_lock.status().locked);
}

#[tokio::test]
async fn stop_when_not_locked_returns_false() {
    let ctx = context();
    assert!(!stop_consolidation(&ctx));
}
