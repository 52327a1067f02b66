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

#[tokio::test]
async fn search_finds_ingested_content() {
    let ctx = context();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "vector database semantic search engine").unwrap();
    ingest_sync(&ctx, vec![dir.path().to_path_buf()], false).await;

    let results = search(&ctx, "vector database semantic search", &SearchFilters::default())
        .await
        .unwrap();

    assert!(!results.is_empty());
    assert!(results[0].file_path.ends_with("a.txt"));
}

#[tokio::test]
async fn search_on_unknown_collection_surfaces_as_error() {
    let ctx = AppContext {
        collection: "missing".to_string(),
        ..context()
    };
    let err = search(&ctx, "anything", &SearchFilters::default()).await;
    assert!(err.is_err());
}

#[tokio::test]
async fn timeline_returns_stored_chunks_without_a_query() {
    let ctx = context();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "timeline content entry").unwrap();
    ingest_sync(&ctx, vec![dir.path().to_path_buf()], false).await;

    let results = timeline(&ctx, &SearchFilters::default()).await.unwrap();
    assert!(!results.is_empty());
}

#[tokio::test]
async fn get_agent_context_concatenates_hits_per_key() {
    let ctx = context();
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "authentication flow details").unwrap();
    ingest_sync(&ctx, vec![dir.path().to_path_buf()], false).await;

    let context_text = get_agent_context(&ctx, &["authentication".to_string()], 3).await.unwrap();
    assert!(context_text.contains("authentication"));
}
