// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vector-store collaborator contract.
//!
//! The chunking/embedding pipeline and the vector-store client proper are
//! out of scope for the daemon core (see `spec.md` §1); this module only
//! specifies the interface the core calls through. Chunks are pre-embedded
//! by the caller — the daemon core never computes embeddings itself.

mod noop;

pub use noop::NoOpVectorStore;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeVectorStore, VectorStoreCall};

use async_trait::async_trait;
use atlas_core::{HealthState, SearchFilters, SearchResult};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorStoreError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("search failed: {0}")]
    SearchFailed(String),
}

/// A single chunk ready to be stored: text, pre-computed embedding, and metadata.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub text: String,
    pub embedding: Vec<f32>,
    pub file_path: String,
    pub chunk_index: u32,
    pub created_at: DateTime<Utc>,
    pub qntm_key: Option<String>,
}

/// A group of near-duplicate chunks identified for consolidation.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    pub chunk_ids: Vec<String>,
    pub similarity: f32,
}

/// Interface the core calls into the vector-store client through.
#[async_trait]
pub trait VectorStoreClient: Send + Sync + 'static {
    /// Ensure the default collection exists; called once during daemon startup.
    async fn ensure_collection(&self, name: &str) -> Result<(), VectorStoreError>;

    /// Persist chunks, returning the number actually stored.
    async fn upsert(&self, collection: &str, chunks: Vec<ChunkRecord>) -> Result<u64, VectorStoreError>;

    /// Run a semantic search, applying the given filters.
    async fn search(
        &self,
        collection: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchResult>, VectorStoreError>;

    /// Find near-duplicate chunk groups for a consolidation pass.
    async fn find_duplicates(&self, collection: &str) -> Result<Vec<DuplicateGroup>, VectorStoreError>;

    /// Merge a duplicate group down to a single chunk, returning the count removed.
    async fn merge_duplicates(
        &self,
        collection: &str,
        group: &DuplicateGroup,
    ) -> Result<u64, VectorStoreError>;

    /// Probe connectivity/configuration without performing real work.
    async fn health(&self) -> HealthState;
}
