// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op vector store: reports itself unconfigured rather than panicking.
//! Used when no real backend is wired up; every operation fails with
//! `BackendUnavailable` so the router can surface `-32002`.

use super::{ChunkRecord, DuplicateGroup, VectorStoreClient, VectorStoreError};
use async_trait::async_trait;
use atlas_core::{HealthState, SearchFilters, SearchResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpVectorStore;

impl NoOpVectorStore {
    pub fn new() -> Self {
        Self
    }

    fn unavailable() -> VectorStoreError {
        VectorStoreError::BackendUnavailable("no vector store backend configured".to_string())
    }
}

#[async_trait]
impl VectorStoreClient for NoOpVectorStore {
    async fn ensure_collection(&self, _name: &str) -> Result<(), VectorStoreError> {
        Err(Self::unavailable())
    }

    async fn upsert(&self, _collection: &str, _chunks: Vec<ChunkRecord>) -> Result<u64, VectorStoreError> {
        Err(Self::unavailable())
    }

    async fn search(
        &self,
        _collection: &str,
        _query: &str,
        _filters: &SearchFilters,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        Err(Self::unavailable())
    }

    async fn find_duplicates(&self, _collection: &str) -> Result<Vec<DuplicateGroup>, VectorStoreError> {
        Err(Self::unavailable())
    }

    async fn merge_duplicates(
        &self,
        _collection: &str,
        _group: &DuplicateGroup,
    ) -> Result<u64, VectorStoreError> {
        Err(Self::unavailable())
    }

    async fn health(&self) -> HealthState {
        HealthState::Degraded
    }
}
