// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake vector store for daemon tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ChunkRecord, DuplicateGroup, VectorStoreClient, VectorStoreError};
use async_trait::async_trait;
use atlas_core::{HealthState, SearchFilters, SearchResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum VectorStoreCall {
    EnsureCollection { name: String },
    Upsert { collection: String, count: usize },
    Search { collection: String, query: String },
    FindDuplicates { collection: String },
    MergeDuplicates { collection: String, group_size: usize },
}

struct StoredChunk {
    id: String,
    record: ChunkRecord,
}

struct FakeState {
    collections: HashMap<String, Vec<StoredChunk>>,
    calls: Vec<VectorStoreCall>,
    next_id: u64,
    health: HealthState,
}

/// Records calls and does naive substring scoring, enough to drive ingest →
/// search integration tests without a real embedding model.
#[derive(Clone)]
pub struct FakeVectorStore {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeVectorStore {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                collections: HashMap::new(),
                calls: Vec::new(),
                next_id: 0,
                health: HealthState::Healthy,
            })),
        }
    }
}

impl FakeVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<VectorStoreCall> {
        self.inner.lock().calls.clone()
    }

    pub fn chunk_count(&self, collection: &str) -> usize {
        self.inner
            .lock()
            .collections
            .get(collection)
            .map(|v| v.len())
            .unwrap_or(0)
    }

    pub fn set_health(&self, health: HealthState) {
        self.inner.lock().health = health;
    }
}

#[async_trait]
impl VectorStoreClient for FakeVectorStore {
    async fn ensure_collection(&self, name: &str) -> Result<(), VectorStoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VectorStoreCall::EnsureCollection {
            name: name.to_string(),
        });
        inner.collections.entry(name.to_string()).or_default();
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: Vec<ChunkRecord>) -> Result<u64, VectorStoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VectorStoreCall::Upsert {
            collection: collection.to_string(),
            count: chunks.len(),
        });
        let entry = inner.collections.entry(collection.to_string()).or_default();
        let mut stored = 0u64;
        for record in chunks {
            inner.next_id += 1;
            entry.push(StoredChunk {
                id: format!("chunk-{}", inner.next_id),
                record,
            });
            stored += 1;
        }
        Ok(stored)
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<SearchResult>, VectorStoreError> {
        let inner = self.inner.lock();
        let Some(chunks) = inner.collections.get(collection) else {
            return Err(VectorStoreError::CollectionNotFound(collection.to_string()));
        };

        let query_lower = query.to_lowercase();
        let mut results: Vec<SearchResult> = chunks
            .iter()
            .filter(|c| {
                filters
                    .qntm_key
                    .as_deref()
                    .map(|k| c.record.qntm_key.as_deref() == Some(k))
                    .unwrap_or(true)
            })
            .filter(|c| {
                filters
                    .since
                    .map(|since| c.record.created_at >= since)
                    .unwrap_or(true)
            })
            .map(|c| {
                let overlap = query_lower
                    .split_whitespace()
                    .filter(|term| c.record.text.to_lowercase().contains(term))
                    .count() as f32;
                let score = if query_lower.is_empty() {
                    0.0
                } else {
                    overlap / query_lower.split_whitespace().count().max(1) as f32
                };
                SearchResult {
                    text: c.record.text.clone(),
                    file_path: c.record.file_path.clone(),
                    chunk_index: c.record.chunk_index,
                    score,
                    created_at: c.record.created_at,
                    qntm_key: c.record.qntm_key.clone(),
                }
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(limit) = filters.limit {
            results.truncate(limit as usize);
        }
        Ok(results)
    }

    async fn find_duplicates(&self, collection: &str) -> Result<Vec<DuplicateGroup>, VectorStoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VectorStoreCall::FindDuplicates {
            collection: collection.to_string(),
        });
        let Some(chunks) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };

        // Naive: group chunks with byte-identical text as "duplicates".
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for chunk in chunks {
            groups.entry(chunk.record.text.clone()).or_default().push(chunk.id.clone());
        }
        Ok(groups
            .into_values()
            .filter(|ids| ids.len() > 1)
            .map(|ids| DuplicateGroup {
                chunk_ids: ids,
                similarity: 1.0,
            })
            .collect())
    }

    async fn merge_duplicates(
        &self,
        collection: &str,
        group: &DuplicateGroup,
    ) -> Result<u64, VectorStoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push(VectorStoreCall::MergeDuplicates {
            collection: collection.to_string(),
            group_size: group.chunk_ids.len(),
        });
        let Some(chunks) = inner.collections.get_mut(collection) else {
            return Err(VectorStoreError::CollectionNotFound(collection.to_string()));
        };
        // Keep the first id in the group, drop the rest.
        let keep = group.chunk_ids.first().cloned();
        let before = chunks.len();
        chunks.retain(|c| !group.chunk_ids.contains(&c.id) || Some(c.id.clone()) == keep);
        Ok((before - chunks.len()) as u64)
    }

    async fn health(&self) -> HealthState {
        self.inner.lock().health
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
