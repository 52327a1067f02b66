// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Search lane: `atlas.search`, `atlas.timeline`, and `atlas.get_agent_context`.

use atlas_core::{Event, LaneKind, SearchFilters, SearchResult};
use serde_json::json;

use crate::service::AppContext;
use atlas_collaborators::VectorStoreError;

pub async fn search(
    ctx: &AppContext,
    query: &str,
    filters: &SearchFilters,
) -> Result<Vec<SearchResult>, VectorStoreError> {
    let _permit = ctx.concurrency.acquire(LaneKind::Search).await;
    let results = ctx.vector_store.search(&ctx.collection, query, filters).await?;
    ctx.event_bus.emit(Event::new(
        "search.completed",
        json!({"query": query, "results": results.len()}),
    ));
    Ok(results)
}

/// `atlas.timeline`: recent chunks, i.e. an unfiltered-query search biased
/// by `since`/`consolidationLevel`/`qntmKey` only — reuses the same
/// collaborator call since the vector store is the sole source of chunks.
pub async fn timeline(ctx: &AppContext, filters: &SearchFilters) -> Result<Vec<SearchResult>, VectorStoreError> {
    let _permit = ctx.concurrency.acquire(LaneKind::Search).await;
    ctx.vector_store.search(&ctx.collection, "", filters).await
}

/// `atlas.get_agent_context`: for each QNTM key, run a focused search and
/// concatenate the top hits' text as context.
pub async fn get_agent_context(
    ctx: &AppContext,
    qntm_keys: &[String],
    limit_per_key: u32,
) -> Result<String, VectorStoreError> {
    let mut sections = Vec::new();
    for key in qntm_keys {
        let filters = SearchFilters {
            qntm_key: Some(key.clone()),
            limit: Some(limit_per_key),
            ..SearchFilters::default()
        };
        let hits = search(ctx, key, &filters).await?;
        if hits.is_empty() {
            continue;
        }
        let joined = hits.iter().map(|h| h.text.as_str()).collect::<Vec<_>>().join("\n\n");
        sections.push(format!("## {key}\n\n{joined}"));
    }
    Ok(sections.join("\n\n"))
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
