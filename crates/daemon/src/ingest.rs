// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ingest lane: walks input paths, chunks file contents, embeds and
//! stores chunks. Chunking itself (splitting raw text into chunk-sized
//! spans) is the core's glue logic; computing the embedding vector for
//! each chunk and persisting it are delegated to the embedding and
//! vector-store collaborators per `spec.md` §1.

use std::path::{Path, PathBuf};

use atlas_collaborators::ChunkRecord;
use atlas_core::{Event, IngestStatus, IngestTask, TaskId};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::service::AppContext;

/// Longest single chunk, in characters, before a paragraph is split further.
const MAX_CHUNK_CHARS: usize = 2000;

/// Split text on blank lines into paragraph-sized chunks; any paragraph
/// still longer than `MAX_CHUNK_CHARS` is cut into fixed-size windows so
/// no single chunk overwhelms the embedding backend.
pub fn chunk_text(text: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    for paragraph in text.split("\n\n") {
        let trimmed = paragraph.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.chars().count() <= MAX_CHUNK_CHARS {
            chunks.push(trimmed.to_string());
            continue;
        }
        let chars: Vec<char> = trimmed.chars().collect();
        for window in chars.chunks(MAX_CHUNK_CHARS) {
            chunks.push(window.iter().collect());
        }
    }
    chunks
}

/// Collect the files an ingest request should process: each path is either
/// a file (used as-is) or a directory (walked, optionally recursively).
fn collect_files(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            continue;
        }
        let walker = if recursive {
            WalkDir::new(path)
        } else {
            WalkDir::new(path).max_depth(1)
        };
        for entry in walker.into_iter().filter_map(Result::ok) {
            if entry.file_type().is_file() {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub files_processed: u64,
    pub chunks_stored: u64,
    pub errors: Vec<atlas_core::FileError>,
}

/// Ingest one file: read, chunk, embed, upsert. Returns the number of
/// chunks stored, or the error to record against the owning task.
async fn ingest_one_file(ctx: &AppContext, file: &Path) -> Result<u64, String> {
    let text = tokio::fs::read_to_string(file)
        .await
        .map_err(|e| format!("read failed: {e}"))?;
    let pieces = chunk_text(&text);
    if pieces.is_empty() {
        return Ok(0);
    }

    let vectors = ctx
        .embedding
        .embed(&pieces)
        .await
        .map_err(|e| format!("embedding failed: {e}"))?;

    let now = ctx.clock.now_utc();
    let file_path = file.to_string_lossy().to_string();
    let records: Vec<ChunkRecord> = pieces
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(idx, (text, embedding))| ChunkRecord {
            text,
            embedding,
            file_path: file_path.clone(),
            chunk_index: idx as u32,
            created_at: now,
            qntm_key: None,
        })
        .collect();

    ctx.vector_store
        .upsert(&ctx.collection, records)
        .await
        .map_err(|e| format!("store failed: {e}"))
}

/// Run an ingest pass over `paths` to completion, updating `task` as it
/// goes and returning the final summary. Shared by the synchronous
/// `atlas.ingest` handler and the background worker behind
/// `atlas.ingest.start`.
pub async fn run_ingest(ctx: &AppContext, task_id: &TaskId, paths: &[PathBuf], recursive: bool) -> IngestResult {
    let files = collect_files(paths, recursive);
    let mut errors = Vec::new();
    let mut chunks_stored = 0u64;
    let mut files_processed = 0u64;

    for file in &files {
        if !ctx.registry.get(task_id).map(|t| t.status == IngestStatus::Running).unwrap_or(false) {
            // Stopped out from under us: stop accepting new files, per the
            // collaborator cancellation contract in spec.md §4.5.
            break;
        }

        let _permit = ctx.concurrency.acquire(atlas_core::LaneKind::Ingest).await;
        match ingest_one_file(ctx, file).await {
            Ok(chunks) => {
                chunks_stored += chunks;
                files_processed += 1;
                ctx.registry.update(task_id, |t| t.record_file(chunks));
                ctx.event_bus.emit(Event::new(
                    "ingest.file.complete",
                    json!({"taskId": task_id.as_str(), "filePath": file.to_string_lossy(), "chunks": chunks}),
                ));
            }
            Err(error) => {
                warn!(file = %file.display(), %error, "ingest file failed");
                errors.push(atlas_core::FileError {
                    file_path: file.to_string_lossy().to_string(),
                    error: error.clone(),
                });
                ctx.registry
                    .update(task_id, |t| t.record_error(file.to_string_lossy(), error.clone()));
            }
        }
    }

    IngestResult {
        files_processed,
        chunks_stored,
        errors,
    }
}

/// Synchronous `atlas.ingest`: runs to completion inline and returns the summary.
pub async fn ingest_sync(ctx: &AppContext, paths: Vec<PathBuf>, recursive: bool) -> IngestResult {
    let task_id = TaskId::new(ctx.id_gen.next());
    let task = IngestTask::new(task_id.clone(), paths.clone(), false, ctx.clock.now_utc());
    ctx.registry.insert(task);
    ctx.event_bus.emit(Event::new("ingest.started", json!({"taskId": task_id.as_str()})));

    let result = run_ingest(ctx, &task_id, &paths, recursive).await;

    ctx.registry.update(&task_id, |t| t.mark_terminal(IngestStatus::Completed, ctx.clock.now_utc()));
    ctx.event_bus.emit(Event::new(
        "ingest.completed",
        json!({"taskId": task_id.as_str(), "filesProcessed": result.files_processed, "chunksStored": result.chunks_stored}),
    ));
    result
}

/// Spawn the background worker behind `atlas.ingest.start`, returning the
/// new task's id immediately; `watching` is recorded on the task but the
/// file-watcher wiring itself happens in `crate::scheduler`.
pub fn spawn_ingest(ctx: AppContext, paths: Vec<PathBuf>, recursive: bool, watching: bool) -> TaskId {
    let task_id = TaskId::new(ctx.id_gen.next());
    let task = IngestTask::new(task_id.clone(), paths.clone(), watching, ctx.clock.now_utc());
    ctx.registry.insert(task);
    ctx.event_bus.emit(Event::new("ingest.started", json!({"taskId": task_id.as_str()})));

    let worker_task_id = task_id.clone();
    tokio::spawn(async move {
        let result = run_ingest(&ctx, &worker_task_id, &paths, recursive).await;
        let still_running = ctx
            .registry
            .get(&worker_task_id)
            .map(|t| t.status == IngestStatus::Running)
            .unwrap_or(false);
        if still_running {
            ctx.registry
                .update(&worker_task_id, |t| t.mark_terminal(IngestStatus::Completed, ctx.clock.now_utc()));
            ctx.event_bus.emit(Event::new(
                "ingest.completed",
                json!({
                    "taskId": worker_task_id.as_str(),
                    "filesProcessed": result.files_processed,
                    "chunksStored": result.chunks_stored,
                }),
            ));
        }
        info!(task_id = %worker_task_id, "ingest worker finished");
    });

    task_id
}

/// `atlas.ingest.stop`: mark the task terminal now; the worker (if still
/// running) observes the status change and stops accepting new files.
pub fn stop_ingest(ctx: &AppContext, task_id: &TaskId) -> bool {
    let stopped = ctx.registry.update(task_id, |t| {
        if !t.status.is_terminal() {
            t.mark_terminal(IngestStatus::Stopped, ctx.clock.now_utc());
        }
    });
    if stopped {
        ctx.registry.stop_watching(task_id);
    }
    stopped
}

#[cfg(test)]
#[path = "ingest_tests.rs"]
mod tests;
