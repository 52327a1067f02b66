// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session Ingestor (C8): triggered by `atlas.session_event`, parses a
//! Claude-Code JSONL transcript and forwards its text content to the
//! ingest lane.
//!
//! Assistant message `content` is a union the source tolerates in both
//! forms (`spec.md` §4.8 step 3, §9): a bare string, or an array of
//! `{type: "text", text}` chunks. Both are handled here.

use atlas_core::{Event, TaskId};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::ingest::run_ingest;
use crate::service::AppContext;

const MIN_RETAINED_CHARS: usize = 100;
const SEPARATOR: &str = "\n\n---\n\n";

#[derive(Debug, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type")]
    role: String,
    content: Value,
}

/// Extract the text of one retained message, or `None` for a role/shape
/// this ingestor does not retain.
fn extract_text(line: &TranscriptLine) -> Option<String> {
    match line.role.as_str() {
        "user" => line.content.as_str().map(str::to_string),
        "assistant" => match &line.content {
            Value::String(s) => Some(s.clone()),
            Value::Array(chunks) => {
                let joined: String = chunks
                    .iter()
                    .filter_map(|c| {
                        if c.get("type").and_then(Value::as_str) == Some("text") {
                            c.get("text").and_then(Value::as_str)
                        } else {
                            None
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("");
                if joined.is_empty() {
                    None
                } else {
                    Some(joined)
                }
            }
            _ => None,
        },
        _ => None,
    }
}

/// Parse a transcript's lines into the joined retained text, per
/// `spec.md` §4.8 steps 2–4. Malformed lines are discarded silently.
pub fn parse_transcript(raw: &str) -> Option<String> {
    let blocks: Vec<String> = raw
        .lines()
        .filter_map(|line| serde_json::from_str::<TranscriptLine>(line).ok())
        .filter_map(|line| extract_text(&line))
        .collect();

    if blocks.is_empty() {
        return None;
    }
    let joined = blocks.join(SEPARATOR);
    if joined.chars().count() < MIN_RETAINED_CHARS {
        return None;
    }
    Some(joined)
}

/// Handle one `atlas.session_event`: returns `{status:"queued"}` to the
/// caller immediately (the actual work happens in the spawned task).
pub fn handle_session_event(ctx: AppContext, session_id: String, transcript_path: std::path::PathBuf) -> Value {
    tokio::spawn(async move {
        ingest_session(&ctx, &session_id, &transcript_path).await;
    });
    json!({"status": "queued"})
}

async fn ingest_session(ctx: &AppContext, session_id: &str, transcript_path: &std::path::Path) {
    let started = ctx.clock.now();

    let raw = match tokio::fs::read_to_string(transcript_path).await {
        Ok(raw) => raw,
        Err(error) => {
            warn!(%session_id, %error, "failed to read session transcript");
            ctx.event_bus.emit(Event::new(
                "session.error",
                json!({"sessionId": session_id, "error": error.to_string(), "phase": "ingest"}),
            ));
            return;
        }
    };

    let Some(content) = parse_transcript(&raw) else {
        return;
    };

    let header = format!("Session {session_id}\n\n");
    let temp_path = std::env::temp_dir().join(format!("atlas-session-{session_id}.md"));
    if let Err(error) = tokio::fs::write(&temp_path, format!("{header}{content}")).await {
        warn!(%session_id, %error, "failed to stage session transcript for ingest");
        ctx.event_bus.emit(Event::new(
            "session.error",
            json!({"sessionId": session_id, "error": error.to_string(), "phase": "ingest"}),
        ));
        return;
    }

    let task_id = TaskId::new(ctx.id_gen.next());
    let task = atlas_core::IngestTask::new(task_id.clone(), vec![temp_path.clone()], false, ctx.clock.now_utc());
    ctx.registry.insert(task);

    let result = run_ingest(ctx, &task_id, &[temp_path.clone()], false).await;
    ctx.registry
        .update(&task_id, |t| t.mark_terminal(atlas_core::IngestStatus::Completed, ctx.clock.now_utc()));
    let _ = tokio::fs::remove_file(&temp_path).await;

    if !result.errors.is_empty() && result.chunks_stored == 0 {
        let error = result
            .errors
            .first()
            .map(|e| e.error.clone())
            .unwrap_or_else(|| "ingest failed".to_string());
        ctx.event_bus.emit(Event::new(
            "session.error",
            json!({"sessionId": session_id, "error": error, "phase": "ingest"}),
        ));
        return;
    }

    ctx.event_bus.emit(Event::new(
        "session.ingested",
        json!({
            "sessionId": session_id,
            "chunksCreated": result.chunks_stored,
            "took": ctx.clock.now().duration_since(started).as_millis() as u64,
        }),
    ));
}

#[cfg(test)]
#[path = "session_ingestor_tests.rs"]
mod tests;
