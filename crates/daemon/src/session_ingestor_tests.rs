use super::*;
use atlas_collaborators::{FakeEmbeddingBackend, FakeFileWatcher, FakeLlmRunner, FakeVectorStore};
use atlas_core::{Event, SequentialIdGen, SystemClock};
use parking_lot::Mutex;
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

fn collect_events(ctx: &AppContext) -> Arc<Mutex<Vec<Event>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    ctx.event_bus.add_listener(Arc::new(move |event: &Event| {
        sink.lock().push(event.clone());
    }));
    events
}

fn jsonl_line(role: &str, content: &str) -> String {
    format!(r#"{{"type":"{role}","content":{content}}}"#)
}

#[test]
fn parse_transcript_joins_user_and_assistant_text_and_discards_other_roles() {
    let raw = vec![
        jsonl_line("user", r#""how does the router dispatch methods?""#),
        jsonl_line("system", r#""ignored entirely""#),
        jsonl_line(
            "assistant",
            r#"[{"type":"text","text":"it matches on the method field"},{"type":"tool_use","text":"ignored"}]"#,
        ),
    ]
    .join("\n");
    // pad past the 100-char retention floor
    let raw = format!("{raw}\n{}", jsonl_line("user", &format!(r#""{}""#, "x".repeat(120))));

    let parsed = parse_transcript(&raw).expect("should retain enough text");
    assert!(parsed.contains("how does the router dispatch methods?"));
    assert!(parsed.contains("it matches on the method field"));
    assert!(!parsed.contains("ignored"));
    assert!(parsed.contains("\n\n---\n\n"));
}

#[test]
fn parse_transcript_discards_malformed_lines() {
    let raw = format!(
        "not json at all\n{}\n{{\"type\":\"user\"}}\n{}",
        jsonl_line("user", &format!(r#""{}""#, "y".repeat(120))),
        jsonl_line("user", &format!(r#""{}""#, "z".repeat(120)))
    );
    let parsed = parse_transcript(&raw).expect("valid lines should still be retained");
    assert!(parsed.contains(&"y".repeat(120)));
    assert!(parsed.contains(&"z".repeat(120)));
}

#[test]
fn parse_transcript_discards_short_transcripts() {
    let raw = jsonl_line("user", r#""too short""#);
    assert!(parse_transcript(&raw).is_none());
}

#[tokio::test]
async fn handle_session_event_ingests_and_emits_session_ingested() {
    let ctx = context();
    let events = collect_events(&ctx);

    let dir = TempDir::new().unwrap();
    let transcript_path = dir.path().join("session.jsonl");
    let body = format!(
        "{}\n{}",
        jsonl_line("user", &format!(r#""{}""#, "a".repeat(60))),
        jsonl_line("assistant", &format!(r#""{}""#, "b".repeat(60)))
    );
    std::fs::write(&transcript_path, body).unwrap();

    handle_session_event(ctx.clone(), "sess-1".to_string(), transcript_path.clone());

    for _ in 0..50 {
        if events.lock().iter().any(|e| e.event_type == "session.ingested") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let seen = events.lock().clone();
    let ingested = seen
        .iter()
        .find(|e| e.event_type == "session.ingested")
        .expect("session.ingested should have been emitted");
    assert_eq!(ingested.data["sessionId"], "sess-1");
    assert!(ingested.data["chunksCreated"].as_u64().unwrap() > 0);
    assert!(!std::env::temp_dir().join("atlas-session-sess-1.md").exists());
}

#[tokio::test]
async fn handle_session_event_too_short_emits_nothing() {
    let ctx = context();
    let events = collect_events(&ctx);

    let dir = TempDir::new().unwrap();
    let transcript_path = dir.path().join("session.jsonl");
    std::fs::write(&transcript_path, jsonl_line("user", r#""hi""#)).unwrap();

    handle_session_event(ctx.clone(), "sess-2".to_string(), transcript_path);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert!(events.lock().is_empty());
}

#[tokio::test]
async fn handle_session_event_missing_file_emits_session_error() {
    let ctx = context();
    let events = collect_events(&ctx);

    handle_session_event(
        ctx.clone(),
        "sess-3".to_string(),
        std::path::PathBuf::from("/nonexistent/atlas-session-test.jsonl"),
    );

    for _ in 0..50 {
        if events.lock().iter().any(|e| e.event_type == "session.error") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let seen = events.lock().clone();
    let error = seen
        .iter()
        .find(|e| e.event_type == "session.error")
        .expect("session.error should have been emitted");
    assert_eq!(error.data["sessionId"], "sess-3");
    assert_eq!(error.data["phase"], "ingest");
}
