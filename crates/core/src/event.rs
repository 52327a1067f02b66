// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The daemon's event envelope: `{ type: string, data: object }`.
//!
//! Events are transient and carry enough data for an external observer to
//! reconstruct progress; the daemon never persists them. Types are organized
//! in dotted namespaces (`daemon.*`, `ingest.*`, `ingest.file.*`, `search.*`,
//! `consolidate.*`, `session.*`, `lane.*`).

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Well-known event type strings, grouped by namespace.
pub mod kind {
    pub const DAEMON_STARTED: &str = "daemon.started";
    pub const DAEMON_STOPPING: &str = "daemon.stopping";

    pub const INGEST_STARTED: &str = "ingest.started";
    pub const INGEST_COMPLETED: &str = "ingest.completed";
    pub const INGEST_FAILED: &str = "ingest.failed";
    pub const INGEST_STOPPED: &str = "ingest.stopped";
    pub const INGEST_FILE_COMPLETE: &str = "ingest.file.complete";
    pub const INGEST_FILE_ERROR: &str = "ingest.file.error";

    pub const SEARCH_COMPLETED: &str = "search.completed";

    pub const CONSOLIDATE_STARTED: &str = "consolidate.started";
    pub const CONSOLIDATE_PROGRESS: &str = "consolidate.progress";
    pub const CONSOLIDATE_COMPLETED: &str = "consolidate.completed";

    pub const SESSION_INGESTED: &str = "session.ingested";
    pub const SESSION_ERROR: &str = "session.error";

    pub const LANE_PRESSURE_CHANGED: &str = "lane.pressure.changed";
    pub const LANE_CONCURRENCY_UPDATED: &str = "lane.concurrency.updated";
}

/// A tagged, self-contained event fanned out through the event bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, data: Value) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }

    /// Build an event with no payload beyond the type tag.
    pub fn empty(event_type: impl Into<String>) -> Self {
        Self::new(event_type, json!({}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_as_type_and_data() {
        let event = Event::new(kind::INGEST_FILE_COMPLETE, json!({"taskId": "t1", "chunks": 12}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "ingest.file.complete");
        assert_eq!(value["data"]["taskId"], "t1");
        assert_eq!(value["data"]["chunks"], 12);
    }

    #[test]
    fn event_round_trips_through_json() {
        let event = Event::new("search.completed", json!({"hits": 3}));
        let json = serde_json::to_string(&event).unwrap();
        let decoded: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, event);
    }
}
