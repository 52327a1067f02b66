// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Application Service (C10): the single place the core calls into the
//! ingest, search, consolidate, QNTM, timeline, and health collaborators.
//!
//! `AppContext` is the "single root object constructed at startup" called
//! for in `spec.md` §9 — it replaces the source's global mutable
//! singletons (event router, daemon instance, task registry,
//! consolidation lock) with one struct built once in `main` and passed by
//! `Arc` clone to every component that needs it. Tests construct a fresh
//! one per test instead of resetting module-level state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use atlas_collaborators::{AgentCoordinator, EmbeddingBackend, FileWatcher, LlmRunner, VectorStoreClient};
use atlas_core::{Clock, IdGen};

use crate::concurrency::ConcurrencyController;
use crate::event_bus::EventBus;
use crate::registry::TaskRegistry;
use crate::scheduler::WatcherSchedulers;

pub const DEFAULT_COLLECTION: &str = "atlas";

/// Everything a handler needs, bundled once at startup. Cheap to clone:
/// every field is itself an `Arc` or a `Clone`-cheap handle.
#[derive(Clone)]
pub struct AppContext {
    pub registry: TaskRegistry,
    pub event_bus: EventBus,
    pub concurrency: ConcurrencyController,
    pub watcher_schedulers: WatcherSchedulers,
    pub vector_store: Arc<dyn VectorStoreClient>,
    pub embedding: Arc<dyn EmbeddingBackend>,
    pub llm: Arc<dyn LlmRunner>,
    pub watcher: Arc<dyn FileWatcher>,
    pub agent_coordinator: Arc<dyn AgentCoordinator>,
    pub clock: Arc<dyn Clock>,
    pub id_gen: Arc<dyn IdGen>,
    pub collection: String,
    pub socket_path: PathBuf,
    pub start_time: Instant,
    pub pid: u32,
}

impl AppContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vector_store: Arc<dyn VectorStoreClient>,
        embedding: Arc<dyn EmbeddingBackend>,
        llm: Arc<dyn LlmRunner>,
        watcher: Arc<dyn FileWatcher>,
        agent_coordinator: Arc<dyn AgentCoordinator>,
        clock: Arc<dyn Clock>,
        id_gen: Arc<dyn IdGen>,
        socket_path: PathBuf,
    ) -> Self {
        Self {
            registry: TaskRegistry::new(),
            event_bus: EventBus::new(),
            concurrency: ConcurrencyController::from_env(),
            watcher_schedulers: WatcherSchedulers::new(),
            vector_store,
            embedding,
            llm,
            watcher,
            agent_coordinator,
            clock,
            id_gen,
            collection: DEFAULT_COLLECTION.to_string(),
            socket_path,
            start_time: Instant::now(),
            pid: std::process::id(),
        }
    }
}
