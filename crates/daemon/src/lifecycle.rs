// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle Manager (C9): PID-file locking, ordered startup/shutdown, and
//! signal handling, per `spec.md` §4.9.
//!
//! Startup acquires the PID lock before touching anything else so two
//! racing daemons can never both believe they own the socket; shutdown is
//! gated by a re-entrant flag so a signal arriving mid-shutdown (or a
//! second `stopDaemon()` call, per §8's idempotence property) is a no-op.

use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use atlas_collaborators::{AgentCoordinator, EmbeddingBackend, FileWatcher, LlmRunner, VectorStoreClient};
use atlas_core::{Clock, Event, IdGen, SystemClock, UuidIdGen};
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::env::Config;
use crate::scheduler::{PressureMonitorScheduler, Scheduler, SchedulerManager};
use crate::service::AppContext;
use crate::transport;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine state directory")]
    NoStateDir,
    #[error("another daemon is already running (pid file locked)")]
    AlreadyRunning,
    #[error("failed to bind socket: {0}")]
    Transport(#[from] transport::TransportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the rest of the process needs after a successful startup:
/// the bound listener (to spawn the accept loop from) and the `AppContext`
/// every handler call threads through.
pub struct StartupResult {
    pub listener: UnixListener,
    pub ctx: AppContext,
    pub scheduler_manager: Arc<SchedulerManager>,
    /// Held for the process lifetime; dropping releases the advisory lock.
    _lock_file: File,
}

/// Acquire the PID lock, refusing to start if a live daemon already holds
/// it. `spec.md` §4.9 step 2: "If a PID file exists and names a live
/// process -> refuse to start with a fatal error." `try_lock_exclusive`
/// already encodes liveness: a crashed daemon's file descriptor was closed
/// by the OS, so the lock is free even though the file still exists.
fn acquire_pid_lock(lock_path: &PathBuf) -> Result<File, LifecycleError> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new().write(true).create(true).truncate(false).open(lock_path)?;
    file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning)?;
    file.set_len(0)?;
    use std::io::Write;
    let mut file = file;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

fn remove_if_present(path: &std::path::Path) {
    if path.exists() {
        if let Err(error) = std::fs::remove_file(path) {
            warn!(path = %path.display(), %error, "failed to remove stale file");
        }
    }
}

/// Run the startup sequence described in `spec.md` §4.9. On any failure
/// before the listener is accepting, partially created state is cleaned up
/// and the PID lock (if held) is released by dropping its `File`.
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    // Step 2/3: refuse if a live daemon holds the lock; otherwise the
    // previous PID/socket files are stale and can be cleared.
    let lock_file = acquire_pid_lock(&config.lock_path)?;
    remove_if_present(&config.socket_path);

    // Step 4: application service + collaborator wiring. Production
    // collaborators are swapped in here once real adapters exist; today the
    // daemon runs against each collaborator's `NoOp` implementation so it
    // degrades (never crashes) when no backend is configured, per §6's
    // "core treats their absence as degraded health and never as fatal."
    let vector_store: Arc<dyn VectorStoreClient> = Arc::new(atlas_collaborators::NoOpVectorStore::default());
    let embedding: Arc<dyn EmbeddingBackend> = Arc::new(atlas_collaborators::NoOpEmbeddingBackend::default());
    let llm: Arc<dyn LlmRunner> = Arc::new(atlas_collaborators::NoOpLlmRunner::default());
    let watcher: Arc<dyn FileWatcher> = Arc::new(atlas_collaborators::NoOpFileWatcher::default());
    let agent_coordinator: Arc<dyn AgentCoordinator> = Arc::new(atlas_collaborators::NoOpAgentCoordinator::default());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let id_gen: Arc<dyn IdGen> = Arc::new(UuidIdGen);

    let ctx = AppContext::new(
        vector_store,
        embedding,
        llm,
        watcher,
        agent_coordinator,
        clock,
        id_gen,
        config.socket_path.clone(),
    );

    // Step 5 (register prompts with the LLM collaborator) has no concrete
    // prompt catalog in this core yet; QNTM tag generation calls the
    // collaborator directly per request instead of through a named prompt,
    // so there is nothing to register here today.

    // Step 6: register schedulers. The pressure monitor always runs;
    // per-path file watchers register dynamically via
    // `AppContext::watcher_schedulers` as `atlas.ingest.start {watch: true}`
    // requests arrive, not at startup.
    let mut manager = SchedulerManager::new();
    manager.register(Arc::new(PressureMonitorScheduler::new(ctx.clone())));
    let scheduler_manager = Arc::new(manager);

    // Step 7: start the transport listener.
    let listener = transport::bind(&config.socket_path).await?;

    // Step 8: start all schedulers.
    scheduler_manager.start_all().await;

    // Step 9: announce readiness.
    ctx.event_bus.emit(Event::new(
        "daemon.started",
        serde_json::json!({"pid": ctx.pid, "socket": config.socket_path.to_string_lossy()}),
    ));
    info!(pid = ctx.pid, socket = %config.socket_path.display(), "daemon started");

    Ok(StartupResult {
        listener,
        ctx,
        scheduler_manager,
        _lock_file: lock_file,
    })
}

/// Re-entrant shutdown guard: signals, a crash path, and an explicit
/// `stopDaemon()` call may all race to initiate shutdown, but `spec.md`
/// §4.9 requires exactly one to proceed and §8 requires the others to be a
/// silent no-op rather than an error.
#[derive(Clone, Default)]
pub struct ShutdownGuard {
    fired: Arc<AtomicBool>,
}

impl ShutdownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time it is called; every subsequent call
    /// (from any clone) returns `false`.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::SeqCst)
    }
}

/// Run the shutdown sequence described in `spec.md` §4.9. Safe to call
/// with an already-removed PID/socket file (idempotent per §8); callers
/// should gate entry through a [`ShutdownGuard`] so this only ever runs once.
pub async fn shutdown(config: &Config, ctx: &AppContext, scheduler_manager: &SchedulerManager, reason: &str) {
    ctx.event_bus.emit(Event::new("daemon.stopping", serde_json::json!({"reason": reason})));
    info!(reason, "daemon stopping");

    scheduler_manager.stop_all().await;
    ctx.concurrency.drain().await;

    remove_if_present(&config.socket_path);
    remove_if_present(&config.lock_path);

    info!("daemon shutdown complete");
}

/// Await the next graceful-stop signal (`SIGINT`, `SIGTERM`, or `SIGHUP`),
/// returning the name of whichever fired first.
pub async fn wait_for_shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        let mut sighup = signal(SignalKind::hangup()).expect("failed to install SIGHUP handler");
        tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
            _ = sighup.recv() => "SIGHUP",
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "ctrl-c"
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
