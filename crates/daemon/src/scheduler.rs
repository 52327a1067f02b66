// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler Manager (C6): register, start, and stop long-lived
//! background workers.
//!
//! The daemon always registers a [`PressureMonitorScheduler`]; a
//! [`FileWatcherScheduler`] is added per watched path requested through
//! `atlas.ingest.start {watch: true}`. `start_all` runs schedulers in
//! registration order and logs+skips one that fails to start rather than
//! aborting the rest; `stop_all` runs in reverse order and never lets one
//! scheduler's failure block another's shutdown, per `spec.md` §4.6.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use atlas_core::{Event, PressureLevel, TaskId};
use parking_lot::Mutex;
use sysinfo::System;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::ingest::run_ingest;
use crate::service::AppContext;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler already running")]
    AlreadyRunning,
}

/// A named, restartable background worker.
#[async_trait]
pub trait Scheduler: Send + Sync {
    fn name(&self) -> &'static str;
    async fn start(&self) -> Result<(), SchedulerError>;
    async fn stop(&self);
}

/// Default sampling cadence for the pressure monitor.
const SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

struct RunningHandle {
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Periodically samples CPU/memory pressure and retargets every lane's
/// concurrency controller. Pressure classification: `low` below 40% CPU
/// and 60% memory, `critical` above 90% CPU or 90% memory, `high` above
/// 75% CPU or 80% memory, `normal` otherwise.
pub struct PressureMonitorScheduler {
    ctx: AppContext,
    handle: Mutex<Option<RunningHandle>>,
    interval: Duration,
}

impl PressureMonitorScheduler {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            handle: Mutex::new(None),
            interval: SAMPLE_INTERVAL,
        }
    }

    #[cfg(test)]
    fn with_interval(ctx: AppContext, interval: Duration) -> Self {
        Self {
            ctx,
            handle: Mutex::new(None),
            interval,
        }
    }

    fn classify(cpu_percent: f32, mem_percent: f32) -> PressureLevel {
        if cpu_percent >= 90.0 || mem_percent >= 90.0 {
            PressureLevel::Critical
        } else if cpu_percent >= 75.0 || mem_percent >= 80.0 {
            PressureLevel::High
        } else if cpu_percent < 40.0 && mem_percent < 60.0 {
            PressureLevel::Low
        } else {
            PressureLevel::Normal
        }
    }
}

#[async_trait]
impl Scheduler for PressureMonitorScheduler {
    fn name(&self) -> &'static str {
        "pressure-monitor"
    }

    async fn start(&self) -> Result<(), SchedulerError> {
        if self.handle.lock().is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let ctx = self.ctx.clone();
        let interval = self.interval;

        let join = tokio::spawn(async move {
            let mut system = System::new();
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = tokio::time::sleep(interval) => {}
                }
                system.refresh_cpu_usage();
                system.refresh_memory();
                let cpu_percent = system.global_cpu_usage();
                let mem_percent = if system.total_memory() == 0 {
                    0.0
                } else {
                    (system.used_memory() as f64 / system.total_memory() as f64 * 100.0) as f32
                };
                let level = PressureMonitorScheduler::classify(cpu_percent, mem_percent);
                ctx.concurrency.retarget_all(level);
                ctx.event_bus.emit(Event::new(
                    "lane.pressure.changed",
                    serde_json::json!({"level": level, "cpuPercent": cpu_percent, "memPercent": mem_percent}),
                ));
            }
        });

        *self.handle.lock() = Some(RunningHandle {
            shutdown: shutdown_tx,
            join,
        });
        info!("pressure monitor started");
        Ok(())
    }

    async fn stop(&self) {
        if let Some(running) = self.handle.lock().take() {
            let _ = running.shutdown.send(());
            if let Err(error) = running.join.await {
                warn!(%error, "pressure monitor task panicked during shutdown");
            }
        }
    }
}

/// Watches one path (per an ingest task requesting `watch: true`) and
/// re-ingests the changed file through the ingest lane on every change
/// notification. Teardown calls `FileWatcher::unwatch` so the collaborator's
/// own bookkeeping never outlives the ingest task it serves.
pub struct FileWatcherScheduler {
    ctx: AppContext,
    task_id: TaskId,
    path: PathBuf,
    handle: Mutex<Option<RunningHandle>>,
}

impl FileWatcherScheduler {
    pub fn new(ctx: AppContext, task_id: TaskId, path: PathBuf) -> Self {
        Self {
            ctx,
            task_id,
            path,
            handle: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Scheduler for FileWatcherScheduler {
    fn name(&self) -> &'static str {
        "file-watcher"
    }

    async fn start(&self) -> Result<(), SchedulerError> {
        if self.handle.lock().is_some() {
            return Err(SchedulerError::AlreadyRunning);
        }
        let (events_tx, mut events_rx) = mpsc::channel(64);
        if let Err(error) = self.ctx.watcher.watch(self.path.clone(), events_tx).await {
            error!(path = %self.path.display(), %error, "failed to start watching path");
            return Err(SchedulerError::AlreadyRunning);
        }

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let ctx = self.ctx.clone();
        let task_id = self.task_id.clone();

        let join = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    event = events_rx.recv() => {
                        let Some(event) = event else { break };
                        let result = run_ingest(&ctx, &task_id, std::slice::from_ref(&event.path), false).await;
                        ctx.registry.update(&task_id, |t| t.record_file(result.chunks_stored));
                    }
                }
            }
        });

        *self.handle.lock() = Some(RunningHandle {
            shutdown: shutdown_tx,
            join,
        });
        Ok(())
    }

    async fn stop(&self) {
        if let Some(running) = self.handle.lock().take() {
            let _ = running.shutdown.send(());
            if let Err(error) = running.join.await {
                warn!(%error, "file watcher task panicked during shutdown");
            }
        }
        if let Err(error) = self.ctx.watcher.unwatch(&self.path).await {
            warn!(path = %self.path.display(), %error, "failed to unwatch path during shutdown");
        }
    }
}

/// Bookkeeping for the per-path `FileWatcherScheduler`s spawned dynamically
/// by `atlas.ingest.start {watch: true}`, keyed by the owning ingest task so
/// `atlas.ingest.stop` can tear the right one down. Unlike the startup-time
/// schedulers in [`SchedulerManager`], these come and go with individual
/// ingest tasks rather than with the daemon's own lifecycle.
#[derive(Clone, Default)]
pub struct WatcherSchedulers {
    active: Arc<Mutex<HashMap<TaskId, Arc<FileWatcherScheduler>>>>,
}

impl WatcherSchedulers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `path` on behalf of `task_id`. A task may only watch
    /// one path at a time; a second call for the same task replaces it.
    pub async fn spawn(&self, ctx: AppContext, task_id: TaskId, path: PathBuf) -> Result<(), SchedulerError> {
        let scheduler = Arc::new(FileWatcherScheduler::new(ctx, task_id.clone(), path));
        scheduler.start().await?;
        if let Some(previous) = self.active.lock().insert(task_id, scheduler) {
            previous.stop().await;
        }
        Ok(())
    }

    /// Stop and remove the watcher scheduler owned by `task_id`, if any.
    pub async fn stop(&self, task_id: &TaskId) {
        let removed = self.active.lock().remove(task_id);
        if let Some(scheduler) = removed {
            scheduler.stop().await;
        }
    }
}

/// Ordered collection of registered schedulers.
#[derive(Default)]
pub struct SchedulerManager {
    schedulers: Vec<Arc<dyn Scheduler>>,
}

impl SchedulerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scheduler: Arc<dyn Scheduler>) {
        self.schedulers.push(scheduler);
    }

    pub async fn start_all(&self) {
        for scheduler in &self.schedulers {
            if let Err(error) = scheduler.start().await {
                error!(scheduler = scheduler.name(), %error, "scheduler failed to start, skipping");
            }
        }
    }

    pub async fn stop_all(&self) {
        for scheduler in self.schedulers.iter().rev() {
            scheduler.stop().await;
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
