// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! atlasd: the Atlas daemon binary entry point. Owns process-level
//! concerns (argument parsing, logging, signal handling, exit codes) and
//! delegates everything else to the `atlas_daemon` library crate.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use atlas_core::ConnectionId;
use atlas_daemon::env::Config;
use atlas_daemon::lifecycle::{self, LifecycleError, ShutdownGuard};
use atlas_daemon::protocol::{self, InboundMessage, RpcNotification, RpcResponse};
use atlas_daemon::router;
use atlas_daemon::service::AppContext;
use atlas_daemon::transport::{self, Connection, NextLine};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("atlasd {}", env!("CARGO_PKG_VERSION"));
                return std::process::ExitCode::SUCCESS;
            }
            "--help" | "-h" => {
                print_help();
                return std::process::ExitCode::SUCCESS;
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("usage: atlasd [--help | --version]");
                return std::process::ExitCode::FAILURE;
            }
        }
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("failed to resolve atlas state directory: {error}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let _log_guard = match setup_logging(&config) {
        Ok(guard) => guard,
        Err(error) => {
            eprintln!("failed to set up logging: {error}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let startup = match lifecycle::startup(&config).await {
        Ok(startup) => startup,
        Err(LifecycleError::AlreadyRunning) => {
            eprintln!("atlasd is already running (pid file locked at {})", config.lock_path.display());
            return std::process::ExitCode::FAILURE;
        }
        Err(error) => {
            error!(%error, "daemon failed to start");
            return std::process::ExitCode::FAILURE;
        }
    };

    let exit_code = run(config, startup).await;
    std::process::ExitCode::from(exit_code)
}

async fn run(config: Config, startup: lifecycle::StartupResult) -> u8 {
    let lifecycle::StartupResult {
        listener,
        ctx,
        scheduler_manager,
        ..
    } = startup;

    let shutdown_guard = ShutdownGuard::new();
    let next_connection_id = Arc::new(AtomicU64::new(1));

    let accept_ctx = ctx.clone();
    let accept_ids = next_connection_id.clone();
    let accept_loop = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let id = ConnectionId::new(format!("c{}", accept_ids.fetch_add(1, Ordering::SeqCst)));
                    let ctx = accept_ctx.clone();
                    tokio::spawn(async move {
                        serve_connection(ctx, stream, id).await;
                    });
                }
                Err(error) => {
                    warn!(%error, "accept failed");
                }
            }
        }
    });

    let reason = lifecycle::wait_for_shutdown_signal().await;
    let exit_code = if shutdown_guard.fire() {
        accept_loop.abort();
        lifecycle::shutdown(&config, &ctx, &scheduler_manager, reason).await;
        0
    } else {
        0
    };
    info!(reason, "daemon exiting");
    exit_code
}

/// Per-connection read loop: classify each line, dispatch requests through
/// the router, and forward this connection's subscribed events — both
/// funneled through the same `ConnectionWriter` so responses and
/// notifications interleave but never race each other's writes.
async fn serve_connection(ctx: AppContext, stream: tokio::net::UnixStream, id: ConnectionId) {
    let Connection { id, mut reader, writer } = transport::accept_connection(stream, id);

    let (event_tx, mut event_rx) = mpsc::channel(64);
    ctx.event_bus.register(id.clone(), event_tx);

    let notify_writer = writer.clone();
    let notify_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let notification = RpcNotification::for_event(&event);
            if let Ok(line) = serde_json::to_string(&notification) {
                let _ = notify_writer.write_line(&line).await;
            }
        }
    });

    loop {
        match reader.next_line().await {
            Ok(NextLine::Line(line)) => {
                if let Err(error) = handle_line(&ctx, &id, &line, &writer).await {
                    warn!(connection_id = %id, %error, "failed to write response");
                    break;
                }
            }
            Ok(NextLine::Closed) => break,
            Err(error) => {
                warn!(connection_id = %id, %error, "connection framing error");
                break;
            }
        }
    }

    notify_task.abort();
    ctx.event_bus.unregister(&id);
}

async fn handle_line(
    ctx: &AppContext,
    id: &ConnectionId,
    line: &str,
    writer: &Arc<transport::ConnectionWriter>,
) -> std::io::Result<()> {
    match protocol::parse_line(line) {
        Ok(InboundMessage::Request(request)) => {
            let response = match router::dispatch(ctx, id, &request).await {
                Ok(result) => RpcResponse::success(request.id.clone(), result),
                Err(err) => RpcResponse::error(request.id.clone(), err),
            };
            let encoded = serde_json::to_string(&response).unwrap_or_else(|_| {
                serde_json::to_string(&RpcResponse::error(request.id.clone(), atlas_core::RpcError::internal("failed to encode response")))
                    .expect("a static error response always encodes")
            });
            writer.write_line(&encoded).await
        }
        Ok(InboundMessage::StrayResponse) => Ok(()),
        Err((Some(id), err)) => {
            let response = RpcResponse::error(id, err);
            let encoded = serde_json::to_string(&response).expect("RpcResponse always encodes");
            writer.write_line(&encoded).await
        }
        Err((None, error)) => {
            warn!(message = %error.message, "dropping malformed line with no salvageable id");
            Ok(())
        }
    }
}

fn print_help() {
    println!("atlasd {}", env!("CARGO_PKG_VERSION"));
    println!("Atlas memory daemon — listens on a Unix socket for JSON-RPC requests.");
    println!();
    println!("USAGE:");
    println!("    atlasd");
    println!();
    println!("atlasd is typically started by the `atlas` CLI and should not be");
    println!("invoked directly.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -V, --version    Print version information");
}

fn setup_logging(config: &Config) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config.log_path.file_name().ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
