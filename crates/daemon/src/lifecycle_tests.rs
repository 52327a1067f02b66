use super::*;
use tempfile::TempDir;

fn test_config(dir: &TempDir) -> Config {
    let state_dir = dir.path().to_path_buf();
    Config {
        socket_path: state_dir.join("atlas.sock"),
        lock_path: state_dir.join("atlas.pid"),
        log_path: state_dir.join("atlas.log"),
        log_level: "info".to_string(),
        state_dir,
    }
}

#[tokio::test]
async fn startup_binds_socket_and_writes_pid_file() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let result = startup(&config).await.unwrap();
    assert!(config.socket_path.exists());
    assert!(config.lock_path.exists());
    assert_eq!(std::fs::read_to_string(&config.lock_path).unwrap().trim(), std::process::id().to_string());

    shutdown(&config, &result.ctx, &result.scheduler_manager, "test").await;
    assert!(!config.socket_path.exists());
    assert!(!config.lock_path.exists());
}

#[tokio::test]
async fn second_startup_while_first_is_live_is_refused() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let first = startup(&config).await.unwrap();
    let second = startup(&config).await;
    assert!(matches!(second, Err(LifecycleError::AlreadyRunning)));

    shutdown(&config, &first.ctx, &first.scheduler_manager, "test").await;
}

#[tokio::test]
async fn startup_after_clean_shutdown_succeeds_again() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let first = startup(&config).await.unwrap();
    shutdown(&config, &first.ctx, &first.scheduler_manager, "test").await;
    drop(first);

    let second = startup(&config).await.unwrap();
    shutdown(&config, &second.ctx, &second.scheduler_manager, "test").await;
}

#[tokio::test]
async fn shutdown_is_idempotent_on_already_absent_files() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let result = startup(&config).await.unwrap();

    shutdown(&config, &result.ctx, &result.scheduler_manager, "first").await;
    // Second call against the same (already-removed) files must not panic.
    shutdown(&config, &result.ctx, &result.scheduler_manager, "second").await;
}

#[test]
fn shutdown_guard_fires_exactly_once() {
    let guard = ShutdownGuard::new();
    assert!(guard.fire());
    assert!(!guard.fire());
    assert!(!guard.fire());
}

#[test]
fn shutdown_guard_clones_share_state() {
    let guard = ShutdownGuard::new();
    let clone = guard.clone();
    assert!(guard.fire());
    assert!(!clone.fire());
}
