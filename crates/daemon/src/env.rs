// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access and daemon configuration.

use std::path::PathBuf;

use crate::lifecycle::LifecycleError;

/// Resolve the state directory: `ATLAS_STATE_DIR` > `XDG_STATE_HOME/atlas` >
/// `~/.local/state/atlas`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("ATLAS_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("atlas"));
    }
    dirs::home_dir()
        .map(|home| home.join(".local/state/atlas"))
        .ok_or(LifecycleError::NoStateDir)
}

/// `ATLAS_LOG_LEVEL`, fed to `tracing_subscriber::EnvFilter` as a default
/// when `RUST_LOG` is unset.
pub fn log_level() -> String {
    std::env::var("ATLAS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
}

/// Daemon configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    /// Socket path; `ATLAS_SOCK` overrides the default `<state_dir>/atlas.sock`.
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
}

impl Config {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        let socket_path = std::env::var("ATLAS_SOCK")
            .map(PathBuf::from)
            .unwrap_or_else(|_| state_dir.join("atlas.sock"));

        Ok(Self {
            lock_path: state_dir.join("atlas.pid"),
            log_path: state_dir.join("atlas.log"),
            log_level: log_level(),
            socket_path,
            state_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn state_dir_prefers_atlas_state_dir_override() {
        std::env::set_var("ATLAS_STATE_DIR", "/tmp/atlas-test-state");
        assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/atlas-test-state"));
        std::env::remove_var("ATLAS_STATE_DIR");
    }

    #[test]
    #[serial]
    fn log_level_defaults_to_info() {
        std::env::remove_var("ATLAS_LOG_LEVEL");
        assert_eq!(log_level(), "info");
    }

    #[test]
    #[serial]
    fn config_honors_atlas_sock_override() {
        std::env::set_var("ATLAS_STATE_DIR", "/tmp/atlas-test-state");
        std::env::set_var("ATLAS_SOCK", "/tmp/custom.sock");
        let config = Config::load().unwrap();
        assert_eq!(config.socket_path, PathBuf::from("/tmp/custom.sock"));
        std::env::remove_var("ATLAS_STATE_DIR");
        std::env::remove_var("ATLAS_SOCK");
    }
}
