//! Tracing setup for the server binary.
//!
//! stdout carries the MCP stream, so console output goes to stderr. A file
//! layer under a per-session directory is added when enabled.
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::ServerConfig;

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn setup_logging(config: &ServerConfig) -> Result<Option<WorkerGuard>> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_filter(env_filter());

    if !config.logging.file {
        tracing_subscriber::registry().with(stderr_layer).init();
        return Ok(None);
    }

    let session_id = config.session_id.clone().unwrap_or_else(default_session_id);
    let session_log_dir = config
        .logging
        .dir
        .clone()
        .unwrap_or_else(log_directory)
        .join(&session_id);
    std::fs::create_dir_all(&session_log_dir).with_context(|| {
        format!("failed to create log directory {}", session_log_dir.display())
    })?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "bridge.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(env_filter());

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::info!(session = %session_id, "logging initialized");
    tracing::info!("log file: {}/bridge.log", session_log_dir.display());

    Ok(Some(guard))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn default_session_id() -> String {
    chrono::Local::now()
        .format("session_%Y%m%d_%H%M%S")
        .to_string()
}

/// Platform cache directory for bridge logs.
///
/// - macOS: `~/Library/Caches/decision-bridge/logs`
/// - Linux: `~/.cache/decision-bridge/logs` (or `$XDG_CACHE_HOME/...`)
/// - Windows: `%LOCALAPPDATA%\decision-bridge\cache\logs`
pub fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "decision-bridge")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("decision-bridge"))
        .join("logs")
}
