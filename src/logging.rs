//! Logging init for embedding build tools.
//!
//! Resolution logs land in the configured work directory, next to the
//! artifacts they describe, so a failed build leaves its fetch history in
//! the same place the caller already inspects.

use crate::config::BuildConfig;
use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "artifetch.log";

/// Where resolution logs for this configuration are written.
pub fn log_file_path(cfg: &BuildConfig) -> PathBuf {
    cfg.work_dir.join(LOG_FILE_NAME)
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    Ok(file)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,artifetch=debug"))
}

/// Initialize structured logging to `<work_dir>/artifetch.log`.
/// Returns Err when the work directory is unwritable or a subscriber is
/// already installed, so the caller can fall back to stderr.
pub fn init_logging(cfg: &BuildConfig) -> Result<()> {
    let path = log_file_path(cfg);
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install subscriber: {}", e))?;

    tracing::info!("artifetch logging initialized at {}", path.display());
    Ok(())
}

/// Initialize logging to stderr only (no file). Use when `init_logging()`
/// fails so the embedding tool doesn't crash on an unwritable work dir.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
