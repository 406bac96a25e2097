//! Logging init: append to `chanvid.log` under the XDG state dir, or stderr.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Debug for our crates; chromiumoxide logs every CDP message at info.
const DEFAULT_FILTER: &str = "info,chanvid=debug,chanvid_core=debug,chromiumoxide=warn";

/// `RUST_LOG`-style directives, or the default when unset or unparsable.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn env_filter() -> EnvFilter {
    filter_from(std::env::var("RUST_LOG").ok().as_deref())
}

fn log_file_in(state_home: &Path) -> PathBuf {
    state_home.join("chanvid").join("chanvid.log")
}

/// Path of the log file: `~/.local/state/chanvid/chanvid.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chanvid")?;
    Ok(log_file_in(&xdg_dirs.get_state_home()))
}

fn file_subscriber(
    file: fs::File,
    filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish()
}

/// Install the file logger. Errors leave no subscriber installed so the caller
/// can fall back to [`init_logging_stderr`].
pub fn init_logging() -> Result<()> {
    let path = log_file_path()?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;

    file_subscriber(file, env_filter())
        .try_init()
        .context("failed to install subscriber")?;
    tracing::info!("chanvid logging initialized at {}", path.display());
    Ok(())
}

pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
