//! Thread address list: plain text, one address per line.

use anyhow::{Context, Result};
use std::path::Path;

/// Parse list contents: each line trimmed, blank lines dropped, order and duplicates kept.
pub fn parse_thread_urls(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load the list at `path`. Returns `Ok(None)` when the file does not exist.
pub fn load_thread_urls(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read thread list {}", path.display()))?;
    Ok(Some(parse_thread_urls(&contents)))
}
