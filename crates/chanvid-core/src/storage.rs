//! Destination file lifecycle for a single download.
//!
//! With atomic writes the body goes to `<name>.part` and is renamed to the final
//! name only after the transfer succeeded, so the final name existing always
//! means a complete download. Without them bytes go straight to the final name.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `clip.webm` → `clip.webm.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Sequential writer for one download.
#[derive(Debug)]
pub struct StorageWriter {
    file: File,
    write_path: PathBuf,
    final_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create the file that receives the body. Truncates a stale `.part` left by an
    /// earlier interrupted run.
    pub fn create(final_path: &Path, atomic: bool) -> Result<Self> {
        let write_path = if atomic {
            temp_path(final_path)
        } else {
            final_path.to_path_buf()
        };
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&write_path)
            .with_context(|| format!("failed to create {}", write_path.display()))?;
        Ok(Self {
            file,
            write_path,
            final_path: final_path.to_path_buf(),
            written: 0,
        })
    }

    /// Append one received chunk.
    pub fn write_chunk(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path bytes are currently written to.
    pub fn write_path(&self) -> &Path {
        &self.write_path
    }

    /// Flush and, for atomic writes, rename the temp file to the final path.
    /// Returns the final path.
    pub fn finalize(self) -> Result<PathBuf> {
        self.file
            .sync_all()
            .with_context(|| format!("failed to sync {}", self.write_path.display()))?;
        drop(self.file);
        if self.write_path != self.final_path {
            std::fs::rename(&self.write_path, &self.final_path).with_context(|| {
                format!(
                    "failed to rename {} to {}",
                    self.write_path.display(),
                    self.final_path.display()
                )
            })?;
        }
        Ok(self.final_path)
    }

    /// Give up on a failed transfer. Atomic writes remove their temp file; direct
    /// writes leave the partial file where it is.
    pub fn abandon(self) {
        drop(self.file);
        if self.write_path != self.final_path {
            if let Err(e) = std::fs::remove_file(&self.write_path) {
                tracing::warn!(
                    path = %self.write_path.display(),
                    "could not remove partial download: {}",
                    e
                );
            }
        }
    }
}
