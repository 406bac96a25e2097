//! Per-item download error.

use std::path::PathBuf;

/// Why a single media download failed. Returned to the batch driver, which records
/// it and moves on to the next item.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The address has no usable final path segment to name the file after.
    #[error("no filename in url {0}")]
    NoFilename(String),
    /// libcurl reported an error (DNS, connect, TLS, stalled transfer, ...).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Fewer bytes arrived than the advertised Content-Length.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },
    /// Writing a received chunk failed (disk full, permission denied, ...).
    #[error("write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Creating or finalizing the destination file failed.
    #[error("storage: {0:#}")]
    Storage(anyhow::Error),
}

impl DownloadError {
    /// Short stable label used in run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            DownloadError::NoFilename(_) => "no_filename",
            DownloadError::Curl(_) => "network",
            DownloadError::Http(_) => "http",
            DownloadError::PartialTransfer { .. } => "partial_transfer",
            DownloadError::Io { .. } => "io",
            DownloadError::Storage(_) => "storage",
        }
    }
}
