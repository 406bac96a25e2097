//! Download-if-absent for a single media file.
//!
//! A file already present under the target name counts as downloaded: no
//! request is made and the file is not touched. Otherwise the body is streamed
//! with libcurl straight into the destination (see [`crate::storage`]).
//! Blocking; call from `spawn_blocking` when used from async code.

mod error;

pub use error::DownloadError;

use crate::config::ChanvidConfig;
use crate::media::filename_from_url;
use crate::storage::StorageWriter;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

/// Transfer settings shared by page fetches and media downloads.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Receive buffer size; each write callback gets at most this many bytes.
    pub chunk_size: usize,
    pub atomic_writes: bool,
    pub connect_timeout: Option<Duration>,
    pub low_speed_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::from(&ChanvidConfig::default())
    }
}

impl From<&ChanvidConfig> for FetchOptions {
    fn from(cfg: &ChanvidConfig) -> Self {
        Self {
            chunk_size: cfg.chunk_size,
            atomic_writes: cfg.atomic_writes,
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
            low_speed_timeout: cfg.low_speed_timeout_secs.map(Duration::from_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// Successful result of [`download_if_absent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched; `bytes` were written.
    Downloaded { path: PathBuf, bytes: u64 },
    /// A file with the same name was already present; nothing was fetched.
    AlreadyExists { path: PathBuf },
}

impl DownloadOutcome {
    pub fn path(&self) -> &Path {
        match self {
            DownloadOutcome::Downloaded { path, .. } | DownloadOutcome::AlreadyExists { path } => {
                path
            }
        }
    }

    pub fn bytes_written(&self) -> u64 {
        match self {
            DownloadOutcome::Downloaded { bytes, .. } => *bytes,
            DownloadOutcome::AlreadyExists { .. } => 0,
        }
    }
}

/// Apply the common libcurl settings for `url`.
pub(crate) fn configure_easy(
    easy: &mut curl::easy::Easy,
    url: &str,
    opts: &FetchOptions,
) -> Result<(), curl::Error> {
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(t) = opts.connect_timeout {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = opts.low_speed_timeout {
        easy.low_speed_limit(1024)?;
        easy.low_speed_time(t)?;
    }
    if let Some(ua) = &opts.user_agent {
        easy.useragent(ua)?;
    }
    Ok(())
}

/// Parse the status code out of an `HTTP/x y reason` header line.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}

/// Parse a `Content-Length` header line.
pub(crate) fn parse_content_length(line: &str) -> Option<u64> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse().ok()
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Fetches `url` into `dest_dir` unless a file with the same name already exists there.
pub fn download_if_absent(
    url: &str,
    dest_dir: &Path,
    opts: &FetchOptions,
) -> Result<DownloadOutcome, DownloadError> {
    let filename = filename_from_url(url).ok_or_else(|| DownloadError::NoFilename(url.to_string()))?;
    let final_path = dest_dir.join(filename);

    if final_path.exists() {
        tracing::info!(file = %filename, "already exists, skipping download");
        return Ok(DownloadOutcome::AlreadyExists { path: final_path });
    }

    tracing::info!(url, "downloading");
    let bytes = stream_to_file(url, &final_path, opts)?;
    tracing::info!(file = %filename, bytes, "download complete");
    Ok(DownloadOutcome::Downloaded {
        path: final_path,
        bytes,
    })
}

/// Streams the body of `url` into `final_path`; returns the number of bytes written.
fn stream_to_file(url: &str, final_path: &Path, opts: &FetchOptions) -> Result<u64, DownloadError> {
    let mut easy = curl::easy::Easy::new();
    configure_easy(&mut easy, url, opts)?;
    easy.buffer_size(opts.chunk_size)?;

    // Header state is reset on every status line so redirects don't leak values.
    let status: Cell<Option<u32>> = Cell::new(None);
    let content_length: Cell<Option<u64>> = Cell::new(None);
    let mut writer: Option<StorageWriter> = None;
    let mut write_failure: Option<DownloadError> = None;
    let mut last_reported_pct = 0u64;

    let result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                if let Some(code) = parse_status_line(line) {
                    status.set(Some(code));
                    content_length.set(None);
                } else if let Some(len) = parse_content_length(line) {
                    content_length.set(Some(len));
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            // Error and redirect bodies are discarded, never written to disk.
            if !status.get().is_some_and(is_success) {
                return Ok(data.len());
            }
            if writer.is_none() {
                match StorageWriter::create(final_path, opts.atomic_writes) {
                    Ok(w) => writer = Some(w),
                    Err(e) => {
                        write_failure = Some(DownloadError::Storage(e));
                        return Ok(0); // abort transfer
                    }
                }
            }
            let Some(w) = writer.as_mut() else {
                return Ok(0);
            };
            if let Err(e) = w.write_chunk(data) {
                write_failure = Some(DownloadError::Io {
                    path: w.write_path().to_path_buf(),
                    source: e,
                });
                return Ok(0);
            }
            if let Some(total) = content_length.get().filter(|t| *t > 0) {
                let pct = w.written().saturating_mul(100) / total;
                if pct >= last_reported_pct + 10 {
                    last_reported_pct = pct - pct % 10;
                    tracing::debug!(url, bytes = w.written(), total, "{}% downloaded", pct);
                }
            }
            Ok(data.len())
        })?;
        transfer.perform()
    };

    let outcome = check_transfer(&mut easy, result, write_failure, content_length.get(), &writer);
    match outcome {
        Ok(()) => {
            let w = match writer {
                Some(w) => w,
                // 2xx with an empty body: still produce the (empty) file.
                None => StorageWriter::create(final_path, opts.atomic_writes)
                    .map_err(DownloadError::Storage)?,
            };
            let written = w.written();
            w.finalize().map_err(DownloadError::Storage)?;
            Ok(written)
        }
        Err(e) => {
            if let Some(w) = writer {
                w.abandon();
            }
            Err(e)
        }
    }
}

fn check_transfer(
    easy: &mut curl::easy::Easy,
    result: Result<(), curl::Error>,
    write_failure: Option<DownloadError>,
    content_length: Option<u64>,
    writer: &Option<StorageWriter>,
) -> Result<(), DownloadError> {
    if let Some(e) = write_failure {
        return Err(e);
    }
    result?;
    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(DownloadError::Http(code));
    }
    let received = writer.as_ref().map(StorageWriter::written).unwrap_or(0);
    if let Some(expected) = content_length {
        if received != expected {
            return Err(DownloadError::PartialTransfer { expected, received });
        }
    }
    Ok(())
}
