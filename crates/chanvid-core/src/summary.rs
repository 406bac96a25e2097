//! End-of-run summary: what happened to every thread and every media item.

use serde::Serialize;
use std::path::PathBuf;

use crate::fetch::{DownloadError, DownloadOutcome};

/// Result of one media item, in a form that can be printed or saved as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemStatus {
    Downloaded { path: PathBuf, bytes: u64 },
    AlreadyExists { path: PathBuf },
    Failed { kind: String, message: String },
    /// Listed but not fetched (dry run).
    Planned,
}

impl From<&Result<DownloadOutcome, DownloadError>> for ItemStatus {
    fn from(result: &Result<DownloadOutcome, DownloadError>) -> Self {
        match result {
            Ok(DownloadOutcome::Downloaded { path, bytes }) => ItemStatus::Downloaded {
                path: path.clone(),
                bytes: *bytes,
            },
            Ok(DownloadOutcome::AlreadyExists { path }) => {
                ItemStatus::AlreadyExists { path: path.clone() }
            }
            Err(e) => ItemStatus::Failed {
                kind: e.kind().to_string(),
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemReport {
    pub url: String,
    #[serde(flatten)]
    pub status: ItemStatus,
}

/// How far processing of a thread got.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThreadStatus {
    /// Title and links extracted; items were attempted.
    Processed,
    RenderFailed { message: String },
    FolderFailed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadReport {
    pub url: String,
    /// Sanitized title (folder name), when the page was rendered.
    pub title: Option<String>,
    pub folder: Option<PathBuf>,
    pub status: ThreadStatus,
    pub items: Vec<ItemReport>,
}

impl ThreadReport {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            title: None,
            folder: None,
            status: ThreadStatus::Processed,
            items: Vec::new(),
        }
    }
}

/// Aggregate over all threads of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub threads: Vec<ThreadReport>,
}

impl RunSummary {
    fn items(&self) -> impl Iterator<Item = &ItemReport> {
        self.threads.iter().flat_map(|t| t.items.iter())
    }

    pub fn media_found(&self) -> usize {
        self.items().count()
    }

    pub fn downloaded(&self) -> usize {
        self.items()
            .filter(|i| matches!(i.status, ItemStatus::Downloaded { .. }))
            .count()
    }

    pub fn already_present(&self) -> usize {
        self.items()
            .filter(|i| matches!(i.status, ItemStatus::AlreadyExists { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items()
            .filter(|i| matches!(i.status, ItemStatus::Failed { .. }))
            .count()
    }

    pub fn bytes_written(&self) -> u64 {
        self.items()
            .map(|i| match i.status {
                ItemStatus::Downloaded { bytes, .. } => bytes,
                _ => 0,
            })
            .sum()
    }

    pub fn threads_failed(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| t.status != ThreadStatus::Processed)
            .count()
    }

    /// Threads rendered successfully that had no media links.
    pub fn threads_without_media(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| t.status == ThreadStatus::Processed && t.items.is_empty())
            .count()
    }
}

/// What a call to the batch driver produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RunReport {
    /// The thread list file does not exist; nothing was done.
    MissingInput { path: PathBuf },
    Completed(RunSummary),
}
