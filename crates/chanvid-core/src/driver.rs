//! Batch driver: walks the thread list and downloads every video it finds.
//!
//! Strictly sequential: one page, then its downloads one at a time, with
//! randomized pauses between items and between threads. Failures stay local to
//! the item or thread they happen in; only a missing thread list ends the run
//! early, and that is reported, not raised.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use crate::config::{ChanvidConfig, DelayConfig};
use crate::fetch::{download_if_absent, FetchOptions};
use crate::media::extract_media_links;
use crate::pacing;
use crate::render::Renderer;
use crate::summary::{ItemReport, ItemStatus, RunReport, RunSummary, ThreadReport, ThreadStatus};
use crate::thread_list::load_thread_urls;
use crate::title::thread_title;

/// Everything the driver needs for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub input_file: PathBuf,
    pub output_dir: PathBuf,
    pub delays: DelayConfig,
    pub fetch: FetchOptions,
    /// Extract and report only: no downloads, no thread folders.
    pub dry_run: bool,
}

impl RunSettings {
    pub fn from_config(cfg: &ChanvidConfig) -> Self {
        Self {
            input_file: cfg.input_file.clone(),
            output_dir: cfg.output_dir.clone(),
            delays: cfg.delays(),
            fetch: FetchOptions::from(cfg),
            dry_run: false,
        }
    }
}

/// Progress notifications for the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    MissingInput { path: PathBuf },
    ThreadStarted { index: usize, total: usize, url: String },
    ThreadTitle { title: String, folder: PathBuf },
    MediaFound { count: usize },
    NoMedia { url: String },
    ThreadFailed { url: String, message: String },
    ItemFinished { url: String, status: ItemStatus },
    Finished,
}

async fn emit(events: Option<&mpsc::Sender<RunEvent>>, event: RunEvent) {
    if let Some(tx) = events {
        // A closed console channel must not stop the run.
        let _ = tx.send(event).await;
    }
}

/// Runs the whole batch with `renderer`, which stays owned by the caller.
pub async fn run_batch(
    settings: &RunSettings,
    renderer: &mut dyn Renderer,
    events: Option<&mpsc::Sender<RunEvent>>,
) -> Result<RunReport> {
    let Some(urls) = load_thread_urls(&settings.input_file)? else {
        tracing::warn!("thread list {} does not exist", settings.input_file.display());
        emit(
            events,
            RunEvent::MissingInput {
                path: settings.input_file.clone(),
            },
        )
        .await;
        return Ok(RunReport::MissingInput {
            path: settings.input_file.clone(),
        });
    };

    if !settings.dry_run {
        if let Err(e) = tokio::fs::create_dir_all(&settings.output_dir).await {
            tracing::warn!(
                "could not create output dir {}: {}",
                settings.output_dir.display(),
                e
            );
        }
    }

    tracing::info!(
        threads = urls.len(),
        renderer = renderer.name(),
        dry_run = settings.dry_run,
        "starting run"
    );

    let total = urls.len();
    let mut summary = RunSummary::default();
    for (idx, url) in urls.iter().enumerate() {
        emit(
            events,
            RunEvent::ThreadStarted {
                index: idx + 1,
                total,
                url: url.clone(),
            },
        )
        .await;

        let report = process_thread(settings, renderer, url, events).await;
        summary.threads.push(report);

        if idx + 1 < total {
            pacing::pause(&settings.delays.thread).await;
        }
    }

    tracing::info!(
        threads = total,
        downloaded = summary.downloaded(),
        already_present = summary.already_present(),
        failed = summary.failed(),
        bytes = summary.bytes_written(),
        "run finished"
    );
    emit(events, RunEvent::Finished).await;
    Ok(RunReport::Completed(summary))
}

async fn process_thread(
    settings: &RunSettings,
    renderer: &mut dyn Renderer,
    url: &str,
    events: Option<&mpsc::Sender<RunEvent>>,
) -> ThreadReport {
    let mut report = ThreadReport::new(url);

    let page = match renderer.render(url).await {
        Ok(page) => page,
        Err(e) => {
            let message = format!("{e:#}");
            tracing::warn!(url, "render failed: {}", message);
            emit(
                events,
                RunEvent::ThreadFailed {
                    url: url.to_string(),
                    message: message.clone(),
                },
            )
            .await;
            report.status = ThreadStatus::RenderFailed { message };
            return report;
        }
    };
    pacing::pause(&settings.delays.settle).await;

    let title = thread_title(&page);
    let folder = settings.output_dir.join(&title);
    tracing::info!(url, title = %title, "thread title");
    report.title = Some(title.clone());
    report.folder = Some(folder.clone());
    emit(
        events,
        RunEvent::ThreadTitle {
            title,
            folder: folder.clone(),
        },
    )
    .await;

    if !settings.dry_run {
        // Colliding titles share a folder; an existing folder is fine.
        if let Err(e) = tokio::fs::create_dir_all(&folder).await {
            let message = format!("failed to create {}: {}", folder.display(), e);
            tracing::warn!(url, "{}", message);
            emit(
                events,
                RunEvent::ThreadFailed {
                    url: url.to_string(),
                    message: message.clone(),
                },
            )
            .await;
            report.status = ThreadStatus::FolderFailed { message };
            return report;
        }
    }

    let mut links: Vec<String> = extract_media_links(&page).into_iter().collect();
    links.sort();
    if links.is_empty() {
        tracing::info!(url, "no videos found");
        emit(events, RunEvent::NoMedia { url: url.to_string() }).await;
        return report;
    }
    emit(events, RunEvent::MediaFound { count: links.len() }).await;

    let count = links.len();
    for (i, link) in links.into_iter().enumerate() {
        let status = if settings.dry_run {
            ItemStatus::Planned
        } else {
            fetch_item(&link, &folder, &settings.fetch).await
        };
        emit(
            events,
            RunEvent::ItemFinished {
                url: link.clone(),
                status: status.clone(),
            },
        )
        .await;
        report.items.push(ItemReport { url: link, status });

        if !settings.dry_run && i + 1 < count {
            pacing::pause(&settings.delays.item).await;
        }
    }
    report
}

/// Runs the blocking download on the blocking pool and waits for it.
async fn fetch_item(url: &str, folder: &Path, opts: &FetchOptions) -> ItemStatus {
    let (u, dir, o) = (url.to_string(), folder.to_path_buf(), opts.clone());
    match tokio::task::spawn_blocking(move || download_if_absent(&u, &dir, &o)).await {
        Ok(result) => {
            if let Err(e) = &result {
                tracing::warn!(url, kind = e.kind(), "download failed: {}", e);
            }
            ItemStatus::from(&result)
        }
        Err(e) => {
            tracing::error!(url, "download task failed: {}", e);
            ItemStatus::Failed {
                kind: "task".to_string(),
                message: e.to_string(),
            }
        }
    }
}
