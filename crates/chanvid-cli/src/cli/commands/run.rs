//! `chanvid run` – process the thread list.

use anyhow::{Context, Result};
use chanvid_core::config::{ChanvidConfig, DelayConfig, RendererKind};
use chanvid_core::driver::{self, RunEvent, RunSettings};
use chanvid_core::render;
use chanvid_core::summary::{ItemStatus, RunReport, RunSummary};
use std::path::{Path, PathBuf};

/// Command-line overrides for a run.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub renderer: Option<RendererKind>,
    pub dry_run: bool,
    pub no_delay: bool,
    pub report: Option<PathBuf>,
}

impl RunArgs {
    /// Merge the overrides into the configured settings.
    pub fn settings(&self, cfg: &ChanvidConfig) -> RunSettings {
        let mut settings = RunSettings::from_config(cfg);
        if let Some(input) = &self.input {
            settings.input_file = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if self.no_delay {
            settings.delays = DelayConfig::none();
        }
        settings.dry_run = self.dry_run;
        settings
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Console line for a driver event.
pub fn format_event(event: &RunEvent) -> String {
    match event {
        RunEvent::MissingInput { path } => format!("Error: {} does not exist.", path.display()),
        RunEvent::ThreadStarted { index, total, url } => {
            format!("\nProcessing thread {}/{}: {}", index, total, url)
        }
        RunEvent::ThreadTitle { title, folder } => {
            format!("Thread: {} -> {}", title, folder.display())
        }
        RunEvent::MediaFound { count } => format!("Found {} video(s) to download.", count),
        RunEvent::NoMedia { url } => format!("No videos found in thread {}.", url),
        RunEvent::ThreadFailed { url, message } => {
            format!("Skipping thread {}: {}", url, message)
        }
        RunEvent::ItemFinished { url, status } => match status {
            ItemStatus::Downloaded { path, bytes } => {
                format!("Successfully downloaded: {} ({} bytes)", file_name(path), bytes)
            }
            ItemStatus::AlreadyExists { path } => {
                format!("Video {} already exists, skipping download.", file_name(path))
            }
            ItemStatus::Failed { message, .. } => {
                format!("Failed to download video from {}: {}", url, message)
            }
            ItemStatus::Planned => format!("Would download: {}", url),
        },
        RunEvent::Finished => "\nAll threads processed.".to_string(),
    }
}

/// One-line totals printed after the run.
pub fn summary_line(summary: &RunSummary) -> String {
    let mut line = format!(
        "{} thread(s): {} video(s) downloaded, {} already present, {} failed ({} bytes written)",
        summary.threads.len(),
        summary.downloaded(),
        summary.already_present(),
        summary.failed(),
        summary.bytes_written()
    );
    let failed_threads = summary.threads_failed();
    if failed_threads > 0 {
        line.push_str(&format!("; {} thread(s) skipped", failed_threads));
    }
    line
}

pub async fn run_batch(cfg: &ChanvidConfig, args: RunArgs) -> Result<()> {
    let settings = args.settings(cfg);
    let kind = args.renderer.unwrap_or(cfg.renderer);
    let mut renderer = render::from_config(kind, cfg).await?;

    let (tx, mut rx) = tokio::sync::mpsc::channel::<RunEvent>(16);
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            println!("{}", format_event(&event));
        }
    });

    let result = driver::run_batch(&settings, renderer.as_mut(), Some(&tx)).await;
    drop(tx);
    let _ = printer.await;

    // The renderer is released on every path, including a failed run.
    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("renderer shutdown failed: {:#}", e);
    }

    let report = result?;
    if let RunReport::Completed(summary) = &report {
        println!("{}", summary_line(summary));
    }
    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        tracing::info!("run report written to {}", path.display());
    }
    Ok(())
}
