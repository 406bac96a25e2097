//! Integration tests: the batch driver over canned thread pages and a local media server.

mod common;

use chanvid_core::config::DelayConfig;
use chanvid_core::driver::{run_batch, RunEvent, RunSettings};
use chanvid_core::fetch::FetchOptions;
use chanvid_core::render::Renderer;
use chanvid_core::summary::{ItemStatus, RunReport, RunSummary, ThreadStatus};
use common::media_server::{self, Route};
use common::static_renderer::{thread_html, StaticRenderer};
use std::path::Path;
use std::sync::atomic::Ordering;
use tempfile::tempdir;
use tokio::sync::mpsc;

fn settings(root: &Path) -> RunSettings {
    RunSettings {
        input_file: root.join("thread_urls.txt"),
        output_dir: root.join("downloads"),
        delays: DelayConfig::none(),
        fetch: FetchOptions::default(),
        dry_run: false,
    }
}

fn completed(report: RunReport) -> RunSummary {
    match report {
        RunReport::Completed(summary) => summary,
        other => panic!("expected completed run, got {other:?}"),
    }
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn colliding_titles_share_a_folder() {
    let body: Vec<u8> = (0u8..200).cycle().take(8 * 1024).collect();
    let server = media_server::start(vec![("/b/123.webm", Route::Body(body.clone()))]);
    let root = tempdir().unwrap();
    let cfg = settings(root.path());
    std::fs::write(&cfg.input_file, "threadA_url\n\nthreadB_url\n").unwrap();

    let media = server.url("/b/123.webm");
    let mut renderer = StaticRenderer::new(vec![
        (
            "threadA_url",
            thread_html(Some("/b/ - Cats - 4chan"), &[media.as_str(), media.as_str(), "/b/thumb.jpg"]),
        ),
        ("threadB_url", thread_html(Some("/b/ - Cats - 4chan"), &[])),
    ]);

    let (tx, mut rx) = mpsc::channel(64);
    let report = run_batch(&cfg, &mut renderer, Some(&tx)).await.unwrap();
    drop(tx);
    let summary = completed(report);

    let cats = cfg.output_dir.join("Cats");
    assert_eq!(files_in(&cfg.output_dir), vec!["Cats"]);
    assert_eq!(files_in(&cats), vec!["123.webm"]);
    assert_eq!(std::fs::read(cats.join("123.webm")).unwrap(), body);

    assert_eq!(summary.threads.len(), 2);
    assert_eq!(summary.threads[0].folder.as_deref(), Some(cats.as_path()));
    assert_eq!(summary.threads[1].folder.as_deref(), Some(cats.as_path()));
    assert_eq!(summary.downloaded(), 1);
    assert_eq!(summary.threads_without_media(), 1);
    assert_eq!(server.hits("/b/123.webm"), 1);

    let mut events = Vec::new();
    while let Some(ev) = rx.recv().await {
        events.push(ev);
    }
    assert!(events.contains(&RunEvent::NoMedia {
        url: "threadB_url".to_string()
    }));
    assert!(events.contains(&RunEvent::MediaFound { count: 1 }));
    assert_eq!(events.last(), Some(&RunEvent::Finished));
    assert_eq!(
        events[0],
        RunEvent::ThreadStarted {
            index: 1,
            total: 2,
            url: "threadA_url".to_string()
        }
    );
}

#[tokio::test]
async fn second_run_writes_nothing() {
    let server = media_server::start(vec![
        ("/wsg/1.webm", Route::Body(vec![1u8; 3000])),
        ("/wsg/2.mp4", Route::Body(vec![2u8; 5000])),
    ]);
    let root = tempdir().unwrap();
    let cfg = settings(root.path());
    std::fs::write(&cfg.input_file, "t1\n").unwrap();
    let html = thread_html(
        Some("/wsg/ - Loops - Worksafe GIF - 4chan"),
        &[server.url("/wsg/1.webm").as_str(), server.url("/wsg/2.mp4").as_str()],
    );

    let mut renderer = StaticRenderer::new(vec![("t1", html)]);
    let first = completed(run_batch(&cfg, &mut renderer, None).await.unwrap());
    assert_eq!(first.downloaded(), 2);
    assert_eq!(first.bytes_written(), 8000);

    let second = completed(run_batch(&cfg, &mut renderer, None).await.unwrap());
    assert_eq!(second.downloaded(), 0);
    assert_eq!(second.already_present(), 2);
    assert_eq!(second.bytes_written(), 0);
    assert_eq!(server.total_hits(), 2);
}

#[tokio::test]
async fn missing_input_ends_run_cleanly() {
    let root = tempdir().unwrap();
    let cfg = settings(root.path());
    let renderer = StaticRenderer::new(vec![]);
    let renders = renderer.renders.clone();
    let shut_down = renderer.shut_down.clone();
    let mut renderer: Box<dyn Renderer> = Box::new(renderer);

    let (tx, mut rx) = mpsc::channel(4);
    let report = run_batch(&cfg, renderer.as_mut(), Some(&tx)).await.unwrap();
    renderer.shutdown().await.unwrap();

    assert_eq!(
        report,
        RunReport::MissingInput {
            path: cfg.input_file.clone()
        }
    );
    assert_eq!(
        rx.recv().await,
        Some(RunEvent::MissingInput {
            path: cfg.input_file.clone()
        })
    );
    assert_eq!(renders.load(Ordering::SeqCst), 0);
    assert!(shut_down.load(Ordering::SeqCst));
    assert!(!cfg.output_dir.exists());
}

#[tokio::test]
async fn failures_stay_local() {
    let server = media_server::start(vec![
        ("/b/ok.webm", Route::Body(vec![7u8; 1500])),
        ("/b/bad.webm", Route::Status(500)),
    ]);
    let root = tempdir().unwrap();
    let cfg = settings(root.path());
    std::fs::write(&cfg.input_file, "unreachable\nnotitle\n").unwrap();
    let mut renderer = StaticRenderer::new(vec![(
        "notitle",
        thread_html(None, &[server.url("/b/bad.webm").as_str(), server.url("/b/ok.webm").as_str()]),
    )]);

    let summary = completed(run_batch(&cfg, &mut renderer, None).await.unwrap());

    assert!(matches!(
        summary.threads[0].status,
        ThreadStatus::RenderFailed { .. }
    ));
    let t = &summary.threads[1];
    assert_eq!(t.status, ThreadStatus::Processed);
    assert_eq!(t.title.as_deref(), Some("Untitled"));
    assert_eq!(summary.downloaded(), 1);
    assert_eq!(summary.failed(), 1);
    let failed = t
        .items
        .iter()
        .find(|i| i.url.ends_with("bad.webm"))
        .unwrap();
    assert!(matches!(
        &failed.status,
        ItemStatus::Failed { kind, .. } if kind == "http"
    ));
    assert_eq!(
        files_in(&cfg.output_dir.join("Untitled")),
        vec!["ok.webm"]
    );
}

#[tokio::test]
async fn dry_run_lists_without_downloading() {
    let server = media_server::start(vec![("/b/1.webm", Route::Body(vec![0u8; 100]))]);
    let root = tempdir().unwrap();
    let mut cfg = settings(root.path());
    cfg.dry_run = true;
    std::fs::write(&cfg.input_file, "t\n").unwrap();
    let mut renderer = StaticRenderer::new(vec![(
        "t",
        thread_html(Some("a - Dry - b"), &[server.url("/b/1.webm").as_str()]),
    )]);

    let summary = completed(run_batch(&cfg, &mut renderer, None).await.unwrap());

    assert_eq!(summary.media_found(), 1);
    assert_eq!(summary.threads[0].items[0].status, ItemStatus::Planned);
    assert_eq!(server.total_hits(), 0);
    assert!(!cfg.output_dir.exists());
}
