//! `chanvid inspect` – render one thread and show what a run would do with it.

use anyhow::Result;
use chanvid_core::config::{ChanvidConfig, RendererKind};
use chanvid_core::media::extract_media_links;
use chanvid_core::render;
use chanvid_core::title::thread_title;

pub async fn run_inspect(cfg: &ChanvidConfig, url: &str, kind: RendererKind) -> Result<()> {
    let mut renderer = render::from_config(kind, cfg).await?;
    let rendered = renderer.render(url).await;
    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("renderer shutdown failed: {:#}", e);
    }
    let page = rendered?;

    let title = thread_title(&page);
    let mut links: Vec<String> = extract_media_links(&page).into_iter().collect();
    links.sort();

    println!("Title:  {}", title);
    println!("Folder: {}", cfg.output_dir.join(&title).display());
    if links.is_empty() {
        println!("No videos found.");
    } else {
        println!("{} video(s):", links.len());
        for link in links {
            println!("  {}", link);
        }
    }
    Ok(())
}
