//! Headless Chromium renderer using chromiumoxide.
//!
//! One browser and one tab live for the whole run; every thread is loaded in
//! the same tab so cookies and session state carry over between pages.

use super::Renderer;
use crate::page::HtmlPage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;

/// Locate a Chromium/Chrome binary: `CHANVID_CHROMIUM_PATH`, then `PATH`.
pub fn find_chromium() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHANVID_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }
    let candidates = [
        "google-chrome",
        "google-chrome-stable",
        "chromium",
        "chromium-browser",
    ];
    let path_var = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path_var) {
        for name in candidates {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Chromium-backed renderer owning the browser process and its event handler task.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn launch() -> Result<Self> {
        let chrome_path = find_chromium()
            .context("Chromium not found; install it or set CHANVID_CHROMIUM_PATH")?;

        let config = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        tracing::info!("chromium renderer launched");
        Ok(Self {
            browser,
            handler,
            page: None,
        })
    }

    async fn tab(&mut self) -> Result<&Page> {
        if self.page.is_none() {
            let page = self
                .browser
                .new_page("about:blank")
                .await
                .context("failed to create new page")?;
            self.page = Some(page);
        }
        self.page.as_ref().context("browser tab missing")
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn render(&mut self, url: &str) -> Result<HtmlPage> {
        let page = self.tab().await?;
        page.goto(url)
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        let _ = page.wait_for_navigation().await;

        let result = page
            .evaluate("document.documentElement.outerHTML")
            .await
            .context("failed to get HTML")?;
        let html: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert HTML result: {e:?}"))?;

        Ok(HtmlPage::parse(&html))
    }

    async fn shutdown(mut self: Box<Self>) -> Result<()> {
        if let Some(page) = self.page.take() {
            let _ = page.close().await;
        }
        if let Err(e) = self.browser.close().await {
            tracing::warn!("browser close failed: {}", e);
        }
        let _ = self.browser.wait().await;
        self.handler.abort();
        tracing::info!("chromium renderer shut down");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
