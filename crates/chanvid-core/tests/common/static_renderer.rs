//! Renderer serving canned HTML by address, for driver tests.

use anyhow::Result;
use async_trait::async_trait;
use chanvid_core::page::HtmlPage;
use chanvid_core::render::Renderer;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
pub struct StaticRenderer {
    pages: HashMap<String, String>,
    pub renders: Arc<AtomicUsize>,
    pub shut_down: Arc<AtomicBool>,
}

impl StaticRenderer {
    pub fn new(pages: Vec<(&str, String)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(u, html)| (u.to_string(), html))
                .collect(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Renderer for StaticRenderer {
    async fn render(&mut self, url: &str) -> Result<HtmlPage> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url) {
            Some(html) => Ok(HtmlPage::parse(html)),
            None => anyhow::bail!("no page for {}", url),
        }
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        self.shut_down.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Thread page HTML with the given `<title>` (none when `None`) and anchors.
pub fn thread_html(title: Option<&str>, hrefs: &[&str]) -> String {
    let head = title
        .map(|t| format!("<title>{}</title>", t))
        .unwrap_or_default();
    let anchors: String = hrefs
        .iter()
        .map(|h| format!("<div class=\"file\"><a href=\"{}\">file</a></div>\n", h))
        .collect();
    format!(
        "<!DOCTYPE html><html><head>{}</head><body>{}</body></html>",
        head, anchors
    )
}
