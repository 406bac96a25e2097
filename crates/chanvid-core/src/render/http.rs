//! Plain HTTP renderer: fetches the server-side HTML with libcurl.
//!
//! Imageboard thread pages are rendered on the server, so a GET is enough
//! unless the site starts gating content behind client-side script.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::str;

use super::Renderer;
use crate::fetch::{configure_easy, FetchOptions};
use crate::page::HtmlPage;

/// Renderer backed by a single blocking libcurl GET per page.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    opts: FetchOptions,
}

impl HttpRenderer {
    pub fn new(opts: FetchOptions) -> Self {
        Self { opts }
    }
}

/// GET `url` and return the body as text (lossy UTF-8).
pub fn fetch_html(url: &str, opts: &FetchOptions) -> Result<String> {
    let mut body = Vec::new();
    let mut easy = curl::easy::Easy::new();
    configure_easy(&mut easy, url, opts).context("invalid URL")?;
    easy.accept_encoding("")?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&mut self, url: &str) -> Result<HtmlPage> {
        let url = url.to_string();
        let opts = self.opts.clone();
        let html = tokio::task::spawn_blocking(move || fetch_html(&url, &opts))
            .await
            .context("page fetch task panicked")??;
        Ok(HtmlPage::parse(&html))
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
