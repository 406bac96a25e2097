//! Page rendering backends.
//!
//! A [`Renderer`] turns a thread address into a parsed [`HtmlPage`]. The batch
//! driver borrows one renderer for the whole run; whoever created it calls
//! [`Renderer::shutdown`] once the run is over.

#[cfg(feature = "browser")]
pub mod chromium;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{ChanvidConfig, RendererKind};
use crate::fetch::FetchOptions;
use crate::page::HtmlPage;

pub use http::HttpRenderer;

/// Something that can load a thread page and hand back its rendered DOM.
#[async_trait]
pub trait Renderer: Send {
    /// Navigate to `url` and return the parsed page.
    async fn render(&mut self, url: &str) -> Result<HtmlPage>;
    /// Release the backend (browser process, connections). Called once, at the end of a run.
    async fn shutdown(self: Box<Self>) -> Result<()>;
    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the renderer selected in the configuration.
pub async fn from_config(kind: RendererKind, cfg: &ChanvidConfig) -> Result<Box<dyn Renderer>> {
    match kind {
        RendererKind::Http => Ok(Box::new(HttpRenderer::new(FetchOptions::from(cfg)))),
        #[cfg(feature = "browser")]
        RendererKind::Browser => Ok(Box::new(chromium::ChromiumRenderer::launch().await?)),
        #[cfg(not(feature = "browser"))]
        RendererKind::Browser => anyhow::bail!(
            "browser renderer not available: rebuild with `--features browser` or set renderer = \"http\""
        ),
    }
}
