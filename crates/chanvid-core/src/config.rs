use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::pacing::DelayRange;

/// Pacing delays (optional section in config.toml).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayConfig {
    /// Pause after a page is rendered, before it is inspected.
    pub settle: DelayRange,
    /// Pause after each media download on the same page.
    pub item: DelayRange,
    /// Pause after each thread, before the next page.
    pub thread: DelayRange,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            settle: DelayRange::new(2.0, 4.0),
            item: DelayRange::new(2.0, 5.0),
            thread: DelayRange::new(5.0, 22.0),
        }
    }
}

impl DelayConfig {
    /// All delays disabled (tests, `--no-delay`).
    pub fn none() -> Self {
        Self {
            settle: DelayRange::ZERO,
            item: DelayRange::ZERO,
            thread: DelayRange::ZERO,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.settle.validate().context("delays.settle")?;
        self.item.validate().context("delays.item")?;
        self.thread.validate().context("delays.thread")?;
        Ok(())
    }
}

/// Page renderer backend: plain HTTP GET (libcurl) or headless Chromium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    #[default]
    Http,
    Browser,
}

impl std::str::FromStr for RendererKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(RendererKind::Http),
            "browser" | "chromium" => Ok(RendererKind::Browser),
            other => anyhow::bail!("unknown renderer {:?} (expected \"http\" or \"browser\")", other),
        }
    }
}

/// Global configuration loaded from `~/.config/chanvid/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChanvidConfig {
    /// Text file with one thread URL per line (relative to the working directory).
    pub input_file: PathBuf,
    /// Base directory; each thread gets a subfolder named after its title.
    pub output_dir: PathBuf,
    /// Backend used to render thread pages.
    #[serde(default)]
    pub renderer: RendererKind,
    /// Receive buffer size for media downloads, in bytes.
    pub chunk_size: usize,
    /// Write downloads to `<name>.part` and rename on success. When false, bytes go
    /// straight to the final name and an interrupted download is kept as-is.
    pub atomic_writes: bool,
    /// Connection timeout for page and media requests (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Abort a transfer that stays under 1 KiB/s for this long (None = never).
    #[serde(default)]
    pub low_speed_timeout_secs: Option<u64>,
    /// Optional User-Agent header for page and media requests.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Optional pacing delays; if missing, built-in defaults are used.
    #[serde(default)]
    pub delays: Option<DelayConfig>,
}

impl Default for ChanvidConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("thread_urls.txt"),
            output_dir: PathBuf::from("downloads"),
            renderer: RendererKind::Http,
            chunk_size: 1024,
            atomic_writes: true,
            connect_timeout_secs: Some(30),
            low_speed_timeout_secs: Some(120),
            user_agent: None,
            delays: None,
        }
    }
}

impl ChanvidConfig {
    /// Effective delays: the `[delays]` section or the built-in defaults.
    pub fn delays(&self) -> DelayConfig {
        self.delays.unwrap_or_default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            anyhow::bail!("chunk_size must be greater than zero");
        }
        self.delays().validate()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chanvid")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ChanvidConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ChanvidConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ChanvidConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ChanvidConfig::default();
        assert_eq!(cfg.input_file, PathBuf::from("thread_urls.txt"));
        assert_eq!(cfg.output_dir, PathBuf::from("downloads"));
        assert_eq!(cfg.renderer, RendererKind::Http);
        assert_eq!(cfg.chunk_size, 1024);
        assert!(cfg.atomic_writes);
        let delays = cfg.delays();
        assert_eq!(delays.item, DelayRange::new(2.0, 5.0));
        assert_eq!(delays.thread, DelayRange::new(5.0, 22.0));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ChanvidConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ChanvidConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.input_file, cfg.input_file);
        assert_eq!(parsed.output_dir, cfg.output_dir);
        assert_eq!(parsed.chunk_size, cfg.chunk_size);
        assert_eq!(parsed.atomic_writes, cfg.atomic_writes);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            input_file = "lists/wsg.txt"
            output_dir = "/srv/videos"
            renderer = "browser"
            chunk_size = 4096
            atomic_writes = false

            [delays]
            settle = { min_secs = 0.0, max_secs = 0.0 }
            item = { min_secs = 1.0, max_secs = 1.5 }
            thread = { min_secs = 10.0, max_secs = 30.0 }
        "#;
        let cfg: ChanvidConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.input_file, PathBuf::from("lists/wsg.txt"));
        assert_eq!(cfg.renderer, RendererKind::Browser);
        assert_eq!(cfg.chunk_size, 4096);
        assert!(!cfg.atomic_writes);
        assert!(cfg.user_agent.is_none());
        let delays = cfg.delays();
        assert_eq!(delays.settle, DelayRange::ZERO);
        assert_eq!(delays.thread, DelayRange::new(10.0, 30.0));
        cfg.validate().unwrap();
    }

    #[test]
    fn inverted_delay_range_rejected() {
        let mut cfg = ChanvidConfig::default();
        cfg.delays = Some(DelayConfig {
            item: DelayRange::new(5.0, 2.0),
            ..DelayConfig::default()
        });
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.to_string(), "delays.item");
        assert!(format!("{err:#}").contains("greater than max_secs"));
    }

    #[test]
    fn renderer_kind_from_str() {
        assert_eq!("http".parse::<RendererKind>().unwrap(), RendererKind::Http);
        assert_eq!("Browser".parse::<RendererKind>().unwrap(), RendererKind::Browser);
        assert_eq!("chromium".parse::<RendererKind>().unwrap(), RendererKind::Browser);
        assert!("selenium".parse::<RendererKind>().is_err());
    }
}
