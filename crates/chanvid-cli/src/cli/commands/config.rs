//! `chanvid config` – show where the config lives and what is in effect.

use anyhow::Result;
use chanvid_core::config::{self, ChanvidConfig};

pub fn run_config(cfg: &ChanvidConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    let mut effective = cfg.clone();
    effective.delays = Some(cfg.delays());
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
