//! CLI for chanvid.

mod commands;

use anyhow::Result;
use chanvid_core::config::{self, RendererKind};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_batch, run_config, run_inspect, RunArgs};

/// Top-level CLI for chanvid.
#[derive(Debug, Parser)]
#[command(name = "chanvid")]
#[command(about = "chanvid: download the videos posted in imageboard threads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Process every thread in the thread list and download its videos.
    Run {
        /// Thread list, one URL per line (default from config: thread_urls.txt).
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
        /// Base output directory (default from config: downloads).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
        /// Page renderer: "http" or "browser".
        #[arg(long, value_name = "KIND")]
        renderer: Option<RendererKind>,
        /// Only list titles and video links; download nothing.
        #[arg(long)]
        dry_run: bool,
        /// Disable all pacing delays.
        #[arg(long)]
        no_delay: bool,
        /// Write the run summary as JSON to this file.
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Render one thread and print its folder name and video links.
    Inspect {
        /// Thread URL.
        url: String,
        /// Page renderer: "http" or "browser".
        #[arg(long, value_name = "KIND")]
        renderer: Option<RendererKind>,
    },

    /// Show the config file location and effective settings.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run {
                input,
                output_dir,
                renderer,
                dry_run,
                no_delay,
                report,
            } => {
                let args = RunArgs {
                    input,
                    output_dir,
                    renderer,
                    dry_run,
                    no_delay,
                    report,
                };
                run_batch(&cfg, args).await?;
            }
            CliCommand::Inspect { url, renderer } => {
                run_inspect(&cfg, &url, renderer.unwrap_or(cfg.renderer)).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}
