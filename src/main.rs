//! CueMix CLI
//!
//! Cuts a base video at caption cue boundaries and swaps selected segments
//! for replacement footage, producing one recomposed video per variant.
//!
//! # Usage
//!
//! ```bash
//! cuemix render --input-clips clips/ --input-video video.mp4 \
//!     --input-audio voice.mp3 --input-txt script.txt --output-dir out/
//! cuemix plan --input-clips clips/ --input-video video.mp4 --cues script.srt --format json
//! cuemix align --input-audio voice.mp3 --input-txt script.txt
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cuemix_cli::adapters::{init_logging, LogLevel};
use cuemix_cli::cli::{commands, Cli, Commands};

/// Main entry point for the CueMix CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<LogLevel>()?;
    init_logging(level, cli.log_format);

    info!("Starting CueMix {}", env!("CARGO_PKG_VERSION"));
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Render(args) => commands::render(config, args).await?,
        Commands::Plan(args) => commands::plan(config, args)?,
        Commands::Align(args) => commands::align(config, args)?,
    }

    info!("CueMix completed successfully");
    Ok(())
}
