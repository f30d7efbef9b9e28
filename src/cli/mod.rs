//! CLI module for CueMix
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::LogFormat;

pub mod args;
pub mod commands;

/// CueMix - Recompose a video by swapping cue-aligned segments
///
/// Cuts a base video at caption cue boundaries, fits replacement footage into
/// those slots with burned-in captions, and writes one output per variant.
#[derive(Parser, Debug)]
#[command(name = "cuemix")]
#[command(about = "CueMix - Cue-aligned video recomposition")]
#[command(version)]
pub struct Cli {
    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", env = "CUEMIX_LOG_LEVEL", global = true)]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, env = "CUEMIX_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Configuration file (default: ./cuemix.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render every variant to the output directory
    Render(args::RenderArgs),
    /// Show segments and variant assignments without encoding
    Plan(args::PlanArgs),
    /// Align a transcript to audio and write an SRT
    Align(args::AlignArgs),
}
