//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

/// Inputs shared by `render` and `plan`
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Replacement asset root holding one folder per 1-based segment number
    #[arg(long, value_name = "DIR")]
    pub input_clips: PathBuf,

    /// Base video to recompose
    #[arg(long, value_name = "FILE")]
    pub input_video: PathBuf,

    /// Narration audio to align the transcript against; the aligned cues are
    /// saved as <transcript>_with_timestamps.srt
    #[arg(long, value_name = "FILE", requires = "input_txt", conflicts_with = "cues")]
    pub input_audio: Option<PathBuf>,

    /// Plain-text transcript
    #[arg(long, value_name = "FILE", requires = "input_audio", conflicts_with = "cues")]
    pub input_txt: Option<PathBuf>,

    /// Existing cue file (.srt or .json sync map) instead of aligning
    #[arg(long, value_name = "FILE", required_unless_present = "input_audio")]
    pub cues: Option<PathBuf>,

    /// Crop candidates to this aspect ratio (W:H) instead of the base video's
    #[arg(long, value_name = "W:H")]
    pub aspect: Option<String>,
}

/// Arguments for the render command
#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Directory receiving output_variation_<n>.mp4 files
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Variants encoded at the same time
    #[arg(long, value_parser = parse_workers)]
    pub workers: Option<usize>,
}

/// Arguments for the plan command
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub inputs: InputArgs,

    /// Output format
    #[arg(long, value_enum, default_value_t = PlanFormat::Table)]
    pub format: PlanFormat,
}

/// Arguments for the align command
#[derive(Args, Debug, Clone)]
pub struct AlignArgs {
    /// Narration audio
    #[arg(long, value_name = "FILE")]
    pub input_audio: PathBuf,

    /// Plain-text transcript
    #[arg(long, value_name = "FILE")]
    pub input_txt: PathBuf,

    /// SRT destination, the only file written (default: <transcript>_with_timestamps.srt)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanFormat {
    Table,
    Json,
    Yaml,
}

fn parse_workers(value: &str) -> Result<usize, String> {
    clap_num::number_range(value, 1, 256)
}
