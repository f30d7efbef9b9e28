// Ports - Interface definitions (contracts)

use std::path::Path;

use crate::domain::model::*;
use crate::domain::rules::CaptionStyle;
use crate::error::CueMixResult;

/// Port for media file probing and analysis
pub trait ProbePort: Send + Sync {
    /// Probe media file and return its duration, geometry and stream layout
    fn probe(&self, path: &Path) -> CueMixResult<MediaInfo>;
}

/// Position of an overlay layer on its base, in pixels from the top-left corner
#[derive(Debug, Clone)]
pub struct Layer<C> {
    pub clip: C,
    pub x: u32,
    pub y: u32,
}

impl<C> Layer<C> {
    pub fn at(clip: C, x: u32, y: u32) -> Self {
        Self { clip, x, y }
    }
}

/// Encoder selection for a written artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codecs {
    pub video: String,
    pub audio: String,
}

impl Default for Codecs {
    fn default() -> Self {
        Self {
            video: "libx264".to_string(),
            audio: "aac".to_string(),
        }
    }
}

/// Port for the media engine.
///
/// Every operation returns a new clip; clips are never mutated in place.
/// Operations are blocking and may be called from worker threads.
pub trait MediaEngine: Send + Sync {
    type Clip: Clone + Send + Sync + std::fmt::Debug;

    fn load(&self, path: &Path) -> CueMixResult<Self::Clip>;

    fn duration_of(&self, clip: &Self::Clip) -> Timestamp;

    fn properties_of(&self, clip: &Self::Clip) -> VideoProperties;

    fn subrange(&self, clip: &Self::Clip, start: Timestamp, end: Timestamp)
        -> CueMixResult<Self::Clip>;

    /// Centered crop to the given aspect ratio
    fn crop_to_aspect(&self, clip: &Self::Clip, ratio: AspectRatio) -> CueMixResult<Self::Clip>;

    /// Non-aspect-preserving scale
    fn resize(&self, clip: &Self::Clip, width: u32, height: u32) -> CueMixResult<Self::Clip>;

    fn resample_fps(&self, clip: &Self::Clip, fps: f64) -> CueMixResult<Self::Clip>;

    /// Repeat the clip's content until it lasts exactly `duration`
    fn loop_to_duration(&self, clip: &Self::Clip, duration: Timestamp)
        -> CueMixResult<Self::Clip>;

    /// Keep the first `duration` of the clip
    fn trim_to_duration(&self, clip: &Self::Clip, duration: Timestamp)
        -> CueMixResult<Self::Clip>;

    /// Transparent layer holding word-wrapped caption text
    fn render_caption(
        &self,
        text: &str,
        max_width: u32,
        style: &CaptionStyle,
        duration: Timestamp,
        fps: f64,
    ) -> CueMixResult<Self::Clip>;

    /// Semi-transparent filled rectangle
    fn solid_box(
        &self,
        width: u32,
        height: u32,
        color: &str,
        opacity: f64,
        duration: Timestamp,
        fps: f64,
    ) -> CueMixResult<Self::Clip>;

    /// Composite layers over a base, in order; output keeps the base's duration
    fn overlay(&self, base: &Self::Clip, layers: &[Layer<Self::Clip>])
        -> CueMixResult<Self::Clip>;

    fn concatenate(&self, clips: &[Self::Clip]) -> CueMixResult<Self::Clip>;

    fn strip_audio(&self, clip: &Self::Clip) -> CueMixResult<Self::Clip>;

    /// Audio track of a loaded clip
    fn audio_of(&self, clip: &Self::Clip) -> CueMixResult<Self::Clip>;

    fn mux_audio(&self, video: &Self::Clip, audio: &Self::Clip) -> CueMixResult<Self::Clip>;

    fn write(&self, clip: &Self::Clip, path: &Path, codecs: &Codecs) -> CueMixResult<()>;
}

/// Port for the transcript-to-audio alignment tool
pub trait Aligner: Send + Sync {
    /// Produce timed cues for a plain-text transcript spoken in `audio`
    fn align(&self, transcript: &Path, audio: &Path, work_dir: &Path) -> CueMixResult<Vec<Cue>>;
}
