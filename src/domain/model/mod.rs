// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{CueMixError, CueMixResult};

/// Point or span on the timeline with millisecond resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp { millis: 0 };

    /// Create a new Timestamp from milliseconds
    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    /// Create a new Timestamp from seconds, rounded to the nearest millisecond
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self::ZERO;
        }
        Self {
            millis: (seconds * 1000.0).round() as u64,
        }
    }

    /// Create a new Timestamp from hours, minutes, seconds, milliseconds
    pub fn from_components(hours: u64, minutes: u64, seconds: u64, milliseconds: u64) -> Self {
        Self {
            millis: ((hours * 60 + minutes) * 60 + seconds) * 1000 + milliseconds,
        }
    }

    pub fn as_millis(&self) -> u64 {
        self.millis
    }

    pub fn as_seconds(&self) -> f64 {
        self.millis as f64 / 1000.0
    }

    pub fn is_zero(&self) -> bool {
        self.millis == 0
    }

    /// Difference clamped at zero
    pub fn saturating_sub(self, other: Timestamp) -> Timestamp {
        Timestamp::from_millis(self.millis.saturating_sub(other.millis))
    }

    fn components(&self) -> (u64, u64, u64, u64) {
        let ms = self.millis % 1000;
        let total_seconds = self.millis / 1000;
        (
            total_seconds / 3600,
            (total_seconds % 3600) / 60,
            total_seconds % 60,
            ms,
        )
    }

    /// Format as SubRip time `HH:MM:SS,mmm`
    pub fn format_srt(&self) -> String {
        let (h, m, s, ms) = self.components();
        format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s, ms) = self.components();
        write!(f, "{:02}:{:02}:{:02}.{:03}", h, m, s, ms)
    }
}

impl Add for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Timestamp) -> Timestamp {
        Timestamp::from_millis(self.millis + rhs.millis)
    }
}

impl Sub for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Timestamp) -> Timestamp {
        self.saturating_sub(rhs)
    }
}

impl Sum for Timestamp {
    fn sum<I: Iterator<Item = Timestamp>>(iter: I) -> Self {
        iter.fold(Timestamp::ZERO, Add::add)
    }
}

/// A timed caption interval with its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub start: Timestamp,
    pub end: Timestamp,
    pub text: String,
}

impl Cue {
    pub fn new(start: Timestamp, end: Timestamp, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn duration(&self) -> Timestamp {
        self.end - self.start
    }
}

/// Geometry and frame rate a replacement must conform to
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl VideoProperties {
    pub fn new(width: u32, height: u32, fps: f64) -> CueMixResult<Self> {
        if width == 0 || height == 0 {
            return Err(CueMixError::invalid_input("Video dimensions cannot be zero"));
        }
        if !(fps > 0.0) {
            return Err(CueMixError::invalid_input("Frame rate must be positive"));
        }
        Ok(Self { width, height, fps })
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Target width:height ratio used to crop candidates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    pub fn new(width: u32, height: u32) -> CueMixResult<Self> {
        if width == 0 || height == 0 {
            return Err(CueMixError::invalid_input(
                "Aspect ratio terms must be positive",
            ));
        }
        Ok(Self { width, height })
    }

    /// Parse `W:H` (e.g. `4:5`)
    pub fn parse(value: &str) -> CueMixResult<Self> {
        let (w, h) = value.trim().split_once(':').ok_or_else(|| {
            CueMixError::invalid_input(format!("Invalid aspect ratio '{}', expected W:H", value))
        })?;
        let parse = |term: &str| {
            term.trim().parse::<u32>().map_err(|_| {
                CueMixError::invalid_input(format!("Invalid aspect ratio term '{}'", term))
            })
        };
        Self::new(parse(w)?, parse(h)?)
    }

    pub fn of(properties: &VideoProperties) -> Self {
        Self {
            width: properties.width,
            height: properties.height,
        }
    }

    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Probed facts about a media file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub duration: Timestamp,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub has_audio: bool,
}

impl MediaInfo {
    pub fn properties(&self) -> CueMixResult<VideoProperties> {
        VideoProperties::new(self.width, self.height, self.fps)
    }
}

/// A contiguous slice of the base timeline bounded by cue timestamps
#[derive(Debug, Clone)]
pub struct Segment<C> {
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
    pub content: C,
    pub cue: Cue,
}

impl<C> Segment<C> {
    pub fn duration(&self) -> Timestamp {
        self.end - self.start
    }

    /// Same slot, different footage
    pub fn with_content(&self, content: C) -> Segment<C> {
        Segment {
            index: self.index,
            start: self.start,
            end: self.end,
            content,
            cue: self.cue.clone(),
        }
    }
}

/// Replacement clip discovered under a segment-indexed asset directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub path: PathBuf,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Ordered candidates per 0-based segment index
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct CandidatePools {
    pools: BTreeMap<usize, Vec<Candidate>>,
}

impl CandidatePools {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize, candidates: Vec<Candidate>) {
        self.pools.insert(index, candidates);
    }

    pub fn get(&self, index: usize) -> Option<&[Candidate]> {
        self.pools.get(&index).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Candidate])> {
        self.pools.iter().map(|(i, c)| (*i, c.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_pool_size() == 0
    }

    /// Largest pool size across all segment indices
    pub fn max_pool_size(&self) -> usize {
        self.pools.values().map(Vec::len).max().unwrap_or(0)
    }
}

impl FromIterator<(usize, Vec<Candidate>)> for CandidatePools {
    fn from_iter<T: IntoIterator<Item = (usize, Vec<Candidate>)>>(iter: T) -> Self {
        Self {
            pools: iter.into_iter().collect(),
        }
    }
}

/// Segment index -> chosen candidate for one variant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariantAssignment {
    pub variant: usize,
    pub picks: BTreeMap<usize, Candidate>,
}

impl VariantAssignment {
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }
}

/// One assembled alternate cut, ready to be written
#[derive(Debug, Clone)]
pub struct Timeline<C> {
    pub variant: usize,
    pub segments: Vec<Segment<C>>,
    /// Reattached audio, absent when the base video has none
    pub audio: Option<C>,
    /// Concatenated video with the audio muxed in
    pub composed: C,
    pub duration: Timestamp,
}

/// File name of the n-th output (1-based on disk)
pub fn variant_file_name(variant: usize) -> String {
    format!("output_variation_{}.mp4", variant + 1)
}

#[cfg(test)]
mod tests;
