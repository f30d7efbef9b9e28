// Domain rules - Segmentation, pairing, retiming and caption layout policies

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::model::*;
use crate::error::{CueMixError, CueMixResult};

/// Timeline slot a segment will occupy, before any footage is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSlot {
    pub index: usize,
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Business rules for cutting the base timeline at cue boundaries
pub struct SegmentBounds;

impl SegmentBounds {
    /// Compute contiguous slots from a cue sequence.
    ///
    /// Slot `i` ends where cue `i` ends and starts where slot `i-1` ended, so
    /// silence between two cues belongs to the earlier slot.
    pub fn plan(cues: &[Cue]) -> CueMixResult<Vec<SegmentSlot>> {
        if cues.is_empty() {
            return Err(CueMixError::invalid_input("Cue sequence is empty"));
        }

        let mut slots = Vec::with_capacity(cues.len());
        let mut running_start = Timestamp::ZERO;

        for (index, cue) in cues.iter().enumerate() {
            if cue.end <= cue.start {
                return Err(CueMixError::invalid_input(format!(
                    "Cue {} ends ({}) at or before it starts ({})",
                    index + 1,
                    cue.end,
                    cue.start
                )));
            }
            if cue.end <= running_start {
                return Err(CueMixError::invalid_input(format!(
                    "Cue {} ends at {} which is not after the previous cue end {}",
                    index + 1,
                    cue.end,
                    running_start
                )));
            }

            slots.push(SegmentSlot {
                index,
                start: running_start,
                end: cue.end,
            });
            running_start = cue.end;
        }

        Ok(slots)
    }
}

/// Business rules for pairing candidates across pools
pub struct VariantPairing;

impl VariantPairing {
    /// Number of variants a run produces; an empty pool set still yields the base cut
    pub fn variant_count(pools: &CandidatePools) -> usize {
        pools.max_pool_size().max(1)
    }

    /// Positional pick: the `variant`-th candidate of every pool large enough to have one
    pub fn assignment(pools: &CandidatePools, variant: usize) -> VariantAssignment {
        let picks: BTreeMap<usize, Candidate> = pools
            .iter()
            .filter_map(|(index, candidates)| {
                candidates
                    .get(variant)
                    .map(|candidate| (index, candidate.clone()))
            })
            .collect();

        VariantAssignment { variant, picks }
    }

    /// Assignments for every variant, in increasing variant order
    pub fn all(pools: &CandidatePools) -> Vec<VariantAssignment> {
        (0..Self::variant_count(pools))
            .map(|variant| Self::assignment(pools, variant))
            .collect()
    }
}

/// How a windowed replacement is brought to its slot length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetimePlan {
    PassThrough,
    Loop { target: Timestamp },
    Trim { target: Timestamp },
}

impl RetimePlan {
    pub fn for_durations(actual: Timestamp, target: Timestamp) -> Self {
        match actual.cmp(&target) {
            std::cmp::Ordering::Less => RetimePlan::Loop { target },
            std::cmp::Ordering::Greater => RetimePlan::Trim { target },
            std::cmp::Ordering::Equal => RetimePlan::PassThrough,
        }
    }
}

/// Caption appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionStyle {
    pub font: String,
    pub font_size: u32,
    pub color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    pub margin: u32,
    pub box_color: String,
    pub box_opacity: f64,
    /// Estimated glyph advance as a fraction of the font size
    pub glyph_width_ratio: f64,
    pub line_spacing: f64,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            font: "Montserrat-SemiBold".to_string(),
            font_size: 33,
            color: "white".to_string(),
            stroke_color: "white".to_string(),
            stroke_width: 1,
            margin: 20,
            box_color: "black".to_string(),
            box_opacity: 0.7,
            glyph_width_ratio: 0.55,
            line_spacing: 1.2,
        }
    }
}

impl CaptionStyle {
    pub fn validate(&self) -> CueMixResult<()> {
        if self.font_size == 0 {
            return Err(CueMixError::config("Caption font size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.box_opacity) {
            return Err(CueMixError::config(
                "Caption box opacity must be between 0 and 1",
            ));
        }
        if !(self.glyph_width_ratio > 0.0) || !(self.line_spacing > 0.0) {
            return Err(CueMixError::config(
                "Caption glyph width ratio and line spacing must be positive",
            ));
        }
        Ok(())
    }

    pub fn line_height(&self) -> u32 {
        (self.font_size as f64 * self.line_spacing).ceil() as u32
    }

    fn glyph_width(&self) -> f64 {
        self.font_size as f64 * self.glyph_width_ratio
    }
}

/// Pixel rectangle within a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where a caption and its backing box land on a frame
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLayout {
    pub lines: Vec<String>,
    pub text_block: Rect,
    pub backing_box: Rect,
}

impl CaptionLayout {
    /// Widest column a caption may occupy on a frame of `frame_width`
    pub fn max_width(frame_width: u32, style: &CaptionStyle) -> u32 {
        frame_width.saturating_sub(2 * style.margin).max(1)
    }

    /// Greedy word wrap against an estimated glyph width; explicit newlines are kept
    pub fn wrap(text: &str, max_width: u32, style: &CaptionStyle) -> Vec<String> {
        let max_chars = ((max_width as f64 / style.glyph_width()).floor() as usize).max(1);
        let mut lines = Vec::new();

        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let needed = if current.is_empty() {
                    word.chars().count()
                } else {
                    current.chars().count() + 1 + word.chars().count()
                };
                if needed > max_chars && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.push_str(word);
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }

        lines
    }

    /// Size of the rendered text block for already wrapped lines
    pub fn block_size(lines: &[String], max_width: u32, style: &CaptionStyle) -> (u32, u32) {
        (max_width, lines.len() as u32 * style.line_height())
    }

    /// Full layout for a caption on a frame
    pub fn compute(text: &str, frame: &VideoProperties, style: &CaptionStyle) -> Self {
        let max_width = Self::max_width(frame.width, style);
        let lines = Self::wrap(text, max_width, style);
        let (block_width, block_height) = Self::block_size(&lines, max_width, style);
        Self::place(lines, block_width, block_height, frame, style)
    }

    /// Anchor a rendered block and its box to the bottom of the frame
    pub fn place(
        lines: Vec<String>,
        block_width: u32,
        block_height: u32,
        frame: &VideoProperties,
        style: &CaptionStyle,
    ) -> Self {
        let box_width = block_width;
        let box_height = block_height + style.margin;
        let box_y = frame.height.saturating_sub(box_height + style.margin);
        let box_x = frame.width.saturating_sub(box_width) / 2;

        let text_x = frame.width.saturating_sub(block_width) / 2;
        let text_y = box_y + (box_height - block_height) / 2;

        Self {
            lines,
            text_block: Rect {
                x: text_x,
                y: text_y,
                width: block_width,
                height: block_height,
            },
            backing_box: Rect {
                x: box_x,
                y: box_y,
                width: box_width,
                height: box_height,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
