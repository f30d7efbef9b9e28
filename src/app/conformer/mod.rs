// Segment conformer - Fits a candidate clip into a segment slot

use std::sync::Arc;

use tracing::debug;

use crate::domain::model::*;
use crate::domain::rules::{CaptionLayout, CaptionStyle, RetimePlan};
use crate::error::{CueMixError, CueMixResult};
use crate::ports::{Layer, MediaEngine};

/// Turns a candidate into a drop-in replacement for one segment.
///
/// The result has the target's exact duration, the base video's size and
/// frame rate, and the cue text burned in over a backing box.
pub struct SegmentConformer<E: MediaEngine> {
    engine: Arc<E>,
    style: CaptionStyle,
}

impl<E: MediaEngine> SegmentConformer<E> {
    /// Create new conformer with injected media engine and caption style
    pub fn new(engine: Arc<E>, style: CaptionStyle) -> Self {
        Self { engine, style }
    }

    pub fn style(&self) -> &CaptionStyle {
        &self.style
    }

    /// Conform `candidate` (already cropped to the target aspect) to `target`,
    /// windowed by the target's cue.
    ///
    /// Fails with [`CueMixError::ReplacementWindow`] when the candidate ends
    /// before the cue starts.
    pub fn conform(
        &self,
        candidate: &E::Clip,
        target: &Segment<E::Clip>,
        base: &VideoProperties,
    ) -> CueMixResult<Segment<E::Clip>> {
        let cue = &target.cue;
        let windowed = self.window(candidate, target.index, cue)?;
        let retimed = self.retime(windowed, target.duration())?;

        let conformed = self.engine.resample_fps(&retimed, base.fps)?;
        let conformed = self.engine.resize(&conformed, base.width, base.height)?;
        let captioned = self.caption(&conformed, &cue.text, base, target.duration())?;

        let actual = self.engine.duration_of(&captioned);
        if actual != target.duration() {
            return Err(CueMixError::media(format!(
                "Conformed segment {} lasts {} instead of {}",
                target.index,
                actual,
                target.duration()
            )));
        }

        Ok(target.with_content(captioned))
    }

    /// `[cue.start, min(cue.end, candidate end)]` of the candidate
    fn window(&self, candidate: &E::Clip, index: usize, cue: &Cue) -> CueMixResult<E::Clip> {
        let available = self.engine.duration_of(candidate);
        if cue.start >= available {
            return Err(CueMixError::ReplacementWindow {
                index,
                cue_start: cue.start,
                candidate_duration: available,
            });
        }
        let end = cue.end.min(available);
        self.engine.subrange(candidate, cue.start, end)
    }

    fn retime(&self, clip: E::Clip, target: Timestamp) -> CueMixResult<E::Clip> {
        let actual = self.engine.duration_of(&clip);
        match RetimePlan::for_durations(actual, target) {
            RetimePlan::PassThrough => Ok(clip),
            RetimePlan::Loop { target } => {
                debug!("Looping {} of footage to {}", actual, target);
                self.engine.loop_to_duration(&clip, target)
            }
            RetimePlan::Trim { target } => {
                debug!("Trimming {} of footage to {}", actual, target);
                self.engine.trim_to_duration(&clip, target)
            }
        }
    }

    /// Box then text over `clip`; blank text leaves the clip as is
    fn caption(
        &self,
        clip: &E::Clip,
        text: &str,
        frame: &VideoProperties,
        duration: Timestamp,
    ) -> CueMixResult<E::Clip> {
        let layout = CaptionLayout::compute(text, frame, &self.style);
        if layout.is_empty() {
            return Ok(clip.clone());
        }

        let max_width = CaptionLayout::max_width(frame.width, &self.style);
        let caption = self
            .engine
            .render_caption(text, max_width, &self.style, duration, frame.fps)?;
        let backing = layout.backing_box;
        let panel = self.engine.solid_box(
            backing.width,
            backing.height,
            &self.style.box_color,
            self.style.box_opacity,
            duration,
            frame.fps,
        )?;

        self.engine.overlay(
            clip,
            &[
                Layer::at(panel, backing.x, backing.y),
                Layer::at(caption, layout.text_block.x, layout.text_block.y),
            ],
        )
    }
}

#[cfg(test)]
mod tests;
