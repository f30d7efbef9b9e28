// Segmenter - Cuts the base video into cue-aligned segments

use std::sync::Arc;

use tracing::debug;

use crate::domain::model::*;
use crate::domain::rules::SegmentBounds;
use crate::error::CueMixResult;
use crate::ports::MediaEngine;

/// Splits a base clip at cue ends so that the pieces tile its timeline
pub struct Segmenter<E: MediaEngine> {
    engine: Arc<E>,
}

impl<E: MediaEngine> Segmenter<E> {
    /// Create new segmenter with injected media engine
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// One segment per cue. Segment `i` ends at cue `i`'s end and starts where
    /// segment `i-1` ended; the first starts at zero.
    pub fn segment(&self, base: &E::Clip, cues: &[Cue]) -> CueMixResult<Vec<Segment<E::Clip>>> {
        let slots = SegmentBounds::plan(cues)?;

        slots
            .into_iter()
            .zip(cues)
            .map(|(slot, cue)| {
                debug!(
                    "Segment {}: [{}, {}] \"{}\"",
                    slot.index, slot.start, slot.end, cue.text
                );
                let content = self.engine.subrange(base, slot.start, slot.end)?;
                Ok(Segment {
                    index: slot.index,
                    start: slot.start,
                    end: slot.end,
                    content,
                    cue: cue.clone(),
                })
            })
            .collect()
    }
}
