// Timeline assembler - Joins segments and reattaches the base audio

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::model::*;
use crate::error::{CueMixError, CueMixResult};
use crate::ports::MediaEngine;

pub struct TimelineAssembler<E: MediaEngine> {
    engine: Arc<E>,
}

impl<E: MediaEngine> TimelineAssembler<E> {
    /// Create new assembler with injected media engine
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// Concatenate `segments` in index order as video only, then mux
    /// `audio` cut to `[0, total duration]` as the sole audio track.
    pub fn assemble(
        &self,
        variant: usize,
        mut segments: Vec<Segment<E::Clip>>,
        audio: Option<&E::Clip>,
    ) -> CueMixResult<Timeline<E::Clip>> {
        if segments.is_empty() {
            return Err(CueMixError::invalid_input("Cannot assemble an empty timeline"));
        }
        segments.sort_by_key(|segment| segment.index);

        let silent = segments
            .iter()
            .map(|segment| self.engine.strip_audio(&segment.content))
            .collect::<CueMixResult<Vec<_>>>()?;
        let video = self.engine.concatenate(&silent)?;
        let duration: Timestamp = segments.iter().map(Segment::duration).sum();

        let (composed, audio) = match audio {
            Some(track) => {
                let available = self.engine.duration_of(track);
                let end = if duration > available {
                    warn!(
                        "Audio track ({}) is shorter than variant {} ({})",
                        available,
                        variant + 1,
                        duration
                    );
                    available
                } else {
                    duration
                };
                let cut = self.engine.subrange(track, Timestamp::ZERO, end)?;
                (self.engine.mux_audio(&video, &cut)?, Some(cut))
            }
            None => (video, None),
        };

        debug!(
            "Assembled variant {} from {} segments ({})",
            variant + 1,
            segments.len(),
            duration
        );
        Ok(Timeline {
            variant,
            segments,
            audio,
            composed,
            duration,
        })
    }
}
