// Variant driver - Builds one timeline per positional candidate assignment

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::app::assembler::TimelineAssembler;
use crate::app::conformer::SegmentConformer;
use crate::domain::model::*;
use crate::domain::rules::VariantPairing;
use crate::error::{CueMixError, CueMixResult};
use crate::ports::MediaEngine;

/// Result of building one variant
#[derive(Debug)]
pub struct VariantOutcome<C> {
    pub assignment: VariantAssignment,
    /// Segment indices that actually received replacement footage
    pub replaced: Vec<usize>,
    /// Per-segment problems that degraded this variant without failing it
    pub warnings: Vec<String>,
    /// The assembled timeline, or the error that abandoned the variant
    pub timeline: Result<Timeline<C>, CueMixError>,
}

impl<C> VariantOutcome<C> {
    pub fn variant(&self) -> usize {
        self.assignment.variant
    }

    pub fn is_success(&self) -> bool {
        self.timeline.is_ok()
    }
}

/// Shared, read-only inputs for every variant of a run
#[derive(Debug, Clone)]
pub struct BaseCut<C> {
    pub segments: Vec<Segment<C>>,
    pub properties: VideoProperties,
    /// Crop target for candidates before conforming
    pub aspect: AspectRatio,
    pub audio: Option<C>,
}

pub struct VariantDriver<E: MediaEngine> {
    engine: Arc<E>,
    conformer: SegmentConformer<E>,
    assembler: TimelineAssembler<E>,
}

impl<E: MediaEngine> VariantDriver<E> {
    /// Create new driver with injected media engine and collaborators
    pub fn new(
        engine: Arc<E>,
        conformer: SegmentConformer<E>,
        assembler: TimelineAssembler<E>,
    ) -> Self {
        Self {
            engine,
            conformer,
            assembler,
        }
    }

    /// One outcome per variant, in increasing variant order.
    ///
    /// A media failure abandons only the variant it happened in. Errors that
    /// concern the shared inputs stop the run.
    pub fn run_all(
        &self,
        base: &BaseCut<E::Clip>,
        pools: &CandidatePools,
    ) -> CueMixResult<Vec<VariantOutcome<E::Clip>>> {
        let assignments = VariantPairing::all(pools);
        info!(
            "Building {} variants over {} segments",
            assignments.len(),
            base.segments.len()
        );

        let mut outcomes = Vec::with_capacity(assignments.len());
        for assignment in assignments {
            let outcome = self.run_variant(base, assignment);
            match outcome.timeline {
                Err(err) if err.is_fatal() => return Err(err),
                Err(ref err) => error!("Abandoning variant {}: {}", outcome.variant() + 1, err),
                Ok(_) => {}
            }
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Apply one assignment to a copy of the base segments and assemble it
    pub fn run_variant(
        &self,
        base: &BaseCut<E::Clip>,
        assignment: VariantAssignment,
    ) -> VariantOutcome<E::Clip> {
        let mut replaced = Vec::new();
        let mut warnings = Vec::new();
        let timeline = self
            .replace_segments(base, &assignment, &mut replaced, &mut warnings)
            .and_then(|segments| {
                self.assembler
                    .assemble(assignment.variant, segments, base.audio.as_ref())
            });

        VariantOutcome {
            assignment,
            replaced,
            warnings,
            timeline,
        }
    }

    fn replace_segments(
        &self,
        base: &BaseCut<E::Clip>,
        assignment: &VariantAssignment,
        replaced: &mut Vec<usize>,
        warnings: &mut Vec<String>,
    ) -> CueMixResult<Vec<Segment<E::Clip>>> {
        let variant = assignment.variant + 1;
        let mut segments = base.segments.clone();

        for (&index, candidate) in &assignment.picks {
            let Some(target) = segments.get(index) else {
                let message = format!(
                    "Pool {} has no matching segment (only {} cues); skipped",
                    index + 1,
                    base.segments.len()
                );
                warn!("Variant {}: {}", variant, message);
                warnings.push(message);
                continue;
            };

            let clip = self.engine.load(&candidate.path)?;
            let clip = self.engine.crop_to_aspect(&clip, base.aspect)?;

            match self.conformer.conform(&clip, target, &base.properties) {
                Ok(conformed) => {
                    info!(
                        "Variant {}: segment {} <- {}",
                        variant,
                        index + 1,
                        candidate.file_name()
                    );
                    segments[index] = conformed;
                    replaced.push(index);
                }
                Err(err @ CueMixError::ReplacementWindow { .. }) => {
                    error!(
                        "Variant {}: keeping original segment {} ({}): {}",
                        variant,
                        index + 1,
                        candidate.file_name(),
                        err
                    );
                    warnings.push(format!("{} ({})", err, candidate.file_name()));
                }
                Err(err) => return Err(err),
            }
        }

        Ok(segments)
    }
}
