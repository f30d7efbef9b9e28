// Recompose interactor - Orchestrates a full recomposition run

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::adapters::aeneas_align::timestamps_srt_path;
use crate::adapters::toml_config::CueMixConfig;
use crate::app::assembler::TimelineAssembler;
use crate::app::conformer::SegmentConformer;
use crate::app::pool_builder::PoolBuilder;
use crate::app::segmenter::Segmenter;
use crate::app::variant_driver::{BaseCut, VariantDriver, VariantOutcome};
use crate::cues::{load_cue_file, srt};
use crate::domain::model::*;
use crate::domain::rules::VariantPairing;
use crate::error::{CueMixError, CueMixResult};
use crate::ports::{Aligner, MediaEngine};

/// Run manifest written next to the outputs
pub const REPORT_FILE: &str = "cuemix_report.json";

/// Where the cue sequence comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueSource {
    /// Force-align a plain transcript against an audio track
    Align { transcript: PathBuf, audio: PathBuf },
    /// Read an existing `.srt` or `.json` sync map
    File(PathBuf),
}

/// Inputs of a recomposition run
#[derive(Debug, Clone)]
pub struct RecomposeRequest {
    pub asset_root: PathBuf,
    pub base_video: PathBuf,
    pub cues: CueSource,
    pub output_dir: PathBuf,
}

/// Everything decided before any pixels are produced
#[derive(Debug)]
pub struct RecomposePlan<C> {
    pub cues: Vec<Cue>,
    pub base: BaseCut<C>,
    pub pools: CandidatePools,
    pub assignments: Vec<VariantAssignment>,
}

impl<C> RecomposePlan<C> {
    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            segments: self
                .base
                .segments
                .iter()
                .map(|segment| SegmentSummary {
                    segment: segment.index + 1,
                    start_ms: segment.start,
                    end_ms: segment.end,
                    duration_ms: segment.duration(),
                    text: segment.cue.text.clone(),
                })
                .collect(),
            variants: self
                .assignments
                .iter()
                .map(|assignment| VariantSummary {
                    variant: assignment.variant + 1,
                    output: variant_file_name(assignment.variant),
                    picks: assignment
                        .picks
                        .iter()
                        .map(|(index, candidate)| (index + 1, candidate.path.clone()))
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Printable view of a plan
#[derive(Debug, Clone, Serialize)]
pub struct PlanSummary {
    pub segments: Vec<SegmentSummary>,
    pub variants: Vec<VariantSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub segment: usize,
    pub start_ms: Timestamp,
    pub end_ms: Timestamp,
    pub duration_ms: Timestamp,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VariantSummary {
    pub variant: usize,
    pub output: String,
    /// 1-based segment number -> candidate file
    pub picks: BTreeMap<usize, PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantStatus {
    Written,
    Failed,
}

/// Per-variant entry of the run manifest
#[derive(Debug, Clone, Serialize)]
pub struct VariantReport {
    pub variant: usize,
    pub status: VariantStatus,
    pub output: Option<PathBuf>,
    pub duration_ms: Option<Timestamp>,
    pub replaced_segments: Vec<usize>,
    pub warnings: Vec<String>,
    pub error: Option<String>,
}

/// Run manifest
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub base_video: PathBuf,
    pub cue_count: usize,
    pub variant_count: usize,
    pub variants: Vec<VariantReport>,
}

impl RunReport {
    pub fn written(&self) -> usize {
        self.variants
            .iter()
            .filter(|v| v.status == VariantStatus::Written)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.variants.len() - self.written()
    }

    pub fn write_to(&self, dir: &Path) -> CueMixResult<PathBuf> {
        let path = dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CueMixError::invalid_input(format!("Failed to serialize report: {}", e)))?;
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

/// Interactor for the recomposition use case
pub struct RecomposeInteractor<E: MediaEngine, A: Aligner> {
    engine: Arc<E>,
    aligner: Arc<A>,
    config: CueMixConfig,
}

impl<E, A> RecomposeInteractor<E, A>
where
    E: MediaEngine + 'static,
    E::Clip: 'static,
    A: Aligner,
{
    /// Create new recompose interactor with injected ports
    pub fn new(engine: Arc<E>, aligner: Arc<A>, config: CueMixConfig) -> Self {
        Self {
            engine,
            aligner,
            config,
        }
    }

    pub fn config(&self) -> &CueMixConfig {
        &self.config
    }

    /// Check every shared input before doing any work
    pub fn validate(&self, request: &RecomposeRequest) -> CueMixResult<()> {
        if !request.base_video.is_file() {
            return Err(CueMixError::invalid_input(format!(
                "Input video not found: {}",
                request.base_video.display()
            )));
        }
        if !request.asset_root.is_dir() {
            return Err(CueMixError::AssetRootNotFound {
                path: request.asset_root.display().to_string(),
            });
        }
        let cue_inputs: Vec<(&str, &Path)> = match &request.cues {
            CueSource::Align { transcript, audio } => {
                vec![("Transcript", transcript.as_path()), ("Audio", audio.as_path())]
            }
            CueSource::File(path) => vec![("Cue file", path.as_path())],
        };
        for (label, path) in cue_inputs {
            if !path.is_file() {
                return Err(CueMixError::invalid_input(format!(
                    "{} not found: {}",
                    label,
                    path.display()
                )));
            }
        }
        Ok(())
    }

    /// Produce the cue sequence, aligning if needed
    pub fn cues(&self, source: &CueSource) -> CueMixResult<Vec<Cue>> {
        let cues = match source {
            CueSource::File(path) => load_cue_file(path)?,
            CueSource::Align { transcript, audio } => {
                let work_dir = tempfile::Builder::new().prefix("cuemix-align-").tempdir()?;
                let cues = self.aligner.align(transcript, audio, work_dir.path())?;
                if !cues.is_empty() {
                    let srt_path = timestamps_srt_path(transcript);
                    std::fs::write(&srt_path, srt::write(&cues))?;
                    info!("Wrote aligned cues to {}", srt_path.display());
                }
                cues
            }
        };
        if cues.is_empty() {
            return Err(CueMixError::invalid_input("No cues to segment on"));
        }
        Ok(cues)
    }

    /// Everything up to, but not including, conforming and encoding
    pub fn prepare(&self, request: &RecomposeRequest) -> CueMixResult<RecomposePlan<E::Clip>> {
        self.validate(request)?;
        let cues = self.cues(&request.cues)?;

        let base = self.engine.load(&request.base_video)?;
        let properties = self.engine.properties_of(&base);
        info!(
            "Base video {}: {} at {}x{} {:.3} fps",
            request.base_video.display(),
            self.engine.duration_of(&base),
            properties.width,
            properties.height,
            properties.fps
        );

        let segments = Segmenter::new(Arc::clone(&self.engine)).segment(&base, &cues)?;
        let pools = PoolBuilder::from_config(&self.config.assets).build(&request.asset_root)?;

        let aspect = self
            .config
            .assets
            .aspect()?
            .unwrap_or_else(|| AspectRatio::of(&properties));
        let audio = match self.engine.audio_of(&base) {
            Ok(track) => Some(track),
            Err(e) => {
                warn!("Outputs will be silent: {}", e);
                None
            }
        };

        let assignments = VariantPairing::all(&pools);
        Ok(RecomposePlan {
            cues,
            base: BaseCut {
                segments,
                properties,
                aspect,
                audio,
            },
            pools,
            assignments,
        })
    }

    /// Full run: plan, build every variant, write them in parallel, then the manifest
    pub async fn execute(&self, request: &RecomposeRequest) -> CueMixResult<RunReport> {
        info!("Starting recomposition of {}", request.base_video.display());
        let plan = self.prepare(request)?;
        std::fs::create_dir_all(&request.output_dir)?;

        let driver = VariantDriver::new(
            Arc::clone(&self.engine),
            SegmentConformer::new(Arc::clone(&self.engine), self.config.caption.clone()),
            TimelineAssembler::new(Arc::clone(&self.engine)),
        );
        let outcomes = driver.run_all(&plan.base, &plan.pools)?;

        let mut written = self.write_all(&outcomes, &request.output_dir).await;
        let variants = outcomes
            .into_iter()
            .map(|outcome| Self::report_entry(outcome, &mut written))
            .collect::<Vec<_>>();

        let report = RunReport {
            generated_at: Utc::now(),
            base_video: request.base_video.clone(),
            cue_count: plan.cues.len(),
            variant_count: variants.len(),
            variants,
        };
        let manifest = report.write_to(&request.output_dir)?;
        info!(
            "Recomposition finished: {} written, {} failed, manifest {}",
            report.written(),
            report.failed(),
            manifest.display()
        );
        Ok(report)
    }

    /// Encode every assembled timeline, at most `workers` at a time
    async fn write_all(
        &self,
        outcomes: &[VariantOutcome<E::Clip>],
        output_dir: &Path,
    ) -> BTreeMap<usize, CueMixResult<PathBuf>> {
        let semaphore = Arc::new(Semaphore::new(self.config.render.workers.max(1)));
        let codecs = self.config.render.codecs();
        let mut writes = JoinSet::new();

        for outcome in outcomes {
            let Ok(timeline) = &outcome.timeline else {
                continue;
            };
            let variant = outcome.variant();
            let engine = Arc::clone(&self.engine);
            let semaphore = Arc::clone(&semaphore);
            let composed = timeline.composed.clone();
            let path = output_dir.join(variant_file_name(variant));
            let codecs = codecs.clone();

            writes.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => tokio::task::spawn_blocking(move || {
                        engine.write(&composed, &path, &codecs).map(|_| path)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        Err(CueMixError::media(format!("Writer task failed: {}", e)))
                    }),
                    Err(e) => Err(CueMixError::media(format!("Worker pool closed: {}", e))),
                };
                (variant, result)
            });
        }

        let mut results = BTreeMap::new();
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((variant, result)) => {
                    if let Err(e) = &result {
                        error!("Failed to write variant {}: {}", variant + 1, e);
                    }
                    results.insert(variant, result);
                }
                Err(e) => error!("Writer task aborted: {}", e),
            }
        }
        results
    }

    fn report_entry(
        outcome: VariantOutcome<E::Clip>,
        written: &mut BTreeMap<usize, CueMixResult<PathBuf>>,
    ) -> VariantReport {
        let variant = outcome.variant();
        let replaced_segments = outcome.replaced.iter().map(|index| index + 1).collect();
        let (status, output, duration_ms, error) = match outcome.timeline {
            Err(e) => (VariantStatus::Failed, None, None, Some(e.to_string())),
            Ok(timeline) => match written.remove(&variant) {
                Some(Ok(path)) => (VariantStatus::Written, Some(path), Some(timeline.duration), None),
                Some(Err(e)) => (VariantStatus::Failed, None, Some(timeline.duration), Some(e.to_string())),
                None => (
                    VariantStatus::Failed,
                    None,
                    Some(timeline.duration),
                    Some("Writer did not finish".to_string()),
                ),
            },
        };

        VariantReport {
            variant: variant + 1,
            status,
            output,
            duration_ms,
            replaced_segments,
            warnings: outcome.warnings,
            error,
        }
    }
}
