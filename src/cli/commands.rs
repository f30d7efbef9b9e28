//! Command implementations

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use crate::adapters::aeneas_align::timestamps_srt_path;
use crate::adapters::CueMixConfig;
use crate::app::container::DefaultAppContainer;
use crate::app::{CueSource, PlanSummary, RecomposeRequest, RunReport, VariantStatus};
use crate::cli::args::{AlignArgs, InputArgs, PlanArgs, PlanFormat, RenderArgs};
use crate::cues::srt;
use crate::domain::model::AspectRatio;
use crate::ports::Aligner;

/// Load configuration: file and environment layers, then CLI overrides
pub fn load_config(path: Option<&Path>) -> Result<CueMixConfig> {
    CueMixConfig::load(path).context("Failed to load configuration")
}

fn apply_input_overrides(config: &mut CueMixConfig, inputs: &InputArgs) -> Result<()> {
    if let Some(aspect) = &inputs.aspect {
        AspectRatio::parse(aspect).with_context(|| format!("Invalid --aspect '{}'", aspect))?;
        info!("CLI override: aspect_ratio = {}", aspect);
        config.assets.aspect_ratio = Some(aspect.clone());
    }
    Ok(())
}

/// Build a recomposition request from parsed inputs
pub fn build_request(inputs: &InputArgs, output_dir: PathBuf) -> Result<RecomposeRequest> {
    let cues = match (&inputs.cues, &inputs.input_txt, &inputs.input_audio) {
        (Some(path), _, _) => CueSource::File(path.clone()),
        (None, Some(transcript), Some(audio)) => CueSource::Align {
            transcript: transcript.clone(),
            audio: audio.clone(),
        },
        _ => bail!("Provide --cues, or both --input-audio and --input-txt"),
    };
    Ok(RecomposeRequest {
        asset_root: inputs.input_clips.clone(),
        base_video: inputs.input_video.clone(),
        cues,
        output_dir,
    })
}

/// Execute the render command
pub async fn render(mut config: CueMixConfig, args: RenderArgs) -> Result<()> {
    apply_input_overrides(&mut config, &args.inputs)?;
    if let Some(workers) = args.workers {
        info!("CLI override: workers = {}", workers);
        config.render.workers = workers;
    }

    let request = build_request(&args.inputs, args.output_dir.clone())?;
    let container = DefaultAppContainer::new(config).context("Failed to initialize")?;
    let report = container
        .recompose_interactor()
        .execute(&request)
        .await
        .context("Recomposition failed")?;

    println!("{}", format_report(&report));
    if report.failed() > 0 {
        warn!(
            "{} of {} variants failed; see the report for details",
            report.failed(),
            report.variant_count
        );
    }
    Ok(())
}

/// Execute the plan command
pub fn plan(mut config: CueMixConfig, args: PlanArgs) -> Result<()> {
    apply_input_overrides(&mut config, &args.inputs)?;

    let request = build_request(&args.inputs, PathBuf::from("."))?;
    let container = DefaultAppContainer::new(config).context("Failed to initialize")?;
    let plan = container
        .recompose_interactor()
        .prepare(&request)
        .context("Planning failed")?;

    let summary = plan.summary();
    let rendered = match args.format {
        PlanFormat::Table => format_plan_table(&summary),
        PlanFormat::Json => serde_json::to_string_pretty(&summary)?,
        PlanFormat::Yaml => serde_yaml::to_string(&summary)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Execute the align command
pub fn align(config: CueMixConfig, args: AlignArgs) -> Result<()> {
    let container = DefaultAppContainer::new(config).context("Failed to initialize")?;
    let work_dir = tempfile::Builder::new()
        .prefix("cuemix-align-")
        .tempdir()
        .context("Failed to create alignment work directory")?;

    let cues = container
        .aligner()
        .align(&args.input_txt, &args.input_audio, work_dir.path())
        .context("Alignment failed")?;

    let destination = args
        .output
        .unwrap_or_else(|| timestamps_srt_path(&args.input_txt));
    std::fs::write(&destination, srt::write(&cues))
        .with_context(|| format!("Failed to write {}", destination.display()))?;
    println!("Aligned {} cues -> {}", cues.len(), destination.display());
    Ok(())
}

pub fn format_plan_table(summary: &PlanSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:>13} {:>13} {:>10}  TEXT", "SEGMENT", "START", "END", "LENGTH");
    for segment in &summary.segments {
        let _ = writeln!(
            out,
            "{:<8} {:>13} {:>13} {:>9.3}s  {}",
            segment.segment,
            segment.start_ms.to_string(),
            segment.end_ms.to_string(),
            segment.duration_ms.as_seconds(),
            segment.text
        );
    }
    let _ = writeln!(out);
    for variant in &summary.variants {
        let _ = writeln!(out, "{}", variant.output);
        if variant.picks.is_empty() {
            let _ = writeln!(out, "  (base video unchanged)");
        }
        for (segment, path) in &variant.picks {
            let _ = writeln!(out, "  segment {:<4} <- {}", segment, path.display());
        }
    }
    out
}

pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    for variant in &report.variants {
        let status = match variant.status {
            VariantStatus::Written => "ok",
            VariantStatus::Failed => "FAILED",
        };
        let target = variant
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .or_else(|| variant.error.clone())
            .unwrap_or_default();
        let _ = writeln!(out, "variant {:<3} {:<6} {}", variant.variant, status, target);
        for warning in &variant.warnings {
            let _ = writeln!(out, "    warning: {}", warning);
        }
    }
    let _ = write!(
        out,
        "{} of {} variants written",
        report.written(),
        report.variant_count
    );
    out
}
