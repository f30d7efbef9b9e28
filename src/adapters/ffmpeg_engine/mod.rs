//! FFmpeg media engine adapter
//!
//! Clips are immutable edit graphs. Every primitive returns a new node that
//! records the operation together with the exact duration, geometry and frame
//! rate of its output, so the recomposition logic can reason about timing
//! without decoding anything. Pixels are only touched in [`FfmpegEngine::write`],
//! which compiles the graph into a single ffmpeg `-filter_complex` run.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::{CaptionLayout, CaptionStyle, Rect};
use crate::error::{CueMixError, CueMixResult};
use crate::ports::{Codecs, Layer, MediaEngine, ProbePort};

pub mod graph;

pub use graph::{CompiledGraph, GraphCompiler};

/// Which elementary stream a clip carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

/// Operation recorded in the edit graph
#[derive(Debug)]
pub enum ClipNode {
    Source { path: PathBuf },
    Subrange { inner: FilterClip, start: Timestamp, end: Timestamp },
    Crop { inner: FilterClip, rect: Rect },
    Scale { inner: FilterClip },
    Fps { inner: FilterClip },
    Loop { inner: FilterClip },
    Trim { inner: FilterClip },
    Caption { lines: Vec<String>, style: CaptionStyle },
    SolidBox { color: String, opacity: f64 },
    Overlay { base: FilterClip, layers: Vec<Layer<FilterClip>> },
    Concat { parts: Vec<FilterClip> },
    StripAudio { inner: FilterClip },
    AudioOf { source: FilterClip },
    Mux { video: FilterClip, audio: FilterClip },
}

/// Handle to a node of the edit graph
#[derive(Debug, Clone)]
pub struct FilterClip {
    node: Arc<ClipNode>,
    kind: StreamKind,
    duration: Timestamp,
    properties: VideoProperties,
    has_audio: bool,
}

impl FilterClip {
    fn derive(&self, node: ClipNode) -> FilterClip {
        FilterClip {
            node: Arc::new(node),
            kind: self.kind,
            duration: self.duration,
            properties: self.properties,
            has_audio: self.has_audio,
        }
    }

    fn with_duration(mut self, duration: Timestamp) -> FilterClip {
        self.duration = duration;
        self
    }

    fn with_properties(mut self, properties: VideoProperties) -> FilterClip {
        self.properties = properties;
        self
    }

    pub fn node(&self) -> &ClipNode {
        &self.node
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn duration(&self) -> Timestamp {
        self.duration
    }

    pub fn properties(&self) -> VideoProperties {
        self.properties
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    fn require_video(&self, operation: &str) -> CueMixResult<()> {
        match self.kind {
            StreamKind::Video => Ok(()),
            StreamKind::Audio => Err(CueMixError::media(format!(
                "{} needs a video clip, got an audio track",
                operation
            ))),
        }
    }
}

/// Media engine backed by the ffmpeg command-line tool
pub struct FfmpegEngine<P: ProbePort> {
    probe: P,
    ffmpeg_binary: PathBuf,
}

impl<P: ProbePort> FfmpegEngine<P> {
    /// Create new engine that probes with `probe` and encodes with `ffmpeg_binary`
    pub fn new(probe: P, ffmpeg_binary: impl Into<PathBuf>) -> Self {
        Self {
            probe,
            ffmpeg_binary: ffmpeg_binary.into(),
        }
    }

    /// Build the full ffmpeg argument list for writing `clip` to `output`
    pub fn command_args(
        &self,
        compiled: &CompiledGraph,
        output: &Path,
        codecs: &Codecs,
    ) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
        ];
        for input in &compiled.inputs {
            args.push("-i".into());
            args.push(input.to_string_lossy().to_string());
        }
        args.push("-filter_complex".into());
        args.push(compiled.filter_complex.clone());
        args.push("-map".into());
        args.push(format!("[{}]", compiled.video_label));
        args.push("-c:v".into());
        args.push(codecs.video.clone());
        args.push("-pix_fmt".into());
        args.push("yuv420p".into());
        match &compiled.audio_label {
            Some(label) => {
                args.push("-map".into());
                args.push(format!("[{}]", label));
                args.push("-c:a".into());
                args.push(codecs.audio.clone());
            }
            None => args.push("-an".into()),
        }
        args.push("-movflags".into());
        args.push("+faststart".into());
        args.push(output.to_string_lossy().to_string());
        args
    }

    fn run_ffmpeg(&self, args: &[String]) -> CueMixResult<()> {
        debug!("Running {} {:?}", self.ffmpeg_binary.display(), args);

        let output = Command::new(&self.ffmpeg_binary)
            .args(args)
            .output()
            .map_err(|e| {
                CueMixError::media(format!(
                    "Failed to launch {}: {}",
                    self.ffmpeg_binary.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: Vec<&str> = stderr.lines().rev().take(20).collect();
            let tail: Vec<&str> = tail.into_iter().rev().collect();
            return Err(CueMixError::media(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                tail.join("\n")
            )));
        }
        Ok(())
    }
}

/// Centered crop rectangle that gives `ratio` on a `width`x`height` frame
pub fn aspect_crop(width: u32, height: u32, ratio: AspectRatio) -> Rect {
    let (w, h) = (width as u64, height as u64);
    let (rw, rh) = (ratio.width as u64, ratio.height as u64);
    if w * rh > h * rw {
        let new_width = ((h * rw / rh) as u32).max(1);
        Rect {
            x: (width - new_width) / 2,
            y: 0,
            width: new_width,
            height,
        }
    } else {
        let new_height = ((w * rh / rw) as u32).clamp(1, height);
        Rect {
            x: 0,
            y: (height - new_height) / 2,
            width,
            height: new_height,
        }
    }
}

impl<P: ProbePort> MediaEngine for FfmpegEngine<P> {
    type Clip = FilterClip;

    fn load(&self, path: &Path) -> CueMixResult<FilterClip> {
        let info = self.probe.probe(path)?;
        let properties = info.properties().map_err(|e| {
            CueMixError::media(format!("Unusable video in {}: {}", path.display(), e))
        })?;

        Ok(FilterClip {
            node: Arc::new(ClipNode::Source {
                path: info.path.clone(),
            }),
            kind: StreamKind::Video,
            duration: info.duration,
            properties,
            has_audio: info.has_audio,
        })
    }

    fn duration_of(&self, clip: &FilterClip) -> Timestamp {
        clip.duration
    }

    fn properties_of(&self, clip: &FilterClip) -> VideoProperties {
        clip.properties
    }

    fn subrange(&self, clip: &FilterClip, start: Timestamp, end: Timestamp) -> CueMixResult<FilterClip> {
        if end <= start {
            return Err(CueMixError::media(format!(
                "Empty subrange [{}, {}]",
                start, end
            )));
        }
        if start >= clip.duration {
            return Err(CueMixError::media(format!(
                "Subrange start {} is beyond clip duration {}",
                start, clip.duration
            )));
        }
        // Cue files round to the millisecond; allow the end to overshoot by one frame
        let frame = Timestamp::from_seconds(1.0 / clip.properties.fps);
        if end > clip.duration + frame {
            return Err(CueMixError::media(format!(
                "Subrange end {} is beyond clip duration {}",
                end, clip.duration
            )));
        }

        Ok(clip
            .derive(ClipNode::Subrange {
                inner: clip.clone(),
                start,
                end,
            })
            .with_duration(end - start))
    }

    fn crop_to_aspect(&self, clip: &FilterClip, ratio: AspectRatio) -> CueMixResult<FilterClip> {
        clip.require_video("crop")?;
        let props = clip.properties;
        let rect = aspect_crop(props.width, props.height, ratio);
        if rect.width == props.width && rect.height == props.height {
            return Ok(clip.clone());
        }

        Ok(clip
            .derive(ClipNode::Crop {
                inner: clip.clone(),
                rect,
            })
            .with_properties(VideoProperties {
                width: rect.width,
                height: rect.height,
                fps: props.fps,
            }))
    }

    fn resize(&self, clip: &FilterClip, width: u32, height: u32) -> CueMixResult<FilterClip> {
        clip.require_video("resize")?;
        let properties = VideoProperties::new(width, height, clip.properties.fps)
            .map_err(|e| CueMixError::media(e.to_string()))?;

        Ok(clip
            .derive(ClipNode::Scale {
                inner: clip.clone(),
            })
            .with_properties(properties))
    }

    fn resample_fps(&self, clip: &FilterClip, fps: f64) -> CueMixResult<FilterClip> {
        clip.require_video("fps resample")?;
        let properties = VideoProperties::new(clip.properties.width, clip.properties.height, fps)
            .map_err(|e| CueMixError::media(e.to_string()))?;

        Ok(clip
            .derive(ClipNode::Fps {
                inner: clip.clone(),
            })
            .with_properties(properties))
    }

    fn loop_to_duration(&self, clip: &FilterClip, duration: Timestamp) -> CueMixResult<FilterClip> {
        clip.require_video("loop")?;
        if clip.duration.is_zero() {
            return Err(CueMixError::media("Cannot loop an empty clip"));
        }

        Ok(clip
            .derive(ClipNode::Loop {
                inner: clip.clone(),
            })
            .with_duration(duration))
    }

    fn trim_to_duration(&self, clip: &FilterClip, duration: Timestamp) -> CueMixResult<FilterClip> {
        if duration > clip.duration {
            return Err(CueMixError::media(format!(
                "Cannot trim a {} clip to {}",
                clip.duration, duration
            )));
        }

        Ok(clip
            .derive(ClipNode::Trim {
                inner: clip.clone(),
            })
            .with_duration(duration))
    }

    fn render_caption(
        &self,
        text: &str,
        max_width: u32,
        style: &CaptionStyle,
        duration: Timestamp,
        fps: f64,
    ) -> CueMixResult<FilterClip> {
        let lines = CaptionLayout::wrap(text, max_width, style);
        if lines.is_empty() {
            return Err(CueMixError::media("Cannot render an empty caption"));
        }
        let (width, height) = CaptionLayout::block_size(&lines, max_width, style);
        let properties =
            VideoProperties::new(width, height, fps).map_err(|e| CueMixError::media(e.to_string()))?;

        Ok(FilterClip {
            node: Arc::new(ClipNode::Caption {
                lines,
                style: style.clone(),
            }),
            kind: StreamKind::Video,
            duration,
            properties,
            has_audio: false,
        })
    }

    fn solid_box(
        &self,
        width: u32,
        height: u32,
        color: &str,
        opacity: f64,
        duration: Timestamp,
        fps: f64,
    ) -> CueMixResult<FilterClip> {
        let properties =
            VideoProperties::new(width, height, fps).map_err(|e| CueMixError::media(e.to_string()))?;

        Ok(FilterClip {
            node: Arc::new(ClipNode::SolidBox {
                color: color.to_string(),
                opacity: opacity.clamp(0.0, 1.0),
            }),
            kind: StreamKind::Video,
            duration,
            properties,
            has_audio: false,
        })
    }

    fn overlay(&self, base: &FilterClip, layers: &[Layer<FilterClip>]) -> CueMixResult<FilterClip> {
        base.require_video("overlay")?;
        for layer in layers {
            layer.clip.require_video("overlay layer")?;
        }
        if layers.is_empty() {
            return Ok(base.clone());
        }

        Ok(base.derive(ClipNode::Overlay {
            base: base.clone(),
            layers: layers.to_vec(),
        }))
    }

    fn concatenate(&self, clips: &[FilterClip]) -> CueMixResult<FilterClip> {
        let first = clips
            .first()
            .ok_or_else(|| CueMixError::media("Nothing to concatenate"))?;
        for clip in clips {
            clip.require_video("concatenate")?;
            if clip.properties.width != first.properties.width
                || clip.properties.height != first.properties.height
            {
                return Err(CueMixError::media(format!(
                    "Cannot concatenate {}x{} with {}x{}",
                    first.properties.width,
                    first.properties.height,
                    clip.properties.width,
                    clip.properties.height
                )));
            }
        }

        let duration = clips.iter().map(|c| c.duration).sum();
        Ok(FilterClip {
            node: Arc::new(ClipNode::Concat {
                parts: clips.to_vec(),
            }),
            kind: StreamKind::Video,
            duration,
            properties: first.properties,
            has_audio: false,
        })
    }

    fn strip_audio(&self, clip: &FilterClip) -> CueMixResult<FilterClip> {
        clip.require_video("strip audio")?;
        if !clip.has_audio {
            return Ok(clip.clone());
        }
        let mut stripped = clip.derive(ClipNode::StripAudio {
            inner: clip.clone(),
        });
        stripped.has_audio = false;
        Ok(stripped)
    }

    fn audio_of(&self, clip: &FilterClip) -> CueMixResult<FilterClip> {
        if !matches!(clip.node(), ClipNode::Source { .. }) || !clip.has_audio {
            return Err(CueMixError::media(
                "Audio can only be taken from a loaded file that has an audio stream",
            ));
        }
        let mut audio = clip.derive(ClipNode::AudioOf {
            source: clip.clone(),
        });
        audio.kind = StreamKind::Audio;
        Ok(audio)
    }

    fn mux_audio(&self, video: &FilterClip, audio: &FilterClip) -> CueMixResult<FilterClip> {
        video.require_video("mux")?;
        if audio.kind != StreamKind::Audio {
            return Err(CueMixError::media("Mux needs an audio track"));
        }
        let mut muxed = video.derive(ClipNode::Mux {
            video: video.clone(),
            audio: audio.clone(),
        });
        muxed.has_audio = true;
        Ok(muxed)
    }

    fn write(&self, clip: &FilterClip, path: &Path, codecs: &Codecs) -> CueMixResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let text_dir = tempfile::Builder::new().prefix("cuemix-text-").tempdir()?;
        let compiled = GraphCompiler::new(text_dir.path()).compile(clip)?;

        // Encode next to the destination, then move into place once complete
        let staging = tempfile::Builder::new()
            .prefix(".cuemix-")
            .suffix(".mp4")
            .tempfile_in(&parent)?;
        let args = self.command_args(&compiled, staging.path(), codecs);
        self.run_ffmpeg(&args)?;

        if path.exists() {
            warn!("Replacing existing output {}", path.display());
        }
        staging
            .persist(path)
            .map_err(|e| CueMixError::IoError(e.error))?;

        info!("Wrote {} ({})", path.display(), clip.duration);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
