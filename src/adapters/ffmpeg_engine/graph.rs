//! Edit graph to ffmpeg filtergraph compiler

use std::path::{Path, PathBuf};

use crate::domain::model::Timestamp;
use crate::error::{CueMixError, CueMixResult};

use super::{ClipNode, FilterClip, StreamKind};

/// Ready-to-run filtergraph with its inputs and output pads
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    pub inputs: Vec<PathBuf>,
    pub filter_complex: String,
    pub video_label: String,
    pub audio_label: Option<String>,
}

/// Expands an edit graph into filter chains.
///
/// Shared sub-clips are expanded once per use, so every internal pad is
/// consumed exactly once.
pub struct GraphCompiler<'a> {
    text_dir: &'a Path,
    inputs: Vec<PathBuf>,
    chains: Vec<String>,
    next_label: usize,
    next_text: usize,
}

impl<'a> GraphCompiler<'a> {
    /// Caption text files are written into `text_dir`
    pub fn new(text_dir: &'a Path) -> Self {
        Self {
            text_dir,
            inputs: Vec::new(),
            chains: Vec::new(),
            next_label: 0,
            next_text: 0,
        }
    }

    pub fn compile(mut self, clip: &FilterClip) -> CueMixResult<CompiledGraph> {
        let (video, audio) = match clip.node() {
            ClipNode::Mux { video, audio } => (video, Some(audio)),
            _ => (clip, None),
        };
        if video.kind() != StreamKind::Video {
            return Err(CueMixError::media("Output needs a video stream"));
        }

        let video_label = self.video(video)?;
        let video_label = self.finish(&video_label, "outv", "format=yuv420p");
        let audio_label = match audio {
            Some(audio) => {
                let label = self.audio(audio)?;
                Some(self.finish(&label, "outa", "anull"))
            }
            None => None,
        };

        Ok(CompiledGraph {
            inputs: self.inputs,
            filter_complex: self.chains.join(";"),
            video_label,
            audio_label,
        })
    }

    fn finish(&mut self, label: &str, out: &str, filter: &str) -> String {
        self.chains.push(format!("[{}]{}[{}]", label, filter, out));
        out.to_string()
    }

    fn input_index(&mut self, path: &Path) -> usize {
        if let Some(index) = self.inputs.iter().position(|p| p == path) {
            return index;
        }
        self.inputs.push(path.to_path_buf());
        self.inputs.len() - 1
    }

    fn label(&mut self) -> String {
        let label = format!("c{}", self.next_label);
        self.next_label += 1;
        label
    }

    fn chain(&mut self, input: &str, filters: &str) -> String {
        let out = self.label();
        self.chains.push(format!("[{}]{}[{}]", input, filters, out));
        out
    }

    fn source(&mut self, filters: &str) -> String {
        let out = self.label();
        self.chains.push(format!("{}[{}]", filters, out));
        out
    }

    fn video(&mut self, clip: &FilterClip) -> CueMixResult<String> {
        let props = clip.properties();
        let label = match clip.node() {
            ClipNode::Source { path } => {
                let index = self.input_index(path);
                format!("{}:v", index)
            }
            ClipNode::Subrange { inner, start, end } => {
                let input = self.video(inner)?;
                self.chain(
                    &input,
                    &format!(
                        "trim=start={}:end={},setpts=PTS-STARTPTS",
                        secs(*start),
                        secs(*end)
                    ),
                )
            }
            ClipNode::Crop { inner, rect } => {
                let input = self.video(inner)?;
                self.chain(
                    &input,
                    &format!("crop={}:{}:{}:{}", rect.width, rect.height, rect.x, rect.y),
                )
            }
            ClipNode::Scale { inner } => {
                let input = self.video(inner)?;
                self.chain(
                    &input,
                    &format!("scale={}:{},setsar=1", props.width, props.height),
                )
            }
            ClipNode::Fps { inner } => {
                let input = self.video(inner)?;
                self.chain(&input, &format!("fps={}", rate(props.fps)))
            }
            ClipNode::Loop { inner } => {
                let input = self.video(inner)?;
                let inner_props = inner.properties();
                let frames = (inner.duration().as_seconds() * inner_props.fps).ceil().max(1.0) as u64;
                self.chain(
                    &input,
                    &format!(
                        "loop=loop=-1:size={}:start=0,setpts=N/FRAME_RATE/TB,trim=duration={}",
                        frames,
                        secs(clip.duration())
                    ),
                )
            }
            ClipNode::Trim { inner } => {
                let input = self.video(inner)?;
                self.chain(
                    &input,
                    &format!("trim=duration={},setpts=PTS-STARTPTS", secs(clip.duration())),
                )
            }
            ClipNode::Caption { lines, style } => {
                let mut filters = vec![canvas("black@0.0", clip)];
                let line_height = style.line_height();
                for (i, line) in lines.iter().enumerate() {
                    let text_file = self.text_file(line)?;
                    filters.push(format!(
                        "drawtext=font='{}':textfile='{}':expansion=none:fontsize={}:fontcolor={}:borderw={}:bordercolor={}:x=(w-text_w)/2:y={}",
                        escape(&style.font),
                        escape(&text_file.to_string_lossy()),
                        style.font_size,
                        style.color,
                        style.stroke_width,
                        style.stroke_color,
                        i as u32 * line_height + line_height.saturating_sub(style.font_size) / 2
                    ));
                }
                self.source(&filters.join(","))
            }
            ClipNode::SolidBox { color, opacity } => {
                self.source(&canvas(&format!("{}@{:.2}", color, opacity), clip))
            }
            ClipNode::Overlay { base, layers } => {
                let mut current = self.video(base)?;
                for layer in layers {
                    let top = self.video(&layer.clip)?;
                    let out = self.label();
                    self.chains.push(format!(
                        "[{}][{}]overlay=x={}:y={}:eof_action=pass[{}]",
                        current, top, layer.x, layer.y, out
                    ));
                    current = out;
                }
                current
            }
            ClipNode::Concat { parts } => {
                let mut pads = String::new();
                for part in parts {
                    let input = self.video(part)?;
                    let normalized = self.chain(&input, "setsar=1,format=yuv420p");
                    pads.push_str(&format!("[{}]", normalized));
                }
                let out = self.label();
                self.chains.push(format!(
                    "{}concat=n={}:v=1:a=0[{}]",
                    pads,
                    parts.len(),
                    out
                ));
                out
            }
            ClipNode::StripAudio { inner } => self.video(inner)?,
            ClipNode::Mux { video, .. } => self.video(video)?,
            ClipNode::AudioOf { .. } => {
                return Err(CueMixError::media("An audio track has no video stream"))
            }
        };
        Ok(label)
    }

    fn audio(&mut self, clip: &FilterClip) -> CueMixResult<String> {
        let label = match clip.node() {
            ClipNode::AudioOf { source } => match source.node() {
                ClipNode::Source { path } => {
                    let index = self.input_index(path);
                    format!("{}:a", index)
                }
                _ => return Err(CueMixError::media("Audio must come from a loaded file")),
            },
            ClipNode::Subrange { inner, start, end } => {
                let input = self.audio(inner)?;
                self.chain(
                    &input,
                    &format!(
                        "atrim=start={}:end={},asetpts=PTS-STARTPTS",
                        secs(*start),
                        secs(*end)
                    ),
                )
            }
            ClipNode::Trim { inner } => {
                let input = self.audio(inner)?;
                self.chain(
                    &input,
                    &format!("atrim=duration={},asetpts=PTS-STARTPTS", secs(clip.duration())),
                )
            }
            _ => {
                return Err(CueMixError::media(
                    "Only subrange and trim apply to an audio track",
                ))
            }
        };
        Ok(label)
    }

    fn text_file(&mut self, text: &str) -> CueMixResult<PathBuf> {
        let path = self.text_dir.join(format!("caption_{}.txt", self.next_text));
        self.next_text += 1;
        std::fs::write(&path, text)?;
        Ok(path)
    }
}

fn canvas(color: &str, clip: &FilterClip) -> String {
    let props = clip.properties();
    format!(
        "color=c={}:s={}x{}:r={}:d={},format=rgba",
        color,
        props.width,
        props.height,
        rate(props.fps),
        secs(clip.duration())
    )
}

fn secs(time: Timestamp) -> String {
    format!("{:.3}", time.as_seconds())
}

fn rate(fps: f64) -> String {
    let formatted = format!("{:.3}", fps);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Escape a value for a single-quoted filter option
fn escape(value: &str) -> String {
    value.replace('\\', "/").replace('\'', "'\\''")
}
