// Probe LibAV adapter - Media file analysis using libav

use std::path::Path;

use ffmpeg_next as ffmpeg;
use ffmpeg_next::media::Type;
use tracing::debug;

use crate::domain::model::*;
use crate::error::{CueMixError, CueMixResult};
use crate::ports::ProbePort;

/// LibAV-based media probing adapter
pub struct LibavProbe;

impl LibavProbe {
    /// Create new LibAV probing adapter
    pub fn new() -> CueMixResult<Self> {
        ffmpeg::init()
            .map_err(|e| CueMixError::media(format!("FFmpeg initialization failed: {}", e)))?;
        Ok(Self)
    }

    fn frame_rate(stream: &ffmpeg::Stream) -> f64 {
        let average = stream.avg_frame_rate();
        if average.numerator() > 0 && average.denominator() > 0 {
            return f64::from(average);
        }
        let real = stream.rate();
        if real.numerator() > 0 && real.denominator() > 0 {
            f64::from(real)
        } else {
            0.0
        }
    }

    fn duration_seconds(ictx: &ffmpeg::format::context::Input, stream: &ffmpeg::Stream) -> f64 {
        let container = ictx.duration();
        if container > 0 {
            return container as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
        }
        let time_base = stream.time_base();
        if stream.duration() > 0 && time_base.denominator() != 0 {
            stream.duration() as f64 * f64::from(time_base)
        } else {
            0.0
        }
    }
}

impl ProbePort for LibavProbe {
    fn probe(&self, path: &Path) -> CueMixResult<MediaInfo> {
        if !path.exists() {
            return Err(CueMixError::media(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let ictx = ffmpeg::format::input(&path).map_err(|e| {
            CueMixError::media(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let stream = ictx.streams().best(Type::Video).ok_or_else(|| {
            CueMixError::media(format!("No video stream in {}", path.display()))
        })?;

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?
            .decoder()
            .video()?;

        let duration = Timestamp::from_seconds(Self::duration_seconds(&ictx, &stream));
        if duration.is_zero() {
            return Err(CueMixError::media(format!(
                "Could not determine duration of {}",
                path.display()
            )));
        }

        let info = MediaInfo {
            path: path.to_path_buf(),
            duration,
            width: decoder.width(),
            height: decoder.height(),
            fps: Self::frame_rate(&stream),
            has_audio: ictx.streams().best(Type::Audio).is_some(),
        };

        debug!(
            "Probed {}: {} {}x{} @ {:.3} fps, audio: {}",
            path.display(),
            info.duration,
            info.width,
            info.height,
            info.fps,
            info.has_audio
        );
        Ok(info)
    }
}
