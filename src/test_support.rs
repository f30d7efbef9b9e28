// Shared fixtures for unit tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::FfmpegEngine;
use crate::domain::model::{MediaInfo, Timestamp};
use crate::error::{CueMixError, CueMixResult};
use crate::ports::ProbePort;

/// Probe answering from a fixed table instead of reading files
#[derive(Debug, Default, Clone)]
pub struct StubProbe {
    files: HashMap<PathBuf, MediaInfo>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(
        mut self,
        path: impl Into<PathBuf>,
        millis: u64,
        width: u32,
        height: u32,
        has_audio: bool,
    ) -> Self {
        let path = path.into();
        self.files.insert(
            path.clone(),
            MediaInfo {
                path,
                duration: Timestamp::from_millis(millis),
                width,
                height,
                fps: 30.0,
                has_audio,
            },
        );
        self
    }

    pub fn into_engine(self) -> Arc<FfmpegEngine<StubProbe>> {
        Arc::new(FfmpegEngine::new(self, "ffmpeg"))
    }
}

impl ProbePort for StubProbe {
    fn probe(&self, path: &Path) -> CueMixResult<MediaInfo> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| CueMixError::media(format!("missing {}", path.display())))
    }
}

pub fn ms(millis: u64) -> Timestamp {
    Timestamp::from_millis(millis)
}
