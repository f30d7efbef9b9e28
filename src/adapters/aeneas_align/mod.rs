// Aeneas aligner adapter - Forced alignment through the aeneas python tool

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::cues::sync_map;
use crate::domain::model::Cue;
use crate::error::{CueMixError, CueMixResult};
use crate::ports::Aligner;

/// Runs `python -m aeneas.tools.execute_task` and reads its JSON sync map
pub struct AeneasAligner {
    python: PathBuf,
    language: String,
}

impl AeneasAligner {
    pub fn new(python: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            language: language.into(),
        }
    }

    /// Task configuration string passed to aeneas
    pub fn task_config(&self) -> String {
        format!(
            "task_language={}|is_text_type=plain|os_task_file_format=json",
            self.language
        )
    }

    pub fn command_args(&self, audio: &Path, transcript: &Path, output: &Path) -> Vec<String> {
        vec![
            "-m".to_string(),
            "aeneas.tools.execute_task".to_string(),
            audio.to_string_lossy().to_string(),
            transcript.to_string_lossy().to_string(),
            self.task_config(),
            output.to_string_lossy().to_string(),
        ]
    }
}

/// `<dir>/<stem>_with_timestamps.srt` for a transcript path
pub fn timestamps_srt_path(transcript: &Path) -> PathBuf {
    let stem = transcript
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "transcript".to_string());
    transcript.with_file_name(format!("{}_with_timestamps.srt", stem))
}

impl Aligner for AeneasAligner {
    fn align(&self, transcript: &Path, audio: &Path, work_dir: &Path) -> CueMixResult<Vec<Cue>> {
        for (label, path) in [("Transcript", transcript), ("Audio", audio)] {
            if !path.exists() {
                return Err(CueMixError::invalid_input(format!(
                    "{} file not found: {}",
                    label,
                    path.display()
                )));
            }
        }
        std::fs::create_dir_all(work_dir)?;

        let sync_map_path = work_dir.join("sync_map.json");
        let args = self.command_args(audio, transcript, &sync_map_path);
        info!("Aligning {} against {}", transcript.display(), audio.display());
        debug!("Running {} {:?}", self.python.display(), args);

        let output = Command::new(&self.python)
            .args(&args)
            .output()
            .map_err(|e| CueMixError::AlignmentFailed {
                message: format!("Failed to launch {}: {}", self.python.display(), e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!("aeneas stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            warn!("aeneas stderr: {}", stderr.trim());
        }

        if !sync_map_path.exists() {
            return Err(CueMixError::AlignmentFailed {
                message: format!(
                    "aeneas exited with {} without writing {}",
                    output.status,
                    sync_map_path.display()
                ),
            });
        }

        let content = std::fs::read_to_string(&sync_map_path)?;
        let cues = sync_map::parse(&content)?;
        if cues.is_empty() {
            return Err(CueMixError::invalid_input("Alignment produced zero cues"));
        }

        info!("Aligned {} cues", cues.len());
        Ok(cues)
    }
}
