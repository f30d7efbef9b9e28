//! Error handling module for CueMix

use thiserror::Error;

use crate::domain::model::Timestamp;

/// Main error type for CueMix operations
#[derive(Error, Debug)]
pub enum CueMixError {
    /// Malformed or empty cue sequence, or another unusable shared input
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Replacement asset root is missing
    #[error("Asset root not found: {path}")]
    AssetRootNotFound { path: String },

    /// A candidate is too short to provide footage at its cue start
    #[error(
        "Replacement window out of range for segment {index}: cue starts at {cue_start} \
         but candidate is only {candidate_duration} long"
    )]
    ReplacementWindow {
        index: usize,
        cue_start: Timestamp,
        candidate_duration: Timestamp,
    },

    /// The alignment tool did not produce its output artifact
    #[error("Alignment failed: {message}")]
    AlignmentFailed { message: String },

    /// A primitive media operation failed
    #[error("Media engine error: {message}")]
    MediaEngine { message: String },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CueMixError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn media(message: impl Into<String>) -> Self {
        Self::MediaEngine {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Errors that stop the whole run rather than a single variant or segment
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            CueMixError::ReplacementWindow { .. } | CueMixError::MediaEngine { .. }
        )
    }
}

impl From<ffmpeg_next::Error> for CueMixError {
    fn from(err: ffmpeg_next::Error) -> Self {
        CueMixError::media(format!("FFmpeg error: {}", err))
    }
}

/// Result type alias for CueMix operations
pub type CueMixResult<T> = std::result::Result<T, CueMixError>;
