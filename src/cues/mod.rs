//! Cue sequence readers and writers
//!
//! Cues arrive either from the alignment tool's JSON sync map or from an
//! existing SubRip file. Both readers hand back cues in file order.

use std::path::Path;

use tracing::info;

use crate::domain::model::Cue;
use crate::error::{CueMixError, CueMixResult};

pub mod srt;
pub mod sync_map;

/// Load cues from a `.srt` or `.json` sync map file, chosen by extension
pub fn load_cue_file(path: &Path) -> CueMixResult<Vec<Cue>> {
    if !path.exists() {
        return Err(CueMixError::invalid_input(format!(
            "Cue file not found: {}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let cues = match extension.as_str() {
        "json" => sync_map::parse(&content)?,
        "srt" => srt::parse(&content)?,
        other => {
            return Err(CueMixError::invalid_input(format!(
                "Unsupported cue file extension '{}', expected .srt or .json",
                other
            )))
        }
    };

    if cues.is_empty() {
        return Err(CueMixError::invalid_input(format!(
            "No cues found in {}",
            path.display()
        )));
    }

    info!("Loaded {} cues from {}", cues.len(), path.display());
    Ok(cues)
}
