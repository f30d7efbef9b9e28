// TOML config adapter - Typed configuration with file and environment layers

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::AspectRatio;
use crate::domain::rules::CaptionStyle;
use crate::error::{CueMixError, CueMixResult};
use crate::ports::Codecs;

/// Config file looked up in the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "cuemix.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "CUEMIX_";

/// How candidates are ordered inside a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CandidateOrder {
    /// Sorted by file name
    #[default]
    Name,
    /// Raw directory-listing order
    Listing,
}

impl CandidateOrder {
    pub fn parse(value: &str) -> CueMixResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" => Ok(CandidateOrder::Name),
            "listing" => Ok(CandidateOrder::Listing),
            other => Err(CueMixError::config(format!(
                "Unknown candidate order '{}', expected 'name' or 'listing'",
                other
            ))),
        }
    }
}

/// Encoder and worker settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub ffmpeg_binary: PathBuf,
    pub video_codec: String,
    pub audio_codec: String,
    /// Variants rendered at the same time
    pub workers: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let codecs = Codecs::default();
        Self {
            ffmpeg_binary: PathBuf::from("ffmpeg"),
            video_codec: codecs.video,
            audio_codec: codecs.audio,
            workers: num_cpus::get().max(1),
        }
    }
}

impl RenderConfig {
    pub fn codecs(&self) -> Codecs {
        Codecs {
            video: self.video_codec.clone(),
            audio: self.audio_codec.clone(),
        }
    }
}

/// Replacement asset discovery settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Accepted candidate file extensions, compared case-insensitively
    pub extensions: Vec<String>,
    pub candidate_order: CandidateOrder,
    /// Crop target as `W:H`; the base video's own aspect when unset
    pub aspect_ratio: Option<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["mp4".to_string()],
            candidate_order: CandidateOrder::default(),
            aspect_ratio: None,
        }
    }
}

impl AssetConfig {
    pub fn aspect(&self) -> CueMixResult<Option<AspectRatio>> {
        self.aspect_ratio
            .as_deref()
            .map(AspectRatio::parse)
            .transpose()
    }
}

/// Alignment tool settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    pub python: PathBuf,
    pub language: String,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            python: PathBuf::from("python3"),
            language: "eng".to_string(),
        }
    }
}

/// Complete CueMix configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CueMixConfig {
    pub render: RenderConfig,
    pub caption: CaptionStyle,
    pub assets: AssetConfig,
    pub alignment: AlignmentConfig,
}

impl CueMixConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> CueMixResult<Self> {
        toml::from_str(content)
            .map_err(|e| CueMixError::config(format!("Failed to parse TOML config: {}", e)))
    }

    /// Load from an explicit file
    pub fn from_file(path: &Path) -> CueMixResult<Self> {
        if !path.exists() {
            return Err(CueMixError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Defaults, then the TOML file (explicit, else `./cuemix.toml` if present),
    /// then `CUEMIX_*` environment overrides
    pub fn load(explicit: Option<&Path>) -> CueMixResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Apply `CUEMIX_*` overrides from the given variables
    pub fn apply_env<I>(&mut self, vars: I) -> CueMixResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "FFMPEG" => self.render.ffmpeg_binary = PathBuf::from(&value),
                "VIDEO_CODEC" => self.render.video_codec = value.clone(),
                "AUDIO_CODEC" => self.render.audio_codec = value.clone(),
                "WORKERS" => self.render.workers = parse_env(&key, &value)?,
                "FONT" => self.caption.font = value.clone(),
                "FONT_SIZE" => self.caption.font_size = parse_env(&key, &value)?,
                "MARGIN" => self.caption.margin = parse_env(&key, &value)?,
                "BOX_OPACITY" => self.caption.box_opacity = parse_env(&key, &value)?,
                "CANDIDATE_ORDER" => self.assets.candidate_order = CandidateOrder::parse(&value)?,
                "ASPECT_RATIO" => self.assets.aspect_ratio = Some(value.clone()),
                "PYTHON" => self.alignment.python = PathBuf::from(&value),
                "LANGUAGE" => self.alignment.language = value.clone(),
                // Read by the logging setup, not part of the config
                "LOG_LEVEL" | "LOG_FORMAT" => continue,
                _ => {
                    debug!("Ignoring unknown environment variable {}", key);
                    continue;
                }
            }
            info!("Found environment override: {} = {}", key, value);
            applied += 1;
        }
        if applied > 0 {
            info!("Applied {} environment overrides", applied);
        }
        Ok(())
    }

    pub fn validate(&self) -> CueMixResult<()> {
        if self.render.workers == 0 {
            return Err(CueMixError::config("workers must be at least 1"));
        }
        if self.render.video_codec.trim().is_empty() || self.render.audio_codec.trim().is_empty() {
            return Err(CueMixError::config("Codec names must not be empty"));
        }
        if self.assets.extensions.is_empty() {
            return Err(CueMixError::config(
                "At least one candidate file extension is required",
            ));
        }
        self.assets
            .aspect()
            .map_err(|e| CueMixError::config(e.to_string()))?;
        self.caption.validate()?;
        if self.alignment.language.trim().is_empty() {
            return Err(CueMixError::config("Alignment language must not be empty"));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> CueMixResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CueMixError::config(format!("Invalid value for {}: '{}'", key, value)))
}
