// Adapters - External system implementations

pub mod aeneas_align;
pub mod ffmpeg_engine;
pub mod probe_libav;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use aeneas_align::AeneasAligner;
pub use ffmpeg_engine::{FfmpegEngine, FilterClip};
pub use probe_libav::LibavProbe;
pub use toml_config::{CandidateOrder, CueMixConfig};
pub use tracing_log::{init_logging, LogFormat, LogLevel};
