//! CueMix Library
//!
//! Timeline recomposition: partition a base video at caption cue boundaries,
//! pair replacement candidates across segment pools, conform each chosen
//! candidate to its slot, and reassemble every variant over the original audio.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod cues;
pub mod domain;
pub mod error;
pub mod ports;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use domain::model::{Candidate, CandidatePools, Cue, Segment, Timeline, Timestamp};
pub use error::{CueMixError, CueMixResult};
