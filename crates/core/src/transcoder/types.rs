//! Types for the transcoder module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Slowest tempo multiplier accepted by the `atempo` filter.
pub const MIN_TEMPO: f64 = 0.5;

/// Fastest tempo multiplier accepted by the `atempo` filter.
pub const MAX_TEMPO: f64 = 100.0;

/// A single transcode request: one input, one output, one tempo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodeRequest {
    /// Input audio file.
    pub input_path: PathBuf,
    /// Output audio file.
    pub output_path: PathBuf,
    /// Tempo multiplier (1.0 = unchanged).
    pub tempo: f64,
    /// Overwrite an existing file at `output_path` instead of failing.
    pub overwrite: bool,
}

impl TranscodeRequest {
    /// Creates a request that overwrites any existing output.
    pub fn new(input_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>, tempo: f64) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            tempo,
            overwrite: true,
        }
    }

    /// The `-filter:a` argument for this request.
    pub fn filter_arg(&self) -> String {
        format!("atempo={}", self.tempo)
    }
}

/// Result of a successful transcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscodeResult {
    /// Output file path.
    pub output_path: PathBuf,
    /// Output file size in bytes (0 if it could not be read).
    pub output_size_bytes: u64,
    /// Wall-clock duration of the process in milliseconds.
    pub duration_ms: u64,
}
