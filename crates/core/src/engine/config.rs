//! Configuration for the conversion engine.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::job::SpeedFactor;

/// Configuration for the conversion engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory for preview files when a preview names none.
    #[serde(default = "default_preview_dir")]
    pub preview_dir: PathBuf,

    /// Speed used by callers that do not pick one.
    #[serde(default = "default_speed")]
    pub default_speed: f64,

    /// Output directory used by callers that do not pick one.
    #[serde(default = "default_output_dir")]
    pub default_output_dir: PathBuf,

    /// Capacity of the engine-wide event broadcast.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preview_dir: default_preview_dir(),
            default_speed: default_speed(),
            default_output_dir: default_output_dir(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

impl EngineConfig {
    /// Sets the preview directory.
    pub fn with_preview_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.preview_dir = dir.into();
        self
    }

    /// Sets the default output directory.
    pub fn with_default_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.default_output_dir = dir.into();
        self
    }
}

fn default_preview_dir() -> PathBuf {
    std::env::temp_dir().join("speedupper-preview")
}

fn default_speed() -> f64 {
    SpeedFactor::DEFAULT
}

/// `<Downloads>/AudioSpeedUpper`, falling back to the home directory and
/// then the temp directory when no download folder is known.
fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(std::env::temp_dir)
        .join("AudioSpeedUpper")
}

fn default_broadcast_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_speed, 1.84);
        assert_eq!(config.broadcast_capacity, 256);
        assert!(config.default_output_dir.ends_with("AudioSpeedUpper"));
        assert!(config.preview_dir.ends_with("speedupper-preview"));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EngineConfig = toml::from_str("default_speed = 2.5").unwrap();
        assert_eq!(config.default_speed, 2.5);
        assert_eq!(config.broadcast_capacity, 256);
    }
}
