//! Types for the job module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::transcoder::{MAX_TEMPO, MIN_TEMPO};

use super::error::{FilesystemError, ValidationError};

/// A tempo multiplier within the range the transcoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SpeedFactor(f64);

impl SpeedFactor {
    /// Common speed choices, slowest first.
    pub const PRESETS: [f64; 7] = [1.25, 1.5, 1.75, 1.84, 2.0, 2.5, 3.0];

    /// Default speed.
    pub const DEFAULT: f64 = 1.84;

    /// Creates a speed factor, rejecting non-finite or out-of-range values.
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || !(MIN_TEMPO..=MAX_TEMPO).contains(&value) {
            return Err(ValidationError::InvalidSpeedFactor {
                value,
                min: MIN_TEMPO,
                max: MAX_TEMPO,
            });
        }
        Ok(Self(value))
    }

    /// The raw multiplier.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SpeedFactor {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for SpeedFactor {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SpeedFactor> for f64 {
    fn from(speed: SpeedFactor) -> Self {
        speed.0
    }
}

/// Accepts `"1.84"` as well as the labelled form `"1.84x"`.
impl FromStr for SpeedFactor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed
            .strip_suffix(['x', 'X'])
            .unwrap_or(trimmed)
            .trim();
        let value: f64 = number
            .parse()
            .map_err(|_| ValidationError::UnparsableSpeedFactor(s.to_string()))?;
        Self::new(value)
    }
}

impl fmt::Display for SpeedFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// How a job is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobMode {
    /// Convert only the first input into a disposable temporary file.
    Preview,
    /// Convert every input into the output directory.
    Batch,
}

impl JobMode {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preview => "preview",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one conversion run, as built by the caller.
///
/// Nothing here is checked until [`validate`](super::validate) runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Input files, in processing order.
    pub inputs: Vec<PathBuf>,
    /// Tempo multiplier.
    pub speed_factor: f64,
    /// Output directory (batch) or directory for the temporary file (preview).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_destination: Option<PathBuf>,
    /// Run mode.
    pub mode: JobMode,
    /// Copy each converted file over its source. Batch only.
    #[serde(default)]
    pub replace_original: bool,
}

impl JobDescriptor {
    /// A batch job writing every input into `output_dir`.
    pub fn batch<I, P>(inputs: I, speed_factor: f64, output_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            speed_factor,
            output_destination: Some(output_dir.into()),
            mode: JobMode::Batch,
            replace_original: false,
        }
    }

    /// A preview job. Only the first input will be converted.
    pub fn preview<I, P>(inputs: I, speed_factor: f64) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            speed_factor,
            output_destination: None,
            mode: JobMode::Preview,
            replace_original: false,
        }
    }

    /// Sets the replace-original flag.
    pub fn with_replace_original(mut self, replace: bool) -> Self {
        self.replace_original = replace;
        self
    }

    /// Sets the output destination.
    pub fn with_output_destination(mut self, dest: impl Into<PathBuf>) -> Self {
        self.output_destination = Some(dest.into());
        self
    }
}

/// A job that passed validation. Only [`validate`](super::validate) builds one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedJob {
    pub(super) inputs: Vec<PathBuf>,
    pub(super) speed: SpeedFactor,
    pub(super) mode: JobMode,
    pub(super) output_destination: Option<PathBuf>,
    pub(super) replace_original: bool,
}

impl ValidatedJob {
    /// Inputs to process. Exactly one for previews.
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    pub fn speed(&self) -> SpeedFactor {
        self.speed
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }

    /// Output directory for batches; optional preview directory for previews.
    pub fn output_destination(&self) -> Option<&Path> {
        self.output_destination.as_deref()
    }

    /// Always `false` for previews.
    pub fn replace_original(&self) -> bool {
        self.replace_original
    }

    /// Creates the directory this job writes into and returns it.
    ///
    /// Batches use their output destination. Previews use theirs when given,
    /// otherwise `preview_fallback`.
    pub async fn prepare_output_dir(
        &self,
        preview_fallback: &Path,
    ) -> Result<PathBuf, FilesystemError> {
        // validate() guarantees a destination for batches
        let dir = self
            .output_destination
            .clone()
            .unwrap_or_else(|| preview_fallback.to_path_buf());

        if let Ok(meta) = tokio::fs::metadata(&dir).await {
            if !meta.is_dir() {
                return Err(FilesystemError::NotADirectory { path: dir });
            }
            return Ok(dir);
        }

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| FilesystemError::CreateOutputDir {
                path: dir.clone(),
                source,
            })?;

        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_factor_range() {
        assert!(SpeedFactor::new(0.5).is_ok());
        assert!(SpeedFactor::new(100.0).is_ok());
        assert!(SpeedFactor::new(0.49).is_err());
        assert!(SpeedFactor::new(100.5).is_err());
        assert!(SpeedFactor::new(0.0).is_err());
        assert!(SpeedFactor::new(-1.5).is_err());
        assert!(SpeedFactor::new(f64::NAN).is_err());
        assert!(SpeedFactor::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_speed_factor_parse() {
        assert_eq!("1.84x".parse::<SpeedFactor>().unwrap().value(), 1.84);
        assert_eq!("2".parse::<SpeedFactor>().unwrap().value(), 2.0);
        assert_eq!(" 1.5X ".parse::<SpeedFactor>().unwrap().value(), 1.5);
        assert!(matches!(
            "fast".parse::<SpeedFactor>(),
            Err(ValidationError::UnparsableSpeedFactor(_))
        ));
        assert!(matches!(
            "0.1x".parse::<SpeedFactor>(),
            Err(ValidationError::InvalidSpeedFactor { .. })
        ));
    }

    #[test]
    fn test_speed_factor_display_and_presets() {
        assert_eq!(SpeedFactor::default().to_string(), "1.84x");
        for preset in SpeedFactor::PRESETS {
            assert!(SpeedFactor::new(preset).is_ok());
        }
    }

    #[test]
    fn test_speed_factor_serde_validates() {
        let speed: SpeedFactor = serde_json::from_str("2.5").unwrap();
        assert_eq!(speed.value(), 2.5);
        assert!(serde_json::from_str::<SpeedFactor>("250.0").is_err());
        assert_eq!(serde_json::to_string(&speed).unwrap(), "2.5");
    }

    #[test]
    fn test_descriptor_builders() {
        let job = JobDescriptor::batch(["/a.mp3", "/b.mp3"], 1.5, "/out")
            .with_replace_original(true);
        assert_eq!(job.mode, JobMode::Batch);
        assert_eq!(job.inputs.len(), 2);
        assert_eq!(job.output_destination, Some(PathBuf::from("/out")));
        assert!(job.replace_original);

        let preview = JobDescriptor::preview(["/a.mp3"], 2.0);
        assert_eq!(preview.mode, JobMode::Preview);
        assert!(preview.output_destination.is_none());
    }

    #[test]
    fn test_descriptor_serialization() {
        let job = JobDescriptor::batch(["/a.mp3"], 1.84, "/out");
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains("\"mode\":\"batch\""));
        let parsed: JobDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, job);
    }
}
