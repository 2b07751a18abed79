//! Types for the conversion engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::job::JobMode;

/// Identifies one submission; every event and summary carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Allocates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Why an input was skipped without invoking the transcoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The input no longer exists.
    FileNotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound => f.write_str("file not found"),
        }
    }
}

/// What happened to a single input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted,
    Failed { reason: String },
    Skipped { reason: SkipReason },
}

impl FileOutcome {
    /// Label used in metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Converted => "converted",
            Self::Failed { .. } => "failed",
            Self::Skipped { .. } => "skipped",
        }
    }
}

/// Per-input result of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The input as submitted.
    pub source_path: PathBuf,
    pub outcome: FileOutcome,
    /// Present iff the outcome is `Converted`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
    /// Non-fatal problem attached to a converted file (replace-original failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ConversionResult {
    pub fn converted(
        source_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        warning: Option<String>,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: FileOutcome::Converted,
            output_path: Some(output_path.into()),
            warning,
        }
    }

    pub fn failed(source_path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: FileOutcome::Failed {
                reason: reason.into(),
            },
            output_path: None,
            warning: None,
        }
    }

    pub fn skipped(source_path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self {
            source_path: source_path.into(),
            outcome: FileOutcome::Skipped { reason },
            output_path: None,
            warning: None,
        }
    }

    /// Base name of the source, as reported in events.
    pub fn name(&self) -> String {
        display_name(&self.source_path)
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, FileOutcome::Converted)
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunTerminal {
    /// Batch finished every input.
    Completed { output_directory: PathBuf },
    /// Preview file is ready to be played.
    PreviewReady { path: PathBuf },
    /// Preview input was missing or failed to convert.
    PreviewFailed,
    /// Cancelled (or, for previews, superseded) before finishing.
    Cancelled,
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub mode: JobMode,
    /// One entry per input that was dispatched, in input order.
    pub results: Vec<ConversionResult>,
    pub processed: usize,
    pub total: usize,
    pub terminal: RunTerminal,
}

impl RunSummary {
    pub fn converted_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_converted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, FileOutcome::Skipped { .. }))
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.results.iter().filter(|r| r.warning.is_some()).count()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.terminal, RunTerminal::Cancelled)
    }
}

/// File name of `path`, falling back to the whole path.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
