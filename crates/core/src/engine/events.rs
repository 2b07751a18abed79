//! Events published by the conversion engine.
//!
//! Per file, a run emits one outcome event (`FileConverted`, `FileFailed`
//! or `FileSkipped`) followed by one `ProgressUpdated`. A batch ends with
//! `RunComplete` or `RunCancelled`; a preview ends with `PreviewReady`,
//! its failed/skipped file, or `RunCancelled`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::types::{ConversionResult, FileOutcome, RunId, SkipReason};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Another input was handled (converted, failed or skipped).
    ProgressUpdated {
        processed: usize,
        total: usize,
        percent: u8,
    },
    FileConverted {
        name: String,
        output_path: PathBuf,
        /// Set when replacing the original failed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    FileFailed {
        name: String,
        reason: String,
    },
    FileSkipped {
        name: String,
        reason: SkipReason,
    },
    PreviewReady {
        path: PathBuf,
    },
    RunComplete {
        output_directory: PathBuf,
    },
    RunCancelled,
}

impl EngineEvent {
    /// Outcome event for a per-file result.
    pub fn from_result(result: &ConversionResult) -> Self {
        let name = result.name();
        match &result.outcome {
            FileOutcome::Converted => Self::FileConverted {
                name,
                output_path: result.output_path.clone().unwrap_or_default(),
                warning: result.warning.clone(),
            },
            FileOutcome::Failed { reason } => Self::FileFailed {
                name,
                reason: reason.clone(),
            },
            FileOutcome::Skipped { reason } => Self::FileSkipped {
                name,
                reason: *reason,
            },
        }
    }

    /// Whether this event always ends a run.
    ///
    /// A failed or skipped preview file also ends its run, which this
    /// cannot tell from the event alone.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::PreviewReady { .. } | Self::RunComplete { .. } | Self::RunCancelled
        )
    }
}

/// An event tagged with its run, as seen by engine-wide subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEventEnvelope {
    pub run_id: RunId,
    pub timestamp: DateTime<Utc>,
    pub event: EngineEvent,
}
