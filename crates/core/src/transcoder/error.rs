//! Error types for the transcoder module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while transcoding a single file.
#[derive(Debug, Error)]
pub enum TranscoderError {
    /// Transcoder binary not found.
    #[error("transcoder binary not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// The process ran but exited unsuccessfully.
    #[error("transcoder exited with {}", describe_code(.code))]
    ProcessFailed {
        code: Option<i32>,
        stderr: Option<String>,
    },

    /// The process did not finish in time and was killed.
    #[error("transcode timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// The output path could not be allocated or used.
    #[error("output path unavailable: {reason}")]
    OutputPathUnavailable { reason: String },

    /// I/O error while spawning or talking to the process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl TranscoderError {
    /// Creates a process failure from an exit code and captured stderr.
    pub fn process_failed(code: Option<i32>, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        Self::ProcessFailed {
            code,
            stderr: if stderr.trim().is_empty() {
                None
            } else {
                Some(stderr)
            },
        }
    }

    /// Creates an output path error.
    pub fn output_unavailable(reason: impl Into<String>) -> Self {
        Self::OutputPathUnavailable {
            reason: reason.into(),
        }
    }

    /// Human-readable reason used in per-file failure events.
    ///
    /// Appends the last line of stderr when the process left one.
    pub fn reason(&self) -> String {
        match self {
            Self::ProcessFailed {
                stderr: Some(stderr),
                ..
            } => match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
                Some(last) => format!("{}: {}", self, last.trim()),
                None => self.to_string(),
            },
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_failed_display() {
        let err = TranscoderError::process_failed(Some(1), "");
        assert_eq!(err.to_string(), "transcoder exited with code 1");
        assert!(matches!(
            err,
            TranscoderError::ProcessFailed { stderr: None, .. }
        ));
    }

    #[test]
    fn test_process_failed_signal() {
        let err = TranscoderError::process_failed(None, "");
        assert_eq!(
            err.to_string(),
            "transcoder exited with no exit code (terminated by signal)"
        );
    }

    #[test]
    fn test_reason_includes_last_stderr_line() {
        let err = TranscoderError::process_failed(
            Some(1),
            "Input #0, mp3\nbroken.mp3: Invalid data found when processing input\n\n",
        );
        assert_eq!(
            err.reason(),
            "transcoder exited with code 1: broken.mp3: Invalid data found when processing input"
        );
    }

    #[test]
    fn test_timeout_reason() {
        let err = TranscoderError::Timeout { timeout_secs: 30 };
        assert_eq!(err.reason(), "transcode timed out after 30 seconds");
    }
}
