//! Error types for job validation and preparation.

use std::path::PathBuf;
use thiserror::Error;

/// A job descriptor was rejected before any file was touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// No input files were given.
    #[error("input list is empty")]
    EmptyInputList,

    /// Speed factor is not a finite number within the accepted tempo range.
    #[error("invalid speed factor {value}: must be between {min} and {max}")]
    InvalidSpeedFactor { value: f64, min: f64, max: f64 },

    /// Speed factor text could not be parsed as a number.
    #[error("cannot parse speed factor from '{0}'")]
    UnparsableSpeedFactor(String),

    /// Batch mode requires an output directory.
    #[error("batch mode requires an output destination")]
    MissingOutputDestination,
}

/// The output location of a job could not be prepared.
///
/// Fatal to the whole run; raised before any file is processed.
#[derive(Debug, Error)]
pub enum FilesystemError {
    /// Output directory does not exist and could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output destination exists but is not a directory.
    #[error("output destination is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidSpeedFactor {
            value: 0.2,
            min: 0.5,
            max: 100.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid speed factor 0.2: must be between 0.5 and 100"
        );
        assert_eq!(
            ValidationError::MissingOutputDestination.to_string(),
            "batch mode requires an output destination"
        );
    }

    #[test]
    fn test_filesystem_error_display() {
        let err = FilesystemError::NotADirectory {
            path: PathBuf::from("/tmp/file.mp3"),
        };
        assert_eq!(
            err.to_string(),
            "output destination is not a directory: /tmp/file.mp3"
        );
    }
}
