//! Overwrite a source file with its converted output.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("converted file {} is missing", .path.display())]
    OutputMissing { path: PathBuf },

    #[error("could not overwrite {}: {source}", .original.display())]
    CopyFailed {
        original: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Copies `output` over `original`, contents and permissions.
///
/// The converted file stays in place. Returns the number of bytes copied.
pub async fn replace_original(output: &Path, original: &Path) -> Result<u64, ReplaceError> {
    if !tokio::fs::try_exists(output).await.unwrap_or(false) {
        return Err(ReplaceError::OutputMissing {
            path: output.to_path_buf(),
        });
    }

    tokio::fs::copy(output, original)
        .await
        .map_err(|source| ReplaceError::CopyFailed {
            original: original.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn test_replace_overwrites_original() {
        let temp = TempDir::new().unwrap();
        let original = temp.path().join("talk.mp3");
        let output = temp.path().join("out.mp3");
        std::fs::write(&original, b"slow").unwrap();
        std::fs::write(&output, b"fast audio").unwrap();

        let copied = assert_ok!(replace_original(&output, &original).await);
        assert_eq!(copied, 10);
        assert_eq!(std::fs::read(&original).unwrap(), b"fast audio");
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_replace_missing_output() {
        let temp = TempDir::new().unwrap();
        let original = temp.path().join("talk.mp3");
        std::fs::write(&original, b"slow").unwrap();

        let err = assert_err!(replace_original(&temp.path().join("gone.mp3"), &original).await);
        assert!(matches!(err, ReplaceError::OutputMissing { .. }));
        assert_eq!(std::fs::read(&original).unwrap(), b"slow");
    }

    #[tokio::test]
    async fn test_replace_onto_directory_fails() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.mp3");
        std::fs::write(&output, b"fast").unwrap();
        let blocker = temp.path().join("talk.mp3");
        std::fs::create_dir(&blocker).unwrap();

        let err = assert_err!(replace_original(&output, &blocker).await);
        assert!(matches!(err, ReplaceError::CopyFailed { .. }));
        assert!(err.to_string().contains("talk.mp3"));
    }
}
