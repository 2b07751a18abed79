//! Testing utilities and a mock transcoder.
//!
//! Lets the engine be exercised end to end without an ffmpeg binary.
//!
//! # Example
//!
//! ```rust,ignore
//! use speedupper_core::testing::{fixtures, MockTranscoder};
//!
//! let temp = tempfile::TempDir::new()?;
//! let input = fixtures::audio_file(temp.path(), "talk.mp3");
//! let transcoder = MockTranscoder::new();
//! ```

mod mock_transcoder;

pub use mock_transcoder::{
    AfterTranscodeHook, MockTranscoder, RecordedTranscode, MOCK_OUTPUT_PREFIX,
};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    /// Write a small fake audio file named `name` into `dir`.
    ///
    /// The content is the file name, so outputs can be traced to inputs.
    pub fn audio_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Err(e) = std::fs::write(&path, name.as_bytes()) {
            panic!("failed to write fixture {}: {}", path.display(), e);
        }
        path
    }

    /// Expected mock output for a fixture written by [`audio_file`].
    pub fn converted_bytes(name: &str) -> Vec<u8> {
        let mut bytes = super::MOCK_OUTPUT_PREFIX.to_vec();
        bytes.extend_from_slice(name.as_bytes());
        bytes
    }
}
