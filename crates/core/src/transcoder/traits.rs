//! Trait definitions for the transcoder module.

use async_trait::async_trait;

use super::error::TranscoderError;
use super::types::{TranscodeRequest, TranscodeResult};

/// An external process that changes the tempo of one audio file.
///
/// Success or failure is decided by the process exit status only.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Transcodes `request.input_path` into `request.output_path`.
    async fn transcode(&self, request: TranscodeRequest)
        -> Result<TranscodeResult, TranscoderError>;

    /// Validates that the transcoder is installed and runnable.
    async fn validate(&self) -> Result<(), TranscoderError>;
}
