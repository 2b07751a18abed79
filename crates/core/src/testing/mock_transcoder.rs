//! Mock transcoder for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, Semaphore};

use crate::transcoder::{TranscodeRequest, TranscodeResult, Transcoder, TranscoderError};

/// Prefix the mock writes ahead of the input bytes.
pub const MOCK_OUTPUT_PREFIX: &[u8] = b"converted:";

/// Callback run after a successful mock transcode.
pub type AfterTranscodeHook = Arc<dyn Fn(&TranscodeRequest) + Send + Sync>;

/// A recorded transcode for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTranscode {
    /// The request that was submitted.
    pub request: TranscodeRequest,
    /// Whether the transcode succeeded.
    pub success: bool,
}

/// Mock implementation of the Transcoder trait.
///
/// Provides controllable behavior for testing:
/// - Track requests for assertions
/// - Fail chosen inputs with a non-zero exit status
/// - Delay or pause transcodes so tests can act mid-run
/// - Run a hook after each successful transcode
///
/// A successful transcode writes `converted:` followed by the input's bytes
/// to the output path.
///
/// # Example
///
/// ```rust,ignore
/// use speedupper_core::testing::MockTranscoder;
///
/// let transcoder = MockTranscoder::new();
/// transcoder.fail_on("/music/broken.mp3").await;
///
/// let engine = ConversionEngine::new(EngineConfig::default(), transcoder.clone());
/// // ... submit a job ...
/// assert_eq!(transcoder.call_count().await, 3);
/// ```
#[derive(Clone)]
pub struct MockTranscoder {
    /// Requests in the order they started.
    requests: Arc<RwLock<Vec<RecordedTranscode>>>,
    /// Inputs that fail with exit code 1.
    failing_inputs: Arc<RwLock<HashSet<PathBuf>>>,
    /// Simulated transcode duration in milliseconds.
    delay_ms: Arc<RwLock<u64>>,
    /// When set, every transcode waits for a permit.
    gate: Arc<RwLock<Option<Arc<Semaphore>>>>,
    after_transcode: Arc<RwLock<Option<AfterTranscodeHook>>>,
    /// Error returned by `validate`.
    validate_error: Arc<RwLock<Option<String>>>,
}

impl fmt::Debug for MockTranscoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTranscoder").finish_non_exhaustive()
    }
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a new mock transcoder that succeeds immediately.
    pub fn new() -> Self {
        Self {
            requests: Arc::new(RwLock::new(Vec::new())),
            failing_inputs: Arc::new(RwLock::new(HashSet::new())),
            delay_ms: Arc::new(RwLock::new(0)),
            gate: Arc::new(RwLock::new(None)),
            after_transcode: Arc::new(RwLock::new(None)),
            validate_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all recorded transcodes, including ones still in progress.
    pub async fn recorded_requests(&self) -> Vec<RecordedTranscode> {
        self.requests.read().await.clone()
    }

    /// Number of transcodes started.
    pub async fn call_count(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Make transcodes of `input` fail.
    pub async fn fail_on(&self, input: impl AsRef<Path>) {
        self.failing_inputs
            .write()
            .await
            .insert(input.as_ref().to_path_buf());
    }

    /// Set the simulated transcode duration.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay_ms.write().await = delay.as_millis() as u64;
    }

    /// Hold every subsequent transcode until [`release`](Self::release) is called.
    pub async fn pause(&self) {
        *self.gate.write().await = Some(Arc::new(Semaphore::new(0)));
    }

    /// Let `count` held transcodes proceed.
    pub async fn release(&self, count: usize) {
        if let Some(gate) = self.gate.read().await.as_ref() {
            gate.add_permits(count);
        }
    }

    /// Run `hook` after each successful transcode, before it returns.
    pub async fn set_after_transcode<F>(&self, hook: F)
    where
        F: Fn(&TranscodeRequest) + Send + Sync + 'static,
    {
        *self.after_transcode.write().await = Some(Arc::new(hook));
    }

    /// Make `validate` fail with the given message.
    pub async fn set_validate_error(&self, message: impl Into<String>) {
        *self.validate_error.write().await = Some(message.into());
    }

    async fn wait_for_gate(&self) {
        let gate = self.gate.read().await.clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    async fn write_output(request: &TranscodeRequest) -> Result<u64, TranscoderError> {
        if !request.overwrite && tokio::fs::try_exists(&request.output_path).await? {
            return Err(TranscoderError::process_failed(
                Some(1),
                format!("File '{}' already exists", request.output_path.display()),
            ));
        }

        let input = tokio::fs::read(&request.input_path).await?;
        let mut output = MOCK_OUTPUT_PREFIX.to_vec();
        output.extend_from_slice(&input);
        tokio::fs::write(&request.output_path, &output).await?;
        Ok(output.len() as u64)
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn transcode(
        &self,
        request: TranscodeRequest,
    ) -> Result<TranscodeResult, TranscoderError> {
        let index = {
            let mut requests = self.requests.write().await;
            requests.push(RecordedTranscode {
                request: request.clone(),
                success: false,
            });
            requests.len() - 1
        };

        self.wait_for_gate().await;

        let delay_ms = *self.delay_ms.read().await;
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        if self
            .failing_inputs
            .read()
            .await
            .contains(&request.input_path)
        {
            return Err(TranscoderError::process_failed(
                Some(1),
                "mock transcoder failure",
            ));
        }

        let output_size_bytes = Self::write_output(&request).await?;

        let hook = self.after_transcode.read().await.clone();
        if let Some(hook) = hook {
            hook(&request);
        }

        if let Some(recorded) = self.requests.write().await.get_mut(index) {
            recorded.success = true;
        }

        Ok(TranscodeResult {
            output_path: request.output_path,
            output_size_bytes,
            duration_ms: delay_ms,
        })
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        match self.validate_error.read().await.as_ref() {
            Some(message) => Err(TranscoderError::process_failed(None, message.clone())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mock_writes_marked_output() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp3");
        let output = temp.path().join("out.mp3");
        std::fs::write(&input, b"audio").unwrap();

        let mock = MockTranscoder::new();
        let result = mock
            .transcode(TranscodeRequest::new(&input, &output, 2.0))
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"converted:audio");
        assert_eq!(result.output_size_bytes, 15);
        let recorded = mock.recorded_requests().await;
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].success);
        assert_eq!(recorded[0].request.tempo, 2.0);
    }

    #[tokio::test]
    async fn test_mock_failure() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp3");
        std::fs::write(&input, b"audio").unwrap();

        let mock = MockTranscoder::new();
        mock.fail_on(&input).await;
        let err = mock
            .transcode(TranscodeRequest::new(&input, temp.path().join("out.mp3"), 2.0))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TranscoderError::ProcessFailed { code: Some(1), .. }
        ));
        assert!(!temp.path().join("out.mp3").exists());
        assert!(!mock.recorded_requests().await[0].success);
    }

    #[tokio::test]
    async fn test_mock_refuses_existing_output_without_overwrite() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp3");
        let output = temp.path().join("out.mp3");
        std::fs::write(&input, b"audio").unwrap();
        std::fs::write(&output, b"old").unwrap();

        let mut request = TranscodeRequest::new(&input, &output, 2.0);
        request.overwrite = false;
        let mock = MockTranscoder::new();
        assert!(mock.transcode(request).await.is_err());
        assert_eq!(std::fs::read(&output).unwrap(), b"old");
    }

    #[tokio::test]
    async fn test_mock_pause_and_release() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.mp3");
        let output = temp.path().join("out.mp3");
        std::fs::write(&input, b"audio").unwrap();

        let mock = MockTranscoder::new();
        mock.pause().await;

        let task = {
            let mock = mock.clone();
            let request = TranscodeRequest::new(&input, &output, 2.0);
            tokio::spawn(async move { mock.transcode(request).await })
        };

        while mock.call_count().await == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!output.exists());

        mock.release(1).await;
        task.await.unwrap().unwrap();
        assert!(output.exists());
    }

    #[tokio::test]
    async fn test_mock_validate() {
        let mock = MockTranscoder::new();
        assert!(mock.validate().await.is_ok());
        mock.set_validate_error("no binary").await;
        assert!(mock.validate().await.is_err());
    }
}
