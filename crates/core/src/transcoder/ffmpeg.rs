//! FFmpeg-based transcoder implementation.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

use super::config::TranscoderConfig;
use super::error::TranscoderError;
use super::traits::Transcoder;
use super::types::{TranscodeRequest, TranscodeResult};

/// FFmpeg-based transcoder applying the `atempo` audio filter.
pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    /// Creates a new FFmpeg transcoder with the given configuration.
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }

    /// Creates a transcoder with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(TranscoderConfig::default())
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &TranscoderConfig {
        &self.config
    }

    /// Builds ffmpeg arguments for a tempo change.
    fn build_args(&self, request: &TranscodeRequest) -> Vec<String> {
        let mut args = vec![
            // Overwrite (or refuse to overwrite) an existing output
            if request.overwrite { "-y" } else { "-n" }.to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            request.input_path.to_string_lossy().to_string(),
            "-filter:a".to_string(),
            request.filter_arg(),
            "-loglevel".to_string(),
            self.config.log_level.clone(),
        ];

        args.extend(self.config.extra_args.iter().cloned());

        args.push(request.output_path.to_string_lossy().to_string());

        args
    }

    fn map_spawn_error(&self, e: std::io::Error) -> TranscoderError {
        if e.kind() == std::io::ErrorKind::NotFound {
            TranscoderError::BinaryNotFound {
                path: self.config.ffmpeg_path.clone(),
            }
        } else {
            TranscoderError::Io(e)
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn transcode(
        &self,
        request: TranscodeRequest,
    ) -> Result<TranscodeResult, TranscoderError> {
        let start = Instant::now();
        let args = self.build_args(&request);
        debug!("Running {:?} {}", self.config.ffmpeg_path, args.join(" "));

        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Keep a terminal Ctrl-C away from ffmpeg. Cancellation waits for the
        // current file, so only the timeout or a drop may kill the child.
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|e| self.map_spawn_error(e))?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = match timeout(
            Duration::from_secs(self.config.timeout_secs),
            child.wait_with_output(),
        )
        .await
        {
            Ok(output) => output?,
            Err(_) => {
                return Err(TranscoderError::Timeout {
                    timeout_secs: self.config.timeout_secs,
                })
            }
        };

        if !output.status.success() {
            return Err(TranscoderError::process_failed(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        let output_size_bytes = tokio::fs::metadata(&request.output_path)
            .await
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(TranscodeResult {
            output_path: request.output_path,
            output_size_bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<(), TranscoderError> {
        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| self.map_spawn_error(e))?;

        if !output.status.success() {
            return Err(TranscoderError::process_failed(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr),
            ));
        }

        Ok(())
    }
}
