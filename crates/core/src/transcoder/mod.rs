//! Transcoder module wrapping the external tempo-change process.
//!
//! This module provides the `Transcoder` trait and an FFmpeg implementation
//! that runs `ffmpeg -i <in> -filter:a atempo=<factor> -y <out>` once per file.
//! The process exit status is the only success signal; stderr is captured
//! for failure messages and never parsed for control decisions.
//!
//! # Example
//!
//! ```ignore
//! use speedupper_core::transcoder::{FfmpegTranscoder, Transcoder, TranscodeRequest};
//!
//! let transcoder = FfmpegTranscoder::with_defaults();
//! transcoder.validate().await?;
//!
//! let request = TranscodeRequest::new("/music/lesson.mp3", "/out/lesson.mp3", 1.84);
//! let result = transcoder.transcode(request).await?;
//! println!("Wrote {} bytes in {} ms", result.output_size_bytes, result.duration_ms);
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::TranscoderConfig;
pub use error::TranscoderError;
pub use ffmpeg::FfmpegTranscoder;
pub use traits::Transcoder;
pub use types::{TranscodeRequest, TranscodeResult, MAX_TEMPO, MIN_TEMPO};
