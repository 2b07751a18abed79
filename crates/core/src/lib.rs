pub mod config;
pub mod engine;
pub mod job;
pub mod metrics;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, LoggingConfig,
};
pub use engine::{
    CancelToken, ConversionEngine, ConversionResult, EngineConfig, EngineError, EngineEvent,
    FileOutcome, RunHandle, RunId, RunSummary, RunTerminal, SkipReason, SubmitError,
};
pub use job::{JobDescriptor, JobMode, SpeedFactor, ValidationError};
pub use transcoder::{FfmpegTranscoder, Transcoder, TranscoderConfig, TranscoderError};
