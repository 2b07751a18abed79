//! Conversion engine.
//!
//! [`ConversionEngine::submit`] validates a [`JobDescriptor`](crate::job::JobDescriptor),
//! creates its output directory and spawns the run. The run converts its
//! inputs one at a time, in order, and reports through [`EngineEvent`]s:
//! - per run, on the [`RunHandle`] returned by `submit`
//! - engine-wide, tagged with the run id, via [`ConversionEngine::subscribe`]

mod config;
mod error;
mod events;
mod handle;
mod progress;
mod replace;
mod runner;
mod service;
mod slot;
mod types;

pub use config::EngineConfig;
pub use error::{EngineError, SubmitError};
pub use events::{EngineEvent, RunEventEnvelope};
pub use handle::{CancelToken, RunHandle};
pub use progress::ProgressState;
pub use replace::{replace_original, ReplaceError};
pub use service::ConversionEngine;
pub use types::{ConversionResult, FileOutcome, RunId, RunSummary, RunTerminal, SkipReason};
