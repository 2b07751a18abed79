use thiserror::Error;

use crate::job::{FilesystemError, ValidationError};

use super::types::RunId;

/// Why a job was not started.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("invalid job: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),

    /// Only one batch may run at a time.
    #[error("batch {run_id} is still running")]
    BatchInProgress { run_id: RunId },
}

/// Failure while collecting a run's result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The run task panicked or was aborted.
    #[error("run task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}
