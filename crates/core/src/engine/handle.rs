use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::job::JobMode;

use super::error::EngineError;
use super::events::EngineEvent;
use super::types::{RunId, RunSummary};

/// Shared cancellation flag for one run.
///
/// Checked between files. A transcode already in flight runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Caller's handle to a submitted run.
///
/// Dropping the handle does not stop the run.
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    mode: JobMode,
    cancel: CancelToken,
    events: mpsc::UnboundedReceiver<EngineEvent>,
    task: JoinHandle<RunSummary>,
}

impl RunHandle {
    pub(crate) fn new(
        id: RunId,
        mode: JobMode,
        cancel: CancelToken,
        events: mpsc::UnboundedReceiver<EngineEvent>,
        task: JoinHandle<RunSummary>,
    ) -> Self {
        Self {
            id,
            mode,
            cancel,
            events,
            task,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn mode(&self) -> JobMode {
        self.mode
    }

    /// Asks the run to stop before its next file.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this run, for use from another task.
    pub fn canceller(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next event of this run, or `None` once the run has ended.
    pub async fn next_event(&mut self) -> Option<EngineEvent> {
        self.events.recv().await
    }

    /// Waits for the run to end, returning its remaining events and summary.
    pub async fn finish(self) -> Result<(Vec<EngineEvent>, RunSummary), EngineError> {
        let Self {
            mut events, task, ..
        } = self;

        let mut collected = Vec::new();
        while let Some(event) = events.recv().await {
            collected.push(event);
        }

        let summary = task.await?;
        Ok((collected, summary))
    }

    /// Waits for the run to end, discarding events not yet read.
    pub async fn wait(self) -> Result<RunSummary, EngineError> {
        Ok(self.task.await?)
    }
}
