//! Conversion engine: accepts jobs and runs them in the background.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{error, warn};

use crate::job::{validate, JobDescriptor};
use crate::transcoder::Transcoder;

use super::config::EngineConfig;
use super::error::SubmitError;
use super::events::RunEventEnvelope;
use super::handle::{CancelToken, RunHandle};
use super::runner::{self, EventEmitter, RunContext};
use super::slot::RunSlots;
use super::types::RunId;

/// Runs conversion jobs against a transcoder.
///
/// At most one batch runs at a time; a second one is rejected. A new
/// preview cancels the one in flight.
pub struct ConversionEngine<T: Transcoder> {
    config: EngineConfig,
    transcoder: Arc<T>,
    events_tx: broadcast::Sender<RunEventEnvelope>,
    slots: RunSlots,
}

impl<T: Transcoder + 'static> ConversionEngine<T> {
    /// Creates a new engine.
    pub fn new(config: EngineConfig, transcoder: T) -> Self {
        let (events_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));

        Self {
            config,
            transcoder: Arc::new(transcoder),
            events_tx,
            slots: RunSlots::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transcoder(&self) -> &T {
        &self.transcoder
    }

    /// Receives the events of every run started after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEventEnvelope> {
        self.events_tx.subscribe()
    }

    /// The batch currently running, if any.
    ///
    /// A run gives up its slot just before its terminal event, so a caller
    /// reacting to that event may submit the next job right away.
    pub async fn active_batch(&self) -> Option<RunId> {
        self.slots.active_batch().await
    }

    /// The preview currently running, if any.
    pub async fn active_preview(&self) -> Option<RunId> {
        self.slots.active_preview().await
    }

    /// Validates a job and starts it in the background.
    ///
    /// Returns once the output directory exists and the run is spawned.
    /// Nothing is written and no event is emitted when this fails.
    pub async fn submit(&self, descriptor: JobDescriptor) -> Result<RunHandle, SubmitError> {
        let job = validate(&descriptor).map_err(|e| {
            warn!("Rejected job: {}", e);
            e
        })?;

        let run_id = RunId::new();
        let mode = job.mode();
        let cancel = CancelToken::new();
        let slot = self.slots.claim(mode, run_id, &cancel).await?;

        let output_dir = match job.prepare_output_dir(&self.config.preview_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                error!("Cannot start run {}: {}", run_id, e);
                slot.release().await;
                return Err(e.into());
            }
        };

        let (tx, rx) = mpsc::unbounded_channel();
        let ctx = RunContext {
            run_id,
            job,
            output_dir,
            transcoder: Arc::clone(&self.transcoder),
            cancel: cancel.clone(),
            emitter: EventEmitter::new(run_id, tx, self.events_tx.clone()),
            slot,
        };

        let task = tokio::spawn(runner::run(ctx));

        Ok(RunHandle::new(run_id, mode, cancel, rx, task))
    }
}
