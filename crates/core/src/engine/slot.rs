//! Engine-wide run slots: one batch, one preview.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::job::JobMode;

use super::error::SubmitError;
use super::handle::CancelToken;
use super::types::RunId;

/// The active preview and the token that supersedes it.
type PreviewSlot = Option<(RunId, CancelToken)>;

#[derive(Clone, Default)]
pub(crate) struct RunSlots {
    batch: Arc<RwLock<Option<RunId>>>,
    preview: Arc<RwLock<PreviewSlot>>,
    /// File of the most recent preview that became ready.
    last_preview: Arc<RwLock<Option<PathBuf>>>,
}

impl RunSlots {
    pub(crate) async fn active_batch(&self) -> Option<RunId> {
        *self.batch.read().await
    }

    pub(crate) async fn active_preview(&self) -> Option<RunId> {
        self.preview.read().await.as_ref().map(|(id, _)| *id)
    }

    /// Claims the slot for `mode`.
    ///
    /// A batch is rejected while another batch holds the slot. A preview
    /// takes the slot over and cancels the one it replaces.
    pub(crate) async fn claim(
        &self,
        mode: JobMode,
        run_id: RunId,
        cancel: &CancelToken,
    ) -> Result<SlotGuard, SubmitError> {
        match mode {
            JobMode::Batch => {
                let mut slot = self.batch.write().await;
                if let Some(active) = *slot {
                    warn!("Rejected batch: batch {} is still running", active);
                    return Err(SubmitError::BatchInProgress { run_id: active });
                }
                *slot = Some(run_id);
            }
            JobMode::Preview => {
                let mut slot = self.preview.write().await;
                if let Some((previous, token)) = slot.replace((run_id, cancel.clone())) {
                    info!("Preview {} supersedes preview {}", run_id, previous);
                    token.cancel();
                }
            }
        }

        Ok(SlotGuard {
            slots: self.clone(),
            mode,
            run_id,
            released: AtomicBool::new(false),
        })
    }

    async fn release(&self, mode: JobMode, run_id: RunId) {
        match mode {
            JobMode::Batch => clear_batch(&mut *self.batch.write().await, run_id),
            JobMode::Preview => clear_preview(&mut *self.preview.write().await, run_id),
        }
    }

    /// Same as `release` without waiting. Returns false if the lock is busy.
    fn try_release(&self, mode: JobMode, run_id: RunId) -> bool {
        match mode {
            JobMode::Batch => match self.batch.try_write() {
                Ok(mut slot) => clear_batch(&mut slot, run_id),
                Err(_) => return false,
            },
            JobMode::Preview => match self.preview.try_write() {
                Ok(mut slot) => clear_preview(&mut slot, run_id),
                Err(_) => return false,
            },
        }
        true
    }
}

fn clear_batch(slot: &mut Option<RunId>, run_id: RunId) {
    if *slot == Some(run_id) {
        *slot = None;
    }
}

fn clear_preview(slot: &mut PreviewSlot, run_id: RunId) {
    if slot.as_ref().map(|(id, _)| *id) == Some(run_id) {
        *slot = None;
    }
}

/// A run's claim on its slot.
///
/// Released explicitly before the run's terminal event, or on drop if the
/// run never got there. A newer run holding the slot is left alone.
pub(crate) struct SlotGuard {
    slots: RunSlots,
    mode: JobMode,
    run_id: RunId,
    released: AtomicBool,
}

impl SlotGuard {
    pub(crate) async fn release(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.slots.release(self.mode, self.run_id).await;
    }

    /// Records `path` as the latest ready preview and returns the one it
    /// replaces.
    pub(crate) async fn replace_last_preview(&self, path: PathBuf) -> Option<PathBuf> {
        self.slots.last_preview.write().await.replace(path)
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        if self.slots.try_release(self.mode, self.run_id) {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let slots = self.slots.clone();
                let (mode, run_id) = (self.mode, self.run_id);
                runtime.spawn(async move { slots.release(mode, run_id).await });
            }
            Err(_) => warn!(
                "Run {} dropped outside a runtime; its slot stays claimed",
                self.run_id
            ),
        }
    }
}
