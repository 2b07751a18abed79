//! The per-run conversion loop.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::job::{JobMode, ValidatedJob};
use crate::metrics;
use crate::transcoder::{TranscodeRequest, Transcoder, TranscoderError};

use super::events::{EngineEvent, RunEventEnvelope};
use super::handle::CancelToken;
use super::progress::ProgressState;
use super::replace::replace_original;
use super::slot::SlotGuard;
use super::types::{ConversionResult, RunId, RunSummary, RunTerminal, SkipReason};

/// Extension for preview files when the input has none.
const DEFAULT_PREVIEW_EXTENSION: &str = "mp3";

/// Sends a run's events to its handle and to engine-wide subscribers.
pub(crate) struct EventEmitter {
    run_id: RunId,
    tx: mpsc::UnboundedSender<EngineEvent>,
    broadcast: broadcast::Sender<RunEventEnvelope>,
}

impl EventEmitter {
    pub(crate) fn new(
        run_id: RunId,
        tx: mpsc::UnboundedSender<EngineEvent>,
        broadcast: broadcast::Sender<RunEventEnvelope>,
    ) -> Self {
        Self {
            run_id,
            tx,
            broadcast,
        }
    }

    fn emit(&self, event: EngineEvent) {
        debug!("Run {} event: {:?}", self.run_id, event);

        // Nobody listening is fine on both channels
        let _ = self.broadcast.send(RunEventEnvelope {
            run_id: self.run_id,
            timestamp: Utc::now(),
            event: event.clone(),
        });
        let _ = self.tx.send(event);
    }
}

/// Everything a spawned run needs.
pub(crate) struct RunContext<T: Transcoder + ?Sized> {
    pub run_id: RunId,
    pub job: ValidatedJob,
    pub output_dir: PathBuf,
    pub transcoder: Arc<T>,
    pub cancel: CancelToken,
    pub emitter: EventEmitter,
    pub slot: SlotGuard,
}

/// Runs a job to the end and returns its summary.
///
/// The emitter is dropped on return, which closes the run's event channel.
/// The slot is freed before the terminal event goes out.
pub(crate) async fn run<T: Transcoder + ?Sized>(ctx: RunContext<T>) -> RunSummary {
    let mode = ctx.job.mode();
    info!(
        "Run {} started: {} of {} file(s) at {}",
        ctx.run_id,
        mode,
        ctx.job.inputs().len(),
        ctx.job.speed()
    );

    let summary = match mode {
        JobMode::Batch => run_batch(&ctx).await,
        JobMode::Preview => run_preview(&ctx).await,
    };

    metrics::RUNS_TOTAL
        .with_label_values(&[mode.as_str(), terminal_label(&summary.terminal)])
        .inc();
    info!(
        "Run {} finished ({}): {} converted, {} failed, {} skipped",
        summary.run_id,
        terminal_label(&summary.terminal),
        summary.converted_count(),
        summary.failed_count(),
        summary.skipped_count()
    );

    summary
}

async fn run_batch<T: Transcoder + ?Sized>(ctx: &RunContext<T>) -> RunSummary {
    let inputs = ctx.job.inputs();
    let mut progress = ProgressState::new(inputs.len());
    let mut results = Vec::with_capacity(inputs.len());

    for input in inputs {
        if ctx.cancel.is_cancelled() {
            info!(
                "Run {} cancelled after {} of {} file(s)",
                ctx.run_id,
                progress.processed(),
                progress.total()
            );
            end_run(ctx, EngineEvent::RunCancelled).await;
            return summarize(ctx, results, &progress, RunTerminal::Cancelled);
        }

        let result = convert_batch_file(ctx, input).await;
        metrics::FILES_TOTAL
            .with_label_values(&[result.outcome.as_str()])
            .inc();
        ctx.emitter.emit(EngineEvent::from_result(&result));
        results.push(result);

        progress.advance();
        ctx.emitter.emit(progress.to_event());
    }

    end_run(
        ctx,
        EngineEvent::RunComplete {
            output_directory: ctx.output_dir.clone(),
        },
    )
    .await;
    let terminal = RunTerminal::Completed {
        output_directory: ctx.output_dir.clone(),
    };
    summarize(ctx, results, &progress, terminal)
}

async fn convert_batch_file<T: Transcoder + ?Sized>(
    ctx: &RunContext<T>,
    input: &Path,
) -> ConversionResult {
    if !exists(input).await {
        warn!("Skipping {}: file not found", input.display());
        return ConversionResult::skipped(input, SkipReason::FileNotFound);
    }

    let Some(file_name) = input.file_name() else {
        return ConversionResult::failed(input, "input has no file name");
    };
    let output_path = ctx.output_dir.join(file_name);

    if is_same_file(input, &output_path).await {
        warn!(
            "Refusing to convert {} onto itself; choose another output directory",
            input.display()
        );
        return ConversionResult::failed(input, "output path is the source file");
    }

    if let Err(e) = transcode(ctx, input, &output_path).await {
        warn!("Failed to convert {}: {}", input.display(), e.reason());
        return ConversionResult::failed(input, e.reason());
    }

    let warning = if ctx.job.replace_original() {
        match replace_original(&output_path, input).await {
            Ok(bytes) => {
                debug!("Replaced {} ({} bytes)", input.display(), bytes);
                None
            }
            Err(e) => {
                warn!("Converted {} but could not replace it: {}", input.display(), e);
                metrics::REPLACE_FAILURES.inc();
                Some(e.to_string())
            }
        }
    } else {
        None
    };

    ConversionResult::converted(input, output_path, warning)
}

async fn run_preview<T: Transcoder + ?Sized>(ctx: &RunContext<T>) -> RunSummary {
    let mut progress = ProgressState::new(1);

    // validate() narrows previews to exactly one input
    let Some(input) = ctx.job.inputs().first() else {
        ctx.slot.release().await;
        return summarize(ctx, Vec::new(), &progress, RunTerminal::PreviewFailed);
    };

    if ctx.cancel.is_cancelled() {
        info!("Preview {} superseded before start", ctx.run_id);
        end_run(ctx, EngineEvent::RunCancelled).await;
        return summarize(ctx, Vec::new(), &progress, RunTerminal::Cancelled);
    }

    let result = convert_preview_file(ctx, input).await;
    metrics::FILES_TOTAL
        .with_label_values(&[result.outcome.as_str()])
        .inc();
    progress.advance();
    ctx.emitter.emit(progress.to_event());

    let terminal = match &result.output_path {
        Some(path) if ctx.cancel.is_cancelled() => {
            info!("Preview {} superseded, discarding {}", ctx.run_id, path.display());
            remove_quietly(path).await;
            end_run(ctx, EngineEvent::RunCancelled).await;
            RunTerminal::Cancelled
        }
        Some(path) => {
            info!("Preview ready: {}", path.display());
            if let Some(previous) = ctx.slot.replace_last_preview(path.clone()).await {
                debug!("Removing earlier preview {}", previous.display());
                remove_quietly(&previous).await;
            }
            end_run(ctx, EngineEvent::PreviewReady { path: path.clone() }).await;
            RunTerminal::PreviewReady { path: path.clone() }
        }
        None => {
            end_run(ctx, EngineEvent::from_result(&result)).await;
            RunTerminal::PreviewFailed
        }
    };

    summarize(ctx, vec![result], &progress, terminal)
}

async fn convert_preview_file<T: Transcoder + ?Sized>(
    ctx: &RunContext<T>,
    input: &Path,
) -> ConversionResult {
    if !exists(input).await {
        warn!("Cannot preview {}: file not found", input.display());
        return ConversionResult::skipped(input, SkipReason::FileNotFound);
    }

    let output_path = match allocate_preview_path(&ctx.output_dir, input) {
        Ok(path) => path,
        Err(e) => {
            warn!("Cannot preview {}: {}", input.display(), e);
            return ConversionResult::failed(input, e.reason());
        }
    };

    match transcode(ctx, input, &output_path).await {
        Ok(()) => ConversionResult::converted(input, output_path, None),
        Err(e) => {
            warn!("Preview of {} failed: {}", input.display(), e.reason());
            remove_quietly(&output_path).await;
            ConversionResult::failed(input, e.reason())
        }
    }
}

/// Frees the run's slot, then sends its terminal event.
async fn end_run<T: Transcoder + ?Sized>(ctx: &RunContext<T>, event: EngineEvent) {
    ctx.slot.release().await;
    ctx.emitter.emit(event);
}

/// Invokes the transcoder, always overwriting, and records its duration.
async fn transcode<T: Transcoder + ?Sized>(
    ctx: &RunContext<T>,
    input: &Path,
    output: &Path,
) -> Result<(), TranscoderError> {
    let request = TranscodeRequest::new(input, output, ctx.job.speed().value());
    let started = Instant::now();
    let result = ctx.transcoder.transcode(request).await;

    let label = if result.is_ok() { "success" } else { "failure" };
    metrics::TRANSCODE_DURATION
        .with_label_values(&[label])
        .observe(started.elapsed().as_secs_f64());

    result.map(|r| {
        debug!(
            "{} converted to {} in {}ms",
            input.display(),
            r.output_path.display(),
            r.duration_ms
        );
    })
}

/// Reserves a unique file in `dir` carrying the input's extension.
fn allocate_preview_path(dir: &Path, input: &Path) -> Result<PathBuf, TranscoderError> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_PREVIEW_EXTENSION);
    let prefix = match input.file_stem() {
        Some(stem) => format!("{}-preview-", stem.to_string_lossy()),
        None => "preview-".to_string(),
    };
    let suffix = format!(".{}", extension);

    let file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| TranscoderError::output_unavailable(e.to_string()))?;
    let (_, path) = file
        .keep()
        .map_err(|e| TranscoderError::output_unavailable(e.to_string()))?;
    Ok(path)
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        debug!("Could not remove {}: {}", path.display(), e);
    }
}

fn terminal_label(terminal: &RunTerminal) -> &'static str {
    match terminal {
        RunTerminal::Completed { .. } => "completed",
        RunTerminal::PreviewReady { .. } => "preview_ready",
        RunTerminal::PreviewFailed => "preview_failed",
        RunTerminal::Cancelled => "cancelled",
    }
}

fn summarize<T: Transcoder + ?Sized>(
    ctx: &RunContext<T>,
    results: Vec<ConversionResult>,
    progress: &ProgressState,
    terminal: RunTerminal,
) -> RunSummary {
    RunSummary {
        run_id: ctx.run_id,
        mode: ctx.job.mode(),
        results,
        processed: progress.processed(),
        total: progress.total(),
        terminal,
    }
}
