//! Prints run events for a human or as JSON lines.

use anyhow::Result;
use speedupper_core::{EngineEvent, RunSummary, RunTerminal};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// Some file failed, or the preview could not be made.
pub const EXIT_FILES_FAILED: i32 = 2;
/// Interrupted, as a shell reports SIGINT.
pub const EXIT_CANCELLED: i32 = 130;

pub struct Reporter {
    json: bool,
}

impl Reporter {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn event(&self, event: &EngineEvent) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!("{}", describe(event));
        }
        Ok(())
    }

    pub fn summary(&self, summary: &RunSummary) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string(summary)?);
            return Ok(());
        }

        println!(
            "{} converted, {} failed, {} skipped",
            summary.converted_count(),
            summary.failed_count(),
            summary.skipped_count()
        );
        if summary.warning_count() > 0 {
            println!(
                "{} original(s) could not be replaced",
                summary.warning_count()
            );
        }
        Ok(())
    }
}

pub fn describe(event: &EngineEvent) -> String {
    match event {
        EngineEvent::ProgressUpdated {
            processed,
            total,
            percent,
        } => format!("Converted {} of {} ({}%)", processed, total, percent),
        EngineEvent::FileConverted {
            name,
            output_path,
            warning: None,
        } => format!("  {} -> {}", name, output_path.display()),
        EngineEvent::FileConverted {
            name,
            output_path,
            warning: Some(warning),
        } => format!(
            "  {} -> {} (original kept: {})",
            name,
            output_path.display(),
            warning
        ),
        EngineEvent::FileFailed { name, reason } => format!("  failed: {}: {}", name, reason),
        EngineEvent::FileSkipped { name, reason } => format!("  skipped: {}: {}", name, reason),
        EngineEvent::PreviewReady { path } => format!("Preview ready: {}", path.display()),
        EngineEvent::RunComplete { output_directory } => {
            format!("Done. Files saved to {}", output_directory.display())
        }
        EngineEvent::RunCancelled => "Cancelled.".to_string(),
    }
}

pub fn exit_code(summary: &RunSummary) -> i32 {
    match summary.terminal {
        RunTerminal::Cancelled => EXIT_CANCELLED,
        RunTerminal::PreviewFailed => EXIT_FILES_FAILED,
        _ if summary.failed_count() > 0 => EXIT_FILES_FAILED,
        _ => EXIT_SUCCESS,
    }
}
