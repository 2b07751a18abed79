use std::path::Path;

use tracing::debug;

use super::error::ValidationError;
use super::types::{JobDescriptor, JobMode, SpeedFactor, ValidatedJob};

/// Validate a job descriptor.
///
/// Checks, in order:
/// - the input list is not empty
/// - the speed factor is within the transcoder's tempo range
/// - batch jobs name a non-blank output destination
///
/// Previews are narrowed to their first input and never replace originals.
/// Inputs are not checked for existence here; missing files are skipped
/// by the run loop.
pub fn validate(descriptor: &JobDescriptor) -> Result<ValidatedJob, ValidationError> {
    if descriptor.inputs.is_empty() {
        return Err(ValidationError::EmptyInputList);
    }

    let speed = SpeedFactor::new(descriptor.speed_factor)?;

    let output_destination = descriptor
        .output_destination
        .as_deref()
        .filter(|p| !is_blank(p))
        .map(Path::to_path_buf);

    match descriptor.mode {
        JobMode::Batch => {
            let Some(output_destination) = output_destination else {
                return Err(ValidationError::MissingOutputDestination);
            };
            Ok(ValidatedJob {
                inputs: descriptor.inputs.clone(),
                speed,
                mode: JobMode::Batch,
                output_destination: Some(output_destination),
                replace_original: descriptor.replace_original,
            })
        }
        JobMode::Preview => {
            if descriptor.inputs.len() > 1 {
                debug!(
                    "Preview narrowed to first of {} inputs",
                    descriptor.inputs.len()
                );
            }
            if descriptor.replace_original {
                debug!("Ignoring replace_original for preview");
            }
            Ok(ValidatedJob {
                inputs: descriptor.inputs[..1].to_vec(),
                speed,
                mode: JobMode::Preview,
                output_destination,
                replace_original: false,
            })
        }
    }
}

fn is_blank(path: &Path) -> bool {
    path.as_os_str().to_string_lossy().trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_batch() {
        let job = JobDescriptor::batch(["/a.mp3", "/b.mp3"], 1.84, "/out")
            .with_replace_original(true);
        let validated = validate(&job).unwrap();
        assert_eq!(validated.inputs().len(), 2);
        assert_eq!(validated.speed().value(), 1.84);
        assert_eq!(validated.mode(), JobMode::Batch);
        assert_eq!(validated.output_destination(), Some(Path::new("/out")));
        assert!(validated.replace_original());
    }

    #[test]
    fn test_validate_empty_inputs() {
        let job = JobDescriptor::batch(Vec::<PathBuf>::new(), 1.84, "/out");
        assert_eq!(validate(&job), Err(ValidationError::EmptyInputList));

        let job = JobDescriptor::preview(Vec::<PathBuf>::new(), 1.84);
        assert_eq!(validate(&job), Err(ValidationError::EmptyInputList));
    }

    #[test]
    fn test_validate_speed_factor() {
        for bad in [0.0, -2.0, 0.25, 100.01, f64::NAN] {
            let job = JobDescriptor::batch(["/a.mp3"], bad, "/out");
            assert!(
                matches!(
                    validate(&job),
                    Err(ValidationError::InvalidSpeedFactor { .. })
                ),
                "speed {} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_missing_output_destination() {
        let mut job = JobDescriptor::batch(["/a.mp3"], 1.5, "   ");
        assert_eq!(
            validate(&job),
            Err(ValidationError::MissingOutputDestination)
        );

        job.output_destination = None;
        assert_eq!(
            validate(&job),
            Err(ValidationError::MissingOutputDestination)
        );

        job.output_destination = Some(PathBuf::new());
        assert_eq!(
            validate(&job),
            Err(ValidationError::MissingOutputDestination)
        );
    }

    #[test]
    fn test_validate_preview_uses_first_input_only() {
        let job = JobDescriptor::preview(["/first.mp3", "/second.mp3", "/third.mp3"], 2.0)
            .with_replace_original(true);
        let validated = validate(&job).unwrap();
        assert_eq!(validated.inputs(), &[PathBuf::from("/first.mp3")]);
        assert!(!validated.replace_original());
        assert!(validated.output_destination().is_none());
    }

    #[test]
    fn test_validate_preview_does_not_need_destination() {
        let job = JobDescriptor::preview(["/a.mp3"], 1.25).with_output_destination("");
        let validated = validate(&job).unwrap();
        assert!(validated.output_destination().is_none());
    }

    #[test]
    fn test_validate_checks_empty_inputs_before_speed() {
        let job = JobDescriptor::batch(Vec::<PathBuf>::new(), -1.0, "");
        assert_eq!(validate(&job), Err(ValidationError::EmptyInputList));
    }

    #[tokio::test]
    async fn test_prepare_creates_batch_output_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let out = temp.path().join("nested").join("out");
        let job = validate(&JobDescriptor::batch(["/a.mp3"], 1.5, &out)).unwrap();

        let dir = job.prepare_output_dir(temp.path()).await.unwrap();
        assert_eq!(dir, out);
        assert!(out.is_dir());

        // Existing directory is fine
        assert!(job.prepare_output_dir(temp.path()).await.is_ok());
    }

    #[tokio::test]
    async fn test_prepare_rejects_file_destination() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("not-a-dir.mp3");
        std::fs::write(&file, b"x").unwrap();
        let job = validate(&JobDescriptor::batch(["/a.mp3"], 1.5, &file)).unwrap();

        let result = job.prepare_output_dir(temp.path()).await;
        assert!(matches!(
            result,
            Err(crate::job::FilesystemError::NotADirectory { .. })
        ));
    }

    #[tokio::test]
    async fn test_prepare_reports_create_failure() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("taken.mp3");
        std::fs::write(&file, b"x").unwrap();
        let out = file.join("out");
        let job = validate(&JobDescriptor::batch(["/a.mp3"], 1.5, &out)).unwrap();

        let result = job.prepare_output_dir(temp.path()).await;
        match result {
            Err(crate::job::FilesystemError::CreateOutputDir { path, .. }) => {
                assert_eq!(path, out)
            }
            other => panic!("expected create failure, got {:?}", other),
        }
        assert!(file.is_file());
    }

    #[tokio::test]
    async fn test_prepare_preview_falls_back() {
        let temp = tempfile::TempDir::new().unwrap();
        let fallback = temp.path().join("preview");
        let job = validate(&JobDescriptor::preview(["/a.mp3"], 1.5)).unwrap();

        let dir = job.prepare_output_dir(&fallback).await.unwrap();
        assert_eq!(dir, fallback);
        assert!(fallback.is_dir());
    }
}
