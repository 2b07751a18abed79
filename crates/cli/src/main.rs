mod report;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use speedupper_core::{
    load_config_or_default, validate_config, ConversionEngine, EngineConfig, FfmpegTranscoder,
    JobDescriptor, LoggingConfig, SpeedFactor, Transcoder,
};

use report::Reporter;

#[derive(Parser, Debug)]
#[command(name = "speedupper")]
#[command(about = "Speed up audio files with ffmpeg's atempo filter")]
#[command(version)]
struct Cli {
    /// Audio files to convert, in order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Tempo multiplier, e.g. 1.84 or 1.84x
    #[arg(short, long)]
    speed: Option<SpeedFactor>,

    /// Directory for converted files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Convert only the first input into a temporary file and print its path
    #[arg(long, conflicts_with_all = ["output", "replace_original"])]
    preview: bool,

    /// Copy each converted file over its source
    #[arg(long)]
    replace_original: bool,

    /// Do not ask before replacing originals
    #[arg(short, long)]
    yes: bool,

    /// Print events as JSON lines
    #[arg(long)]
    json: bool,

    /// Configuration file
    #[arg(short, long, env = "SPEEDUPPER_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    fn job_descriptor(&self, engine: &EngineConfig) -> JobDescriptor {
        let speed = self
            .speed
            .map(|speed| speed.value())
            .unwrap_or(engine.default_speed);

        if self.preview {
            return JobDescriptor::preview(self.inputs.clone(), speed);
        }

        let output = self
            .output
            .clone()
            .unwrap_or_else(|| engine.default_output_dir.clone());
        JobDescriptor::batch(self.inputs.clone(), speed, output)
            .with_replace_original(self.replace_original)
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let config =
        load_config_or_default(cli.config.as_deref()).context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    init_logging(&config.logging);

    let transcoder = FfmpegTranscoder::new(config.transcoder.clone());
    transcoder.validate().await.with_context(|| {
        format!(
            "ffmpeg is not usable at {}",
            config.transcoder.ffmpeg_path.display()
        )
    })?;

    let descriptor = cli.job_descriptor(&config.engine);
    if descriptor.replace_original && !cli.yes && !confirm_replace(descriptor.inputs.len()).await? {
        println!("Aborted, nothing was converted.");
        return Ok(report::EXIT_FAILURE);
    }

    let engine = ConversionEngine::new(config.engine.clone(), transcoder);
    let mut handle = engine
        .submit(descriptor)
        .await
        .context("Failed to start conversion")?;
    info!("Started run {}", handle.id());

    let canceller = handle.canceller();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current file");
            canceller.cancel();
        }
    });

    let reporter = Reporter::new(cli.json);
    while let Some(event) = handle.next_event().await {
        reporter.event(&event)?;
    }

    let summary = handle.wait().await.context("Conversion run failed")?;
    reporter.summary(&summary)?;
    Ok(report::exit_code(&summary))
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.level.as_str().into());

    // Logs go to stderr so stdout carries only the run report
    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn confirm_replace(count: usize) -> Result<bool> {
    println!(
        "This will overwrite {} original file(s) with the converted version. Continue? [y/N]",
        count
    );

    let mut line = String::new();
    let read = BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read confirmation")?;
    if read == 0 {
        bail!("no confirmation on stdin; pass --yes to replace originals");
    }

    Ok(is_yes(&line))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedupper_core::JobMode;
    use std::path::Path;

    fn engine_config() -> EngineConfig {
        EngineConfig::default().with_default_output_dir("/default/out")
    }

    #[test]
    fn test_parse_batch() {
        let cli = Cli::try_parse_from([
            "speedupper",
            "-s",
            "2.5x",
            "-o",
            "/tmp/out",
            "--replace-original",
            "a.mp3",
            "b.mp3",
        ])
        .unwrap();

        let job = cli.job_descriptor(&engine_config());
        assert_eq!(job.mode, JobMode::Batch);
        assert_eq!(job.speed_factor, 2.5);
        assert_eq!(job.inputs, vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp3")]);
        assert_eq!(job.output_destination.as_deref(), Some(Path::new("/tmp/out")));
        assert!(job.replace_original);
    }

    #[test]
    fn test_defaults_come_from_config() {
        let cli = Cli::try_parse_from(["speedupper", "a.mp3"]).unwrap();
        let job = cli.job_descriptor(&engine_config());
        assert_eq!(job.speed_factor, 1.84);
        assert_eq!(
            job.output_destination.as_deref(),
            Some(Path::new("/default/out"))
        );
        assert!(!job.replace_original);
    }

    #[test]
    fn test_parse_preview() {
        let cli = Cli::try_parse_from(["speedupper", "--preview", "a.mp3", "b.mp3"]).unwrap();
        let job = cli.job_descriptor(&engine_config());
        assert_eq!(job.mode, JobMode::Preview);
        assert!(job.output_destination.is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["speedupper"]).is_err());
        assert!(Cli::try_parse_from(["speedupper", "-s", "0.1", "a.mp3"]).is_err());
        assert!(Cli::try_parse_from(["speedupper", "-s", "fast", "a.mp3"]).is_err());
        assert!(
            Cli::try_parse_from(["speedupper", "--preview", "--replace-original", "a.mp3"])
                .is_err()
        );
    }

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("no"));
    }
}
