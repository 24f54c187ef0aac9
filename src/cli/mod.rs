//! CLI surface: argument types and the `run` handler that wires config and
//! service clients into the pipeline.

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::generation::OpenAiGenerationClient;
use crate::media::MediaEncoder;
use crate::minutes::{ProcessingMode, Synthesizer};
use crate::pipeline::{Pipeline, RunRequest};
use crate::transcription::{OpenAiTranscriptionProvider, Transcriber};

#[derive(Parser, Debug)]
#[command(name = "minutier")]
#[command(about = "Meeting recordings to written minutes", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Process a meeting recording into a minutes document
    Run(RunCliArgs),
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct RunCliArgs {
    /// Source media file (video or audio)
    pub file: PathBuf,

    /// Transcription only, or full minutes extraction
    #[arg(long, value_enum, default_value_t = ProcessingMode::Transcription)]
    pub mode: ProcessingMode,

    /// Base name for produced audio files (default: audio_<timestamp>)
    #[arg(long)]
    pub audio_name: Option<String>,

    /// Base name for the minutes document (default: meeting_minutes_<timestamp>)
    #[arg(long)]
    pub document_name: Option<String>,

    /// Start timecode (HH:MM:SS); an invalid value is ignored
    #[arg(long)]
    pub start: Option<String>,

    /// End timecode (HH:MM:SS); an invalid value is ignored
    #[arg(long)]
    pub end: Option<String>,

    /// Override the configured output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}

pub async fn handle_run_command(args: RunCliArgs) -> Result<()> {
    let config = Config::load()?;
    let api_key = config.resolve_api_key()?;

    let encoder = MediaEncoder::discover()?;

    let provider = Arc::new(OpenAiTranscriptionProvider::new(
        api_key.clone(),
        &config.openai.api_base,
        config.openai.transcription_model.clone(),
    ));
    let transcriber = Transcriber::new(
        provider,
        config.transcription.language.clone(),
        config.transcription.workers,
    );

    let client = Arc::new(OpenAiGenerationClient::new(
        api_key,
        &config.openai.api_base,
        config.openai.generation_model.clone(),
    ));
    let synthesizer = Synthesizer::new(client);

    let output_dir = args.output_dir.unwrap_or_else(|| config.output.dir.clone());
    let pipeline = Pipeline::new(encoder, transcriber, synthesizer, output_dir);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping before the next service call");
                cancel.cancel();
            }
        });
    }

    let pb = create_progress_bar();
    pb.set_message(match args.mode {
        ProcessingMode::Full => "Transcribing and extracting minutes...",
        ProcessingMode::Transcription => "Transcribing...",
    });

    let request = RunRequest {
        source: args.file,
        mode: args.mode,
        audio_name: args.audio_name,
        document_name: args.document_name,
        start_time: args.start,
        end_time: args.end,
    };

    match pipeline.run(request, cancel).await {
        Ok(path) => {
            pb.finish_with_message("Complete");
            println!("Minutes written to {}", path.display());
            Ok(())
        }
        Err(e) => {
            pb.finish_and_clear();
            Err(e.into())
        }
    }
}

fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
