//! End-to-end pipeline tests over a generated WAV fixture.
//!
//! Service clients are mocked; ffmpeg is never invoked because the fixture
//! is already WAV and no trim bound is valid.

use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use minutier::generation::GenerationClient;
use minutier::media::MediaEncoder;
use minutier::minutes::{ProcessingMode, Synthesizer};
use minutier::pipeline::{Pipeline, RunRequest};
use minutier::transcription::{Transcriber, TranscriptionProvider};

struct FixedTranscription {
    text: String,
    calls: AtomicUsize,
}

impl FixedTranscription {
    fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TranscriptionProvider for FixedTranscription {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn transcribe(&self, _audio_path: &Path, _language: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

struct StageEcho;

#[async_trait]
impl GenerationClient for StageEcho {
    fn name(&self) -> &'static str {
        "stage-echo"
    }

    async fn generate(&self, instruction: &str, _transcript: &str) -> Result<String> {
        if instruction.contains("summarize") {
            Ok("summary text".to_string())
        } else if instruction.contains("key points") {
            Ok("key point text".to_string())
        } else {
            Ok("action item text".to_string())
        }
    }
}

struct AlwaysFailing;

#[async_trait]
impl GenerationClient for AlwaysFailing {
    fn name(&self) -> &'static str {
        "always-failing"
    }

    async fn generate(&self, _instruction: &str, _transcript: &str) -> Result<String> {
        anyhow::bail!("service unavailable")
    }
}

fn write_wav_fixture(path: &Path, frames: usize) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        writer.write_sample((i % 128) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

fn pipeline_with(
    provider: Arc<dyn TranscriptionProvider>,
    client: Arc<dyn GenerationClient>,
    output_dir: PathBuf,
) -> Pipeline {
    Pipeline::new(
        MediaEncoder::with_binary("ffmpeg"),
        Transcriber::new(provider, None, 2),
        Synthesizer::new(client),
        output_dir,
    )
}

#[tokio::test]
async fn test_full_mode_produces_four_sections_and_archives_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("meeting.wav");
    write_wav_fixture(&source, 1_600);
    let output_dir = dir.path().join("output");

    let provider = FixedTranscription::new("hello from the meeting");
    let pipeline = pipeline_with(provider.clone(), Arc::new(StageEcho), output_dir.clone());

    let mut request = RunRequest::new(source.clone(), ProcessingMode::Full);
    request.audio_name = Some("standup".to_string());
    request.document_name = Some("standup_minutes".to_string());

    let document = pipeline
        .run(request, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(document, output_dir.join("standup_minutes.md"));

    let content = std::fs::read_to_string(&document).unwrap();
    let headings: Vec<&str> = content
        .lines()
        .filter_map(|l| l.strip_prefix("# "))
        .collect();
    assert_eq!(
        headings,
        vec![
            "Complete Transcription",
            "Abstract Summary",
            "Key Points",
            "Action Items"
        ]
    );
    assert!(content.contains("hello from the meeting"));
    assert!(content.contains("summary text"));

    // The untouched source is archived next to the generated artifacts.
    assert!(output_dir.join("standup.wav").exists());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transcription_mode_produces_single_section() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("meeting.wav");
    write_wav_fixture(&source, 800);
    let output_dir = dir.path().join("output");

    let pipeline = pipeline_with(
        FixedTranscription::new("just the words"),
        Arc::new(StageEcho),
        output_dir.clone(),
    );

    let mut request = RunRequest::new(source, ProcessingMode::Transcription);
    request.document_name = Some("notes".to_string());

    let document = pipeline
        .run(request, CancellationToken::new())
        .await
        .unwrap();

    let content = std::fs::read_to_string(&document).unwrap();
    assert_eq!(content, "# Complete Transcription\n\njust the words\n\n");
}

#[tokio::test]
async fn test_invalid_timecodes_are_ignored_and_source_still_archived() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("meeting.wav");
    write_wav_fixture(&source, 800);
    let output_dir = dir.path().join("output");

    let pipeline = pipeline_with(
        FixedTranscription::new("words"),
        Arc::new(StageEcho),
        output_dir.clone(),
    );

    let mut request = RunRequest::new(source, ProcessingMode::Transcription);
    request.audio_name = Some("clip".to_string());
    // Minutes out of range and garbage: both treated as absent, so no trim
    // runs and the source still counts as untouched.
    request.start_time = Some("00:60:00".to_string());
    request.end_time = Some("nonsense".to_string());

    pipeline
        .run(request, CancellationToken::new())
        .await
        .unwrap();

    assert!(output_dir.join("clip.wav").exists());
}

#[tokio::test]
async fn test_failed_generation_leaves_no_document() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("meeting.wav");
    write_wav_fixture(&source, 800);
    let output_dir = dir.path().join("output");

    let pipeline = pipeline_with(
        FixedTranscription::new("words"),
        Arc::new(AlwaysFailing),
        output_dir.clone(),
    );

    let mut request = RunRequest::new(source, ProcessingMode::Full);
    request.document_name = Some("doomed".to_string());

    let result = pipeline.run(request, CancellationToken::new()).await;
    assert!(result.is_err());
    assert!(!output_dir.join("doomed.md").exists());
}

#[tokio::test]
async fn test_unsupported_input_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("slides.pdf");
    std::fs::write(&source, b"not media").unwrap();

    let provider = FixedTranscription::new("unused");
    let pipeline = pipeline_with(
        provider.clone(),
        Arc::new(StageEcho),
        dir.path().join("output"),
    );

    let result = pipeline
        .run(
            RunRequest::new(source, ProcessingMode::Full),
            CancellationToken::new(),
        )
        .await;

    assert!(result.is_err());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}
