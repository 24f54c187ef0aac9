//! Transcription orchestration.
//!
//! Each chunk is written to a scoped temporary WAV artifact, size-checked
//! against the upload ceiling, and sent to the configured provider. Uploads
//! run through a bounded worker pool; results come back in chunk order no
//! matter which upload finishes first.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::audio::{AudioChunk, UPLOAD_CEILING_BYTES};
use crate::error::{PipelineError, PipelineResult};

pub mod providers;

pub use providers::{OpenAiTranscriptionProvider, TranscriptionProvider};

/// Boilerplate the upstream engine is known to hallucinate on silent or
/// music-only chunks. Any segment containing one of these is dropped.
const WATERMARK_ARTIFACTS: &[&str] = &[
    "Sous-titres réalisés par la communauté d'Amara.org",
    "Subtitles by the Amara.org community",
];

pub struct Transcriber {
    provider: Arc<dyn TranscriptionProvider>,
    language: Option<String>,
    workers: usize,
    ceiling: u64,
}

impl Transcriber {
    pub fn new(
        provider: Arc<dyn TranscriptionProvider>,
        language: Option<String>,
        workers: usize,
    ) -> Self {
        Self {
            provider,
            language,
            workers: workers.max(1),
            ceiling: UPLOAD_CEILING_BYTES,
        }
    }

    #[cfg(test)]
    fn with_ceiling(mut self, ceiling: u64) -> Self {
        self.ceiling = ceiling;
        self
    }

    /// Transcribe an ordered chunk sequence into one transcript.
    ///
    /// Segments are rejoined in original chunk order; empty and watermark
    /// segments are dropped rather than concatenated.
    pub async fn transcribe<I>(
        &self,
        chunks: I,
        cancel: &CancellationToken,
    ) -> PipelineResult<String>
    where
        I: Iterator<Item = AudioChunk>,
    {
        let mut uploads = stream::iter(chunks)
            .map(|chunk| self.transcribe_chunk(chunk, cancel))
            .buffered(self.workers);

        let mut segments: Vec<String> = Vec::new();
        let mut total = 0usize;

        while let Some(result) = uploads.next().await {
            let (index, text) = result?;
            total += 1;

            if !is_retained(&text) {
                warn!("Dropping boilerplate segment from chunk {}", index);
                continue;
            }

            segments.push(text);
        }

        info!(
            "Transcription assembled: {} of {} segments retained",
            segments.len(),
            total
        );

        Ok(segments.join(" "))
    }

    async fn transcribe_chunk(
        &self,
        chunk: AudioChunk,
        cancel: &CancellationToken,
    ) -> PipelineResult<(usize, String)> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let index = chunk.index;
        debug!(
            "Encoding chunk {} ({}ms at {}ms)",
            index,
            chunk.duration_ms(),
            chunk.start_ms
        );

        // TempPath deletes the artifact when it drops, on every exit path.
        let artifact = tempfile::Builder::new()
            .prefix("minutier-chunk-")
            .suffix(".wav")
            .tempfile()?
            .into_temp_path();

        write_chunk_wav(&chunk, &artifact)?;

        let size = std::fs::metadata(&artifact)?.len();
        if size > self.ceiling {
            return Err(PipelineError::ChunkTooLarge {
                index,
                size,
                ceiling: self.ceiling,
            });
        }

        let text = self
            .provider
            .transcribe(&artifact, self.language.as_deref())
            .await
            .map_err(PipelineError::Service)?;

        debug!("Chunk {} transcribed: {} chars", index, text.len());
        Ok((index, text))
    }
}

/// Write a chunk's PCM back out as a 16-bit WAV artifact.
fn write_chunk_wav(chunk: &AudioChunk, path: &std::path::Path) -> PipelineResult<()> {
    let spec = hound::WavSpec {
        channels: chunk.spec.frame_width / 2,
        sample_rate: chunk.spec.frame_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for bytes in chunk.data.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([bytes[0], bytes[1]]))?;
    }
    writer.finalize()?;

    Ok(())
}

fn is_retained(text: &str) -> bool {
    if text.trim().is_empty() {
        return false;
    }
    !WATERMARK_ARTIFACTS
        .iter()
        .any(|artifact| text.contains(artifact))
}
