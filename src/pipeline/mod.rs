//! Pipeline orchestration.
//!
//! One linear pass per invocation:
//! resolve source → trim → transcribe → synthesize → persist → archive.
//! All collaborators are injected via the constructor — no concrete clients
//! hardcoded.

use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::audio::{self, AudioStream};
use crate::document;
use crate::error::{PipelineError, PipelineResult};
use crate::media::{self, MediaEncoder, MediaSource};
use crate::minutes::{ProcessingMode, Synthesizer};
use crate::transcription::Transcriber;

pub mod timecode;

use timecode::Timecode;

/// The four caller inputs plus optional trim bounds. Empty name strings mean
/// "use the timestamp default".
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source: PathBuf,
    pub mode: ProcessingMode,
    pub audio_name: Option<String>,
    pub document_name: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl RunRequest {
    pub fn new(source: PathBuf, mode: ProcessingMode) -> Self {
        Self {
            source,
            mode,
            audio_name: None,
            document_name: None,
            start_time: None,
            end_time: None,
        }
    }
}

pub struct Pipeline {
    encoder: MediaEncoder,
    transcriber: Transcriber,
    synthesizer: Synthesizer,
    output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        encoder: MediaEncoder,
        transcriber: Transcriber,
        synthesizer: Synthesizer,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            encoder,
            transcriber,
            synthesizer,
            output_dir,
        }
    }

    /// Run the whole pipeline and return the produced document path.
    pub async fn run(
        &self,
        request: RunRequest,
        cancel: CancellationToken,
    ) -> PipelineResult<PathBuf> {
        let source = MediaSource::from_path(&request.source)?;
        fs::create_dir_all(&self.output_dir)?;

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let audio_name = resolve_name(request.audio_name.as_deref(), "audio", &timestamp);
        let document_name = resolve_name(
            request.document_name.as_deref(),
            "meeting_minutes",
            &timestamp,
        );

        let mut current = source.path().to_path_buf();
        let mut freshly_produced = false;

        // Resolve: a video container is reduced to its audio track first.
        if !source.is_audio() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            let extracted = self.output_dir.join(format!("{audio_name}.mp3"));
            self.encoder.extract_audio(&current, &extracted)?;
            current = extracted;
            freshly_produced = true;
        }

        // Trim: invalid timecodes are treated as absent, not as errors.
        let start = parse_bound("start", request.start_time.as_deref());
        let end = parse_bound("end", request.end_time.as_deref());

        if start.is_some() || end.is_some() {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }
            let target = self.output_dir.join(format!("{audio_name}.mp3"));
            let scratch = self.output_dir.join(format!(".{audio_name}.trim.mp3"));
            self.encoder
                .trim(&current, &scratch, start.as_ref(), end.as_ref())?;
            fs::rename(&scratch, &target)?;
            current = target;
            freshly_produced = true;
        }

        // Transcribe: by here the working path must be audio.
        if !media::is_audio_path(&current) {
            return Err(PipelineError::UnsupportedInput(current));
        }
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let stream = self.load_stream(&current)?;
        info!(
            "Audio loaded: {}ms at {}Hz, frame width {}",
            stream.duration_ms(),
            stream.spec.frame_rate,
            stream.spec.frame_width
        );

        let chunks = audio::chunk(&stream)?;
        let transcript = self.transcriber.transcribe(chunks, &cancel).await?;
        info!("Transcript assembled: {} chars", transcript.len());

        // Synthesize and persist.
        let record = self
            .synthesizer
            .synthesize(&transcript, request.mode, &cancel)
            .await?;

        let document_path = self.output_dir.join(format!("{document_name}.md"));
        document::write(&record, &document_path)?;

        // Archive the source audio only when steps above left it untouched.
        if !freshly_produced {
            let ext = media::extension_of(source.path());
            let archive = self.output_dir.join(format!("{audio_name}.{ext}"));
            fs::copy(source.path(), &archive)?;
            info!("Source audio archived: {:?}", archive);
        }

        Ok(document_path)
    }

    /// Load a PCM stream from the working audio file, decoding through the
    /// media collaborator unless it is already WAV.
    fn load_stream(&self, path: &Path) -> PipelineResult<AudioStream> {
        if media::extension_of(path) == "wav" {
            return AudioStream::from_wav_path(path);
        }

        let decoded = tempfile::Builder::new()
            .prefix("minutier-decode-")
            .suffix(".wav")
            .tempfile()?
            .into_temp_path();

        self.encoder.decode_to_wav(path, &decoded)?;
        AudioStream::from_wav_path(&decoded)
    }
}

fn resolve_name(explicit: Option<&str>, prefix: &str, timestamp: &str) -> String {
    match explicit {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => format!("{prefix}_{timestamp}"),
    }
}

fn parse_bound(label: &str, input: Option<&str>) -> Option<Timecode> {
    let input = input?;
    if input.trim().is_empty() {
        return None;
    }

    match Timecode::parse(input) {
        Some(tc) => Some(tc),
        None => {
            warn!("Ignoring invalid {} timecode {:?}", label, input);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_name_explicit() {
        assert_eq!(resolve_name(Some("standup"), "audio", "ts"), "standup");
    }

    #[test]
    fn test_resolve_name_empty_falls_back_to_default() {
        assert_eq!(
            resolve_name(Some(""), "audio", "2024-01-02_03-04-05"),
            "audio_2024-01-02_03-04-05"
        );
        assert_eq!(
            resolve_name(None, "meeting_minutes", "2024-01-02_03-04-05"),
            "meeting_minutes_2024-01-02_03-04-05"
        );
    }

    #[test]
    fn test_parse_bound_leniency() {
        assert!(parse_bound("start", Some("99:00:00")).is_some());
        assert!(parse_bound("start", Some("00:60:00")).is_none());
        assert!(parse_bound("end", Some("")).is_none());
        assert!(parse_bound("end", None).is_none());
    }
}
