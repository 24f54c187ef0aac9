//! The external media-encoding collaborator.
//!
//! Extraction, trimming, and PCM decoding all shell out to an `ffmpeg`
//! binary; its filter graph is not our business. Commands are built as plain
//! argument vectors so they can be unit tested without running anything.

use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::pipeline::timecode::Timecode;

/// Audio bitrate used for extracted and trimmed MP3 output.
const MP3_BITRATE: &str = "192k";

pub struct MediaEncoder {
    binary: PathBuf,
}

impl MediaEncoder {
    /// Locate ffmpeg on PATH. A missing binary is a configuration failure,
    /// surfaced before any media work starts.
    pub fn discover() -> Result<Self, PipelineError> {
        let binary = which::which("ffmpeg").map_err(|_| {
            PipelineError::Configuration(
                "ffmpeg not found in PATH; install it to process meeting media".to_string(),
            )
        })?;

        info!("Using ffmpeg at {:?}", binary);
        Ok(Self { binary })
    }

    /// Use a specific binary path instead of discovering one.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Extract the audio track of a video container into an MP3 file,
    /// overwriting `output` if it exists.
    pub fn extract_audio(&self, input: &Path, output: &Path) -> Result<(), PipelineError> {
        info!("Extracting audio: {:?} -> {:?}", input, output);
        self.run(extract_args(input, output))
    }

    /// Trim an audio file to the given bounds, re-encoding to MP3. Either
    /// bound may be absent.
    pub fn trim(
        &self,
        input: &Path,
        output: &Path,
        start: Option<&Timecode>,
        end: Option<&Timecode>,
    ) -> Result<(), PipelineError> {
        info!(
            "Trimming audio: {:?} -> {:?} (start={:?}, end={:?})",
            input,
            output,
            start.map(Timecode::to_string),
            end.map(Timecode::to_string),
        );
        self.run(trim_args(input, output, start, end))
    }

    /// Decode any supported audio file to 16-bit PCM WAV so the chunker can
    /// slice it.
    pub fn decode_to_wav(&self, input: &Path, output: &Path) -> Result<(), PipelineError> {
        debug!("Decoding to PCM WAV: {:?} -> {:?}", input, output);
        self.run(decode_args(input, output))
    }

    fn run(&self, args: Vec<String>) -> Result<(), PipelineError> {
        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| PipelineError::MediaEncoding(format!("failed to run ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::MediaEncoding(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

fn extract_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vn".into(),
        "-codec:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        MP3_BITRATE.into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ]
}

fn trim_args(
    input: &Path,
    output: &Path,
    start: Option<&Timecode>,
    end: Option<&Timecode>,
) -> Vec<String> {
    let mut args: Vec<String> = vec!["-i".into(), input.to_string_lossy().into_owned()];

    if let Some(start) = start {
        args.push("-ss".into());
        args.push(start.to_string());
    }
    if let Some(end) = end {
        args.push("-to".into());
        args.push(end.to_string());
    }

    args.extend([
        "-vn".into(),
        "-codec:a".into(),
        "libmp3lame".into(),
        "-b:a".into(),
        MP3_BITRATE.into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ]);

    args
}

fn decode_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-vn".into(),
        "-acodec".into(),
        "pcm_s16le".into(),
        "-y".into(),
        output.to_string_lossy().into_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_args_shape() {
        let args = extract_args(Path::new("in.mkv"), Path::new("out.mp3"));
        assert_eq!(args[0], "-i");
        assert_eq!(args[1], "in.mkv");
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.contains(&"192k".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp3");
    }

    #[test]
    fn test_trim_args_with_both_bounds() {
        let start = Timecode::parse("00:01:30").unwrap();
        let end = Timecode::parse("00:02:00").unwrap();
        let args = trim_args(
            Path::new("in.mp3"),
            Path::new("out.mp3"),
            Some(&start),
            Some(&end),
        );

        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let to = args.iter().position(|a| a == "-to").unwrap();
        assert_eq!(args[ss + 1], "00:01:30");
        assert_eq!(args[to + 1], "00:02:00");
    }

    #[test]
    fn test_trim_args_start_only() {
        let start = Timecode::parse("00:00:10").unwrap();
        let args = trim_args(Path::new("in.mp3"), Path::new("out.mp3"), Some(&start), None);
        assert!(args.contains(&"-ss".to_string()));
        assert!(!args.contains(&"-to".to_string()));
    }

    #[test]
    fn test_decode_args_pcm() {
        let args = decode_args(Path::new("in.mp3"), Path::new("out.wav"));
        assert!(args.contains(&"pcm_s16le".to_string()));
        assert_eq!(args.last().unwrap(), "out.wav");
    }
}
