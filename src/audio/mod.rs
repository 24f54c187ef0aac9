//! Decoded audio and byte-budget-aware chunking.
//!
//! The transcription service caps uploads at [`UPLOAD_CEILING_BYTES`], so a
//! stream is sliced into windows whose raw size stays 10% under the ceiling;
//! the margin absorbs container and frame headers added when a chunk is
//! encoded for upload.

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Maximum accepted upload size for one chunk, imposed by the transcription
/// engine.
pub const UPLOAD_CEILING_BYTES: u64 = 25 * 1024 * 1024;

/// Fraction of the ceiling a raw chunk may occupy.
const ENCODING_MARGIN: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpec {
    /// Sample frames per second.
    pub frame_rate: u32,
    /// Bytes per sample frame (channels x bytes per sample).
    pub frame_width: u16,
}

/// Decoded interleaved PCM, held only while slicing.
pub struct AudioStream {
    pub spec: AudioSpec,
    pub data: Vec<u8>,
}

impl AudioStream {
    pub fn new(spec: AudioSpec, data: Vec<u8>) -> Self {
        Self { spec, data }
    }

    /// Load 16-bit PCM WAV produced by the media decoder.
    pub fn from_wav_path(path: &Path) -> PipelineResult<Self> {
        let mut reader = hound::WavReader::open(path)?;
        let wav_spec = reader.spec();

        if wav_spec.bits_per_sample != 16 || wav_spec.sample_format != hound::SampleFormat::Int {
            return Err(PipelineError::MediaEncoding(format!(
                "expected 16-bit integer PCM, got {}-bit {:?}",
                wav_spec.bits_per_sample, wav_spec.sample_format
            )));
        }

        let mut data = Vec::with_capacity(reader.len() as usize * 2);
        for sample in reader.samples::<i16>() {
            data.extend_from_slice(&sample?.to_le_bytes());
        }

        Ok(Self {
            spec: AudioSpec {
                frame_rate: wav_spec.sample_rate,
                frame_width: wav_spec.channels * 2,
            },
            data,
        })
    }

    pub fn frames(&self) -> usize {
        self.data.len() / self.spec.frame_width as usize
    }

    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.spec.frame_rate as u64
    }
}

/// One ordered, contiguous slice of a stream. Owned so it can move into an
/// upload task.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub index: usize,
    pub start_ms: u64,
    pub spec: AudioSpec,
    pub data: Vec<u8>,
}

impl AudioChunk {
    pub fn frames(&self) -> usize {
        self.data.len() / self.spec.frame_width as usize
    }

    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.spec.frame_rate as u64
    }
}

/// Chunk window length for a given spec and upload ceiling.
///
/// Fails fast when the spec is degenerate: a zero window would otherwise
/// loop forever producing empty chunks.
pub fn chunk_duration_ms(spec: &AudioSpec, ceiling: u64) -> PipelineResult<u64> {
    if spec.frame_rate == 0 || spec.frame_width == 0 {
        return Err(PipelineError::Configuration(format!(
            "degenerate audio spec: frame_rate={}, frame_width={}",
            spec.frame_rate, spec.frame_width
        )));
    }

    let bytes_per_second = spec.frame_rate as f64 * spec.frame_width as f64;
    let duration = (ENCODING_MARGIN * 1000.0 * ceiling as f64 / bytes_per_second).floor() as u64;

    if duration == 0 {
        return Err(PipelineError::Configuration(format!(
            "chunk duration collapsed to zero for frame_rate={}, frame_width={}, ceiling={}",
            spec.frame_rate, spec.frame_width, ceiling
        )));
    }

    Ok(duration)
}

/// Slice a stream into an ordered, lazy sequence of chunks sized for the
/// standard upload ceiling. The final chunk may be shorter.
pub fn chunk(stream: &AudioStream) -> PipelineResult<Chunks<'_>> {
    chunk_with_ceiling(stream, UPLOAD_CEILING_BYTES)
}

pub fn chunk_with_ceiling(stream: &AudioStream, ceiling: u64) -> PipelineResult<Chunks<'_>> {
    let duration_ms = chunk_duration_ms(&stream.spec, ceiling)?;
    let frames_per_chunk = (duration_ms * stream.spec.frame_rate as u64 / 1000) as usize;

    if frames_per_chunk == 0 {
        return Err(PipelineError::Configuration(format!(
            "chunk window of {}ms holds no frames at {}Hz",
            duration_ms, stream.spec.frame_rate
        )));
    }

    Ok(Chunks {
        stream,
        bytes_per_chunk: frames_per_chunk * stream.spec.frame_width as usize,
        offset: 0,
        index: 0,
    })
}

/// Lazy, non-restartable chunk sequence over a borrowed stream.
pub struct Chunks<'a> {
    stream: &'a AudioStream,
    bytes_per_chunk: usize,
    offset: usize,
    index: usize,
}

impl Iterator for Chunks<'_> {
    type Item = AudioChunk;

    fn next(&mut self) -> Option<AudioChunk> {
        if self.offset >= self.stream.data.len() {
            return None;
        }

        let end = (self.offset + self.bytes_per_chunk).min(self.stream.data.len());
        let spec = self.stream.spec;
        let start_frame = self.offset / spec.frame_width as usize;

        let chunk = AudioChunk {
            index: self.index,
            start_ms: start_frame as u64 * 1000 / spec.frame_rate as u64,
            spec,
            data: self.stream.data[self.offset..end].to_vec(),
        };

        self.offset = end;
        self.index += 1;
        Some(chunk)
    }
}
