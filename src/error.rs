//! The `PipelineError` taxonomy (spec §7).
//!
//! A typed `thiserror` enum is the error currency inside the library; `anyhow`
//! remains the currency inside providers and at the CLI boundary. Provider
//! failures cross the boundary via the `Service` and `Generation` variants,
//! which carry the original `anyhow::Error` as their source.

use std::path::PathBuf;

use thiserror::Error;

use crate::minutes::GenerationStage;

/// Convenience alias for results produced inside the pipeline.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Domain errors raised across the transcription/synthesis pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing credential, missing ffmpeg, or a pathological chunk duration.
    /// Fatal before any service call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The supplied input file has an unrecognized container/extension.
    #[error("unsupported input: {0}")]
    UnsupportedInput(PathBuf),

    /// A produced chunk exceeds the service size ceiling. No automatic re-split.
    #[error("chunk {index} is {size} bytes, over the {ceiling}-byte ceiling")]
    ChunkTooLarge {
        index: usize,
        size: u64,
        ceiling: u64,
    },

    /// A transcription remote call failed. No automatic retry.
    #[error("transcription service error: {0}")]
    Service(#[source] anyhow::Error),

    /// A Full-mode synthesis stage failed.
    #[error("generation failed at stage {stage}: {source}")]
    Generation {
        stage: GenerationStage,
        #[source]
        source: anyhow::Error,
    },

    /// An unrecognized processing mode string crossed the `FromStr` boundary.
    #[error("invalid processing mode: {0}")]
    InvalidMode(String),

    /// The operation was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// The ffmpeg media-encoding collaborator failed.
    #[error("media encoding error: {0}")]
    MediaEncoding(String),

    /// Ambient IO failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Ambient WAV read/write failure.
    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
}
