//! Media source classification.
//!
//! The pipeline only ever looks at the file extension to decide whether a
//! path is an audio container, a video container, or unusable.

use std::path::{Path, PathBuf};

use crate::error::PipelineError;

pub mod encoder;

pub use encoder::MediaEncoder;

const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "opus"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "avi", "mov"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Audio,
    Video,
}

/// A user-supplied media path with its inferred container kind. Immutable
/// once resolved.
#[derive(Debug, Clone)]
pub struct MediaSource {
    path: PathBuf,
    kind: ContainerKind,
}

impl MediaSource {
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let ext = extension_of(path);

        let kind = if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            ContainerKind::Audio
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            ContainerKind::Video
        } else {
            return Err(PipelineError::UnsupportedInput(path.to_path_buf()));
        };

        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_audio(&self) -> bool {
        self.kind == ContainerKind::Audio
    }
}

/// Lowercased extension of a path, or empty string when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Whether the path names a recognized audio container.
pub fn is_audio_path(path: &Path) -> bool {
    AUDIO_EXTENSIONS.contains(&extension_of(path).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_extension_is_audio() {
        let source = MediaSource::from_path(Path::new("/tmp/meeting.mp3")).unwrap();
        assert_eq!(source.kind(), ContainerKind::Audio);
        assert!(source.is_audio());
    }

    #[test]
    fn test_video_extension_is_video() {
        let source = MediaSource::from_path(Path::new("/tmp/meeting.MKV")).unwrap();
        assert_eq!(source.kind(), ContainerKind::Video);
        assert!(!source.is_audio());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = MediaSource::from_path(Path::new("/tmp/meeting.xyz")).unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedInput(_)));
    }

    #[test]
    fn test_no_extension_rejected() {
        assert!(MediaSource::from_path(Path::new("/tmp/meeting")).is_err());
    }

    #[test]
    fn test_is_audio_path() {
        assert!(is_audio_path(Path::new("a.wav")));
        assert!(is_audio_path(Path::new("a.OPUS")));
        assert!(!is_audio_path(Path::new("a.mp4")));
    }
}
