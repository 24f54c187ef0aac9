use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

pub mod openai_api;

pub use openai_api::OpenAiTranscriptionProvider;

/// A speech-to-text engine that accepts a bounded-size audio artifact and
/// returns its text.
#[async_trait]
pub trait TranscriptionProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<String>;
}
