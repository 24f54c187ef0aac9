use anyhow::Result;
use async_trait::async_trait;

pub mod openai_api;

pub use openai_api::OpenAiGenerationClient;

/// A text-generation engine that accepts a role-tagged instruction plus the
/// transcript and returns generated text.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, instruction: &str, transcript: &str) -> Result<String>;
}
