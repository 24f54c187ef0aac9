use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, error, info};

use super::TranscriptionProvider;

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    r#type: Option<String>,
    code: Option<String>,
}

pub struct OpenAiTranscriptionProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiTranscriptionProvider {
    pub fn new(api_key: String, api_base: &str, model: String) -> Self {
        let endpoint = format!(
            "{}/audio/transcriptions",
            api_base.trim_end_matches('/')
        );

        info!("Initialized OpenAI transcription provider: {}", endpoint);

        Self {
            client: reqwest::Client::new(),
            api_key,
            endpoint,
            model,
        }
    }
}

#[async_trait]
impl TranscriptionProvider for OpenAiTranscriptionProvider {
    fn name(&self) -> &'static str {
        "OpenAI Whisper API"
    }

    async fn transcribe(&self, audio_path: &Path, language: Option<&str>) -> Result<String> {
        debug!("Uploading audio chunk: {:?}", audio_path);

        let bytes = tokio::fs::read(audio_path)
            .await
            .context("Failed to read audio artifact")?;

        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        if let Some(language) = language {
            form = form.text("language", language.to_string());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to send request to OpenAI transcription API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            error!(
                "OpenAI transcription request failed with status {}: {}",
                status, response_text
            );

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&response_text) {
                return Err(anyhow::anyhow!(
                    "OpenAI transcription error: {} (type: {:?}, code: {:?})",
                    error_response.error.message,
                    error_response.error.r#type,
                    error_response.error.code
                ));
            }

            return Err(anyhow::anyhow!(
                "OpenAI transcription request failed with status {}: {}",
                status,
                response_text
            ));
        }

        let transcription: TranscriptionResponse = serde_json::from_str(&response_text)
            .context("Failed to parse transcription response")?;

        let text = transcription.text.trim().to_string();
        debug!("Chunk transcription complete: {} chars", text.len());

        Ok(text)
    }
}
