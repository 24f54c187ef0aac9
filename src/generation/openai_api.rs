use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use super::GenerationClient;

// OpenAI-compatible chat request/response shapes.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

pub struct OpenAiGenerationClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl OpenAiGenerationClient {
    pub fn new(api_key: String, api_base: &str, model: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let endpoint = format!("{}/chat/completions", api_base.trim_end_matches('/'));

        info!("Initialized generation client: {} ({})", endpoint, model);

        Self {
            client,
            api_key,
            endpoint,
            model,
        }
    }
}

#[async_trait]
impl GenerationClient for OpenAiGenerationClient {
    fn name(&self) -> &'static str {
        "OpenAI Chat API"
    }

    async fn generate(&self, instruction: &str, transcript: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            // Temperature pinned to zero for deterministic-leaning output.
            temperature: 0.0,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: instruction.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: transcript.to_string(),
                },
            ],
        };

        debug!("Sending generation request ({} chars)", transcript.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to generation API")?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            error!(
                "Generation request failed with status {}: {}",
                status, response_text
            );
            return Err(anyhow::anyhow!(
                "generation request failed with status {}: {}",
                status,
                response_text
            ));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&response_text).context("Failed to parse generation response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .context("Generation response contained no choices")?;

        debug!("Generation complete: {} chars", content.len());
        Ok(content.trim().to_string())
    }
}
