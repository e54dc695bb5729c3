//! Ollama backend — local inference over the Ollama HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{LlmProvider, ProviderError};

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}

pub struct OllamaProvider {
    client: Client,
    generate_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(host: String, model: String) -> Self {
        Self {
            client: Client::new(),
            generate_url: format!("{}/api/generate", host.trim_end_matches('/')),
            model,
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn provider_name(&self) -> &'static str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String, ProviderError> {
        let request_body = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&self.generate_url)
            .timeout(timeout)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: OllamaResponse = response.json().await?;
        debug!(
            "Ollama call succeeded: response_length={}",
            body.response.len()
        );

        if body.response.trim().is_empty() {
            return Err(ProviderError::EmptyContent);
        }
        Ok(body.response)
    }
}
