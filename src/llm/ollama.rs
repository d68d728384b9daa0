//! Blocking HTTP client for an Ollama server, driven from async code.

use super::{AgentRole, GenerationError, PromptRequest, TextGenerator};
use crate::config::LlmConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Generation client for `POST {base_url}/api/generate`.
pub struct OllamaClient {
    config: LlmConfig,
    agent: ureq::Agent,
}

impl OllamaClient {
    pub fn new(config: LlmConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(true)
            .build()
            .into();
        Self { config, agent }
    }

    pub fn model_for(&self, role: AgentRole) -> &str {
        self.config.model_for(role)
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.config.base_url.trim_end_matches('/'))
    }
}

/// Serializes the request body for one generate call.
pub(crate) fn build_request_body(
    model: &str,
    request: &PromptRequest,
    temperature: f32,
) -> Result<String, GenerationError> {
    let body = GenerateRequest {
        model,
        prompt: &request.user_prompt,
        system: request.system_prompt.as_deref(),
        stream: false,
        options: GenerateOptions { temperature },
    };
    serde_json::to_string(&body).map_err(|e| GenerationError::InvalidResponse(e.to_string()))
}

/// Extracts the generated text from a non-streaming response body.
pub(crate) fn parse_response_body(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
    let text = parsed.response.trim().to_string();
    if text.is_empty() {
        return Err(GenerationError::EmptyOutput);
    }
    Ok(text)
}

fn post_blocking(agent: &ureq::Agent, url: &str, body: String) -> Result<String, GenerationError> {
    let mut response = agent
        .post(url)
        .header("Content-Type", "application/json")
        .send(body)
        .map_err(|e| match e {
            ureq::Error::StatusCode(code) => GenerationError::Status(code),
            ureq::Error::Timeout(_) => GenerationError::Timeout,
            other => GenerationError::Transport(other.to_string()),
        })?;
    response
        .body_mut()
        .read_to_string()
        .map_err(|e| GenerationError::Transport(e.to_string()))
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(
        &self,
        role: AgentRole,
        request: PromptRequest,
    ) -> Result<String, GenerationError> {
        let body = build_request_body(self.model_for(role), &request, self.config.temperature)?;
        let agent = self.agent.clone();
        let url = self.endpoint();

        let raw = tokio::task::spawn_blocking(move || post_blocking(&agent, &url, body))
            .await
            .map_err(|e| GenerationError::Transport(format!("request task failed: {}", e)))??;

        parse_response_body(&raw)
    }
}

#[cfg(test)]
#[path = "tests/ollama_tests.rs"]
mod tests;
