//! Ollama client implementation
//!
//! Talks to a locally hosted Ollama server through its non-streaming
//! `/api/generate` endpoint.

use crate::llm::client::{
    CompletionRequest, CompletionResponse, LlmError, ModelClient, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Ollama client configuration
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Ollama client
pub struct OllamaClient {
    config: OllamaConfig,
    client: Client,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, LlmError> {
        if config.base_url.trim().is_empty() {
            return Err(LlmError::NotConfigured(
                "Ollama base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::NotConfigured(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Convert a completion request to Ollama's wire format (pure function)
    fn convert_request(request: &CompletionRequest) -> OllamaGenerateRequest {
        let options = &request.options;
        let wire_options = if options.temperature.is_some() || options.max_tokens.is_some() {
            Some(OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            })
        } else {
            None
        };

        OllamaGenerateRequest {
            model: options.model.clone(),
            prompt: request.prompt.clone(),
            stream: false,
            options: wire_options,
        }
    }

    /// Parse a generate response (pure function)
    fn parse_response(response: OllamaGenerateResponse) -> Result<CompletionResponse, LlmError> {
        if let Some(error) = response.error {
            return Err(LlmError::InvalidResponse(error));
        }

        let text = response.response.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(CompletionResponse {
            text,
            model: response.model,
            usage: TokenUsage {
                prompt_tokens: response.prompt_eval_count.unwrap_or(0),
                completion_tokens: response.eval_count.unwrap_or(0),
            },
        })
    }

    /// Map a non-success HTTP status to a model error (pure function)
    fn classify_status(status: u16, body: &str, model: &str) -> LlmError {
        let message = serde_json::from_str::<OllamaErrorBody>(body)
            .map(|b| b.error)
            .unwrap_or_else(|_| body.to_string());

        if status == 404 && message.contains("not found") {
            LlmError::ModelNotFound(model.to_string())
        } else {
            LlmError::Api { status, message }
        }
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let wire_request = Self::convert_request(&request);
        debug!(
            model = %wire_request.model,
            prompt_chars = wire_request.prompt.len(),
            "Ollama generate request"
        );

        let response = self
            .client
            .post(self.endpoint("/api/generate"))
            .timeout(request.options.max_wait)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                let error = LlmError::from_transport(&e, request.options.max_wait);
                warn!("Ollama request failed: {}", error);
                error
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Self::classify_status(status.as_u16(), &body, &request.options.model);
            warn!("Ollama returned {}: {}", status, error);
            return Err(error);
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let completion = Self::parse_response(body)?;
        debug!(
            model = %completion.model,
            completion_tokens = completion.usage.completion_tokens,
            "Ollama generate response"
        );
        Ok(completion)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(self.endpoint("/api/tags"))
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e, self.config.timeout))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::Api {
                status: response.status().as_u16(),
                message: "Ollama health check failed".to_string(),
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    #[serde(default)]
    model: String,
    response: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}
