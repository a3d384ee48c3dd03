//! OpenAI-compatible client implementation
//!
//! Works against any server exposing `/chat/completions` in the OpenAI shape,
//! which covers llama.cpp's server, vLLM and LM Studio running locally.

use crate::llm::client::{
    CompletionRequest, CompletionResponse, LlmError, ModelClient, TokenUsage,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// OpenAI-compatible client configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Bearer token; local servers usually accept none
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://127.0.0.1:8080/v1".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// OpenAI-compatible chat completions client
pub struct OpenAiCompatibleClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiCompatibleClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, LlmError> {
        if config.base_url.trim().is_empty() {
            return Err(LlmError::NotConfigured(
                "OpenAI-compatible base URL is required".to_string(),
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

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) if !key.is_empty() => builder.bearer_auth(key),
            _ => builder,
        }
    }

    /// Convert a completion request to the chat format (pure function)
    fn convert_request(request: &CompletionRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.options.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: Some(request.prompt.clone()),
            }],
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
            stream: false,
        }
    }

    /// Parse a chat completion response (pure function)
    fn parse_response(response: ChatCompletionResponse) -> Result<CompletionResponse, LlmError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No choices returned".to_string()))?;

        let text = choice.message.content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let usage = response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            text,
            model: response.model,
            usage,
        })
    }

    /// Map a non-success HTTP status to a model error (pure function)
    fn classify_status(status: u16, body: &str, model: &str) -> LlmError {
        if status == 404 && body.contains("model") {
            LlmError::ModelNotFound(model.to_string())
        } else {
            LlmError::Api {
                status,
                message: body.to_string(),
            }
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiCompatibleClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let wire_request = Self::convert_request(&request);
        debug!(
            model = %wire_request.model,
            prompt_chars = request.prompt.len(),
            "Chat completion request"
        );

        let response = self
            .authorize(self.client.post(self.endpoint("/chat/completions")))
            .timeout(request.options.max_wait)
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                let error = LlmError::from_transport(&e, request.options.max_wait);
                warn!("Chat completion request failed: {}", error);
                error
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = Self::classify_status(status.as_u16(), &body, &request.options.model);
            warn!("Chat completion returned {}: {}", status, error);
            return Err(error);
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Self::parse_response(body)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let response = self
            .authorize(self.client.get(self.endpoint("/models")))
            .send()
            .await
            .map_err(|e| LlmError::from_transport(&e, self.config.timeout))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::Api {
                status: response.status().as_u16(),
                message: "Model listing failed".to_string(),
            })
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
