//! Model client abstraction and shared request/response types
//!
//! The language model is an external collaborator. Everything the agent needs
//! from it goes through the [`ModelClient`] trait so tests can substitute a
//! deterministic fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Default local model used when nothing else is configured
pub const DEFAULT_MODEL: &str = "mistral";

/// Default upper bound on a single model call
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(120);

/// Per-call model options
#[derive(Debug, Clone, PartialEq)]
pub struct ModelOptions {
    /// Model identifier understood by the backend (e.g. "mistral")
    pub model: String,
    /// Maximum time to wait for a completion
    pub max_wait: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_wait: DEFAULT_MAX_WAIT,
            temperature: None,
            max_tokens: None,
        }
    }
}

impl ModelOptions {
    pub fn new(model: impl Into<String>, max_wait: Duration) -> Self {
        Self {
            model: model.into(),
            max_wait,
            ..Default::default()
        }
    }
}

/// A single prompt completion request
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub options: ModelOptions,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, options: ModelOptions) -> Self {
        Self {
            prompt: prompt.into(),
            options,
        }
    }
}

/// Completion returned by a model backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Token usage statistics, when the backend reports them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// Model client trait for dependency injection and testing
///
/// Implementations must be safe for concurrent independent calls.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Backend name (e.g. "ollama", "openai")
    fn name(&self) -> &str;

    /// Generate a completion for the given prompt
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Check that the backend is reachable
    async fn health_check(&self) -> Result<(), LlmError>;
}

/// Model client errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LlmError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Model returned an empty response")]
    EmptyResponse,
    #[error("Model not found: {0}")]
    ModelNotFound(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl LlmError {
    /// Map a transport-level reqwest error onto the model error kinds
    pub fn from_transport(error: &reqwest::Error, max_wait: Duration) -> Self {
        if error.is_timeout() {
            LlmError::Timeout(max_wait)
        } else {
            LlmError::Unavailable(format!(
                "{error} (is_connect: {}, is_request: {})",
                error.is_connect(),
                error.is_request()
            ))
        }
    }

    /// Whether a caller-side retry of the whole query could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Unavailable(_) | LlmError::Timeout(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
