//! Configuration system for the routing agent
//!
//! Configuration is a TOML file with `[agent]`, `[llm]` and `[routing]`
//! sections. Every field has a default so the agent also runs without a file,
//! talking to a local Ollama server with the `mistral` model.

use crate::llm::client::{ModelOptions, DEFAULT_MODEL};
use crate::llm::providers::DEFAULT_OLLAMA_URL;
use crate::routing::predicate::{DEFAULT_MATH_KEYWORDS, DEFAULT_SUMMARY_KEYWORDS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Main agent configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub routing: RoutingSection,
}

/// Agent identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSection {
    /// Agent identifier (must match [a-zA-Z0-9._-]+)
    #[serde(default = "default_agent_id")]
    pub id: String,
    #[serde(default = "default_description")]
    pub description: String,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            id: default_agent_id(),
            description: default_description(),
        }
    }
}

fn default_agent_id() -> String {
    "route-agent".to_string()
}

fn default_description() -> String {
    "Routes queries to math, summary or general handlers".to_string()
}

/// Model backend selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    #[default]
    Ollama,
    /// Any OpenAI-compatible chat completions server
    Openai,
}

/// Model client section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    #[serde(default)]
    pub provider: ModelBackend,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Maximum wait per model call in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional temperature (0.0 to 2.0)
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Environment variable holding a bearer key (openai backend only)
    pub api_key_env: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: ModelBackend::default(),
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
            max_tokens: None,
            api_key_env: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_OLLAMA_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl LlmSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Per-call options handed to task handlers
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            model: self.model.clone(),
            max_wait: self.timeout(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Router keyword lists
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoutingSection {
    #[serde(default = "default_math_keywords")]
    pub math_keywords: Vec<String>,
    #[serde(default = "default_summary_keywords")]
    pub summary_keywords: Vec<String>,
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            math_keywords: default_math_keywords(),
            summary_keywords: default_summary_keywords(),
        }
    }
}

fn default_math_keywords() -> Vec<String> {
    DEFAULT_MATH_KEYWORDS.iter().map(|k| k.to_string()).collect()
}

fn default_summary_keywords() -> Vec<String> {
    DEFAULT_SUMMARY_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid agent ID format: {0}")]
    InvalidAgentId(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AgentConfig {
    /// Load configuration from a TOML file and validate it
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field constraints that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_agent_id(&self.agent.id)?;

        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        let url = url::Url::parse(&self.llm.base_url).map_err(|e| {
            ConfigError::InvalidConfig(format!("llm.base_url '{}': {e}", self.llm.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidConfig(format!(
                "llm.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "llm.timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidConfig(format!(
                    "llm.temperature {temperature} is outside 0.0..=2.0"
                )));
            }
        }

        if self.routing.math_keywords.iter().all(|k| k.trim().is_empty())
            && self
                .routing
                .summary_keywords
                .iter()
                .all(|k| k.trim().is_empty())
        {
            tracing::warn!("No routing keywords configured, only arithmetic expressions will route");
        }

        Ok(())
    }

    /// Bearer key for the openai backend, if one is configured
    ///
    /// Resolved at call time so secrets never live in the config file.
    pub fn get_llm_api_key(&self) -> Result<Option<String>, ConfigError> {
        match &self.llm.api_key_env {
            Some(name) => std::env::var(name)
                .map(Some)
                .map_err(|_| ConfigError::EnvVarNotFound(name.clone())),
            None => Ok(None),
        }
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[agent]
id = "test-agent"
description = "A test agent"

[llm]
provider = "ollama"
model = "mistral"
base_url = "http://127.0.0.1:11434"
timeout_secs = 5
temperature = 0.2
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}

/// Validate agent ID format
fn validate_agent_id(agent_id: &str) -> Result<(), ConfigError> {
    let valid_chars = agent_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if agent_id.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidAgentId(format!(
            "Agent ID '{agent_id}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }

    Ok(())
}
