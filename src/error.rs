//! Error types for the routing agent
//!
//! Model errors propagate through [`AgentError::Model`] unchanged. Every
//! failed run maps onto exactly one [`FailureReason`].

use crate::llm::client::LlmError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("secret pattern is valid")
});

static SENSITIVE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("path pattern is valid")
});

const MAX_MESSAGE_LEN: usize = 500;

/// Main error type for agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model client error: {0}")]
    Model(#[from] LlmError),

    #[error("Clock skew: run finished at {finished} before it started at {started}")]
    ClockSkew {
        started: DateTime<Utc>,
        finished: DateTime<Utc>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Why a run ended in the failed state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    ModelUnavailable,
    ModelTimeout,
    EmptyResponse,
    ClockSkew,
    InvalidInput,
    Internal,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::ModelUnavailable => "ModelUnavailable",
            FailureReason::ModelTimeout => "ModelTimeout",
            FailureReason::EmptyResponse => "EmptyResponse",
            FailureReason::ClockSkew => "ClockSkew",
            FailureReason::InvalidInput => "InvalidInput",
            FailureReason::Internal => "Internal",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&LlmError> for FailureReason {
    fn from(error: &LlmError) -> Self {
        match error {
            LlmError::Timeout(_) => FailureReason::ModelTimeout,
            LlmError::EmptyResponse => FailureReason::EmptyResponse,
            LlmError::Unavailable(_)
            | LlmError::ModelNotFound(_)
            | LlmError::Api { .. }
            | LlmError::InvalidResponse(_)
            | LlmError::NotConfigured(_) => FailureReason::ModelUnavailable,
        }
    }
}

impl AgentError {
    /// Terminal failure reason for this error
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            AgentError::Model(e) => FailureReason::from(e),
            AgentError::ClockSkew { .. } => FailureReason::ClockSkew,
            AgentError::InvalidInput { .. } => FailureReason::InvalidInput,
            AgentError::Config(_) | AgentError::Io(_) | AgentError::Internal { .. } => {
                FailureReason::Internal
            }
        }
    }

    /// Whether re-running the whole query could succeed
    ///
    /// Only transient model errors qualify; see [`LlmError::is_transient`].
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Model(e) if e.is_transient())
    }

    /// Error text safe to print or persist
    pub fn user_message(&self) -> String {
        sanitize_error_message(&self.to_string())
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}

/// Redact secrets and sensitive paths, and cap the length
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PATTERN
        .replace_all(message, "${1}=***")
        .to_string();

    sanitized = SENSITIVE_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    if sanitized.len() > MAX_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let mut cut = MAX_MESSAGE_LEN - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], truncate_suffix);
    }

    sanitized
}

/// Result type for agent operations
pub type AgentResult<T> = Result<T, AgentError>;
