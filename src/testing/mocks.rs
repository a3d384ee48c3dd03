//! Mock implementations for testing
//!
//! Provides a scripted [`ModelClient`] and a scripted [`Clock`] so the whole
//! routing chain can be exercised without a running model server.

use crate::llm::client::{
    CompletionRequest, CompletionResponse, LlmError, ModelClient, TokenUsage,
};
use crate::recorder::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;

/// Reply produced by [`MockModelClient::with_responder`]
pub type Responder = dyn Fn(&str) -> Result<String, LlmError> + Send + Sync;

/// Mock model client for testing
///
/// Answers come from, in order of priority: the configured failure, the
/// responder closure, then the scripted responses (cycled).
pub struct MockModelClient {
    pub responses: Vec<String>,
    pub current_response: Arc<Mutex<usize>>,
    pub failure: Option<LlmError>,
    pub delay: Option<Duration>,
    responder: Option<Arc<Responder>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockModelClient {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            current_response: Arc::new(Mutex::new(0)),
            failure: None,
            delay: None,
            responder: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Every call fails with `error`
    pub fn with_failure(error: LlmError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new(vec![])
        }
    }

    /// Answer each prompt with a function of the prompt text
    pub fn with_responder<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            responder: Some(Arc::new(responder)),
            ..Self::new(vec![])
        }
    }

    /// Sleep before answering, to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts received so far, in call order
    pub async fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.prompts.lock().await.push(request.prompt.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let text = match &self.responder {
            Some(responder) => responder(&request.prompt)?,
            None => {
                let mut current = self.current_response.lock().await;
                let response_idx = *current % self.responses.len().max(1);
                *current += 1;

                self.responses
                    .get(response_idx)
                    .cloned()
                    .unwrap_or_else(|| "Mock response".to_string())
            }
        };

        Ok(CompletionResponse {
            text,
            model: request.options.model,
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            },
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

/// Clock that replays a fixed sequence of instants
///
/// Once the script runs out the last instant is repeated.
#[derive(Debug)]
pub struct ScriptedClock {
    script: StdMutex<ClockScript>,
}

#[derive(Debug)]
struct ClockScript {
    pending: VecDeque<DateTime<Utc>>,
    last: DateTime<Utc>,
}

impl ScriptedClock {
    pub fn new(instants: Vec<DateTime<Utc>>) -> Self {
        let last = instants.first().copied().unwrap_or_else(Utc::now);
        Self {
            script: StdMutex::new(ClockScript {
                pending: instants.into(),
                last,
            }),
        }
    }
}

impl Clock for ScriptedClock {
    fn now(&self) -> DateTime<Utc> {
        let mut script = self.script.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(next) = script.pending.pop_front() {
            script.last = next;
        }
        script.last
    }
}
