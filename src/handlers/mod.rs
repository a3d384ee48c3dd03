//! Task handlers
//!
//! One handler per [`Route`]. A handler turns the query into a task-specific
//! prompt, sends it to the model client and hands the completion back
//! verbatim. Handlers never retry; a failed or timed-out model call surfaces
//! as an [`LlmError`] for the caller to deal with.

pub mod fallback;
pub mod math;
pub mod summary;

pub use fallback::FallbackHandler;
pub use math::MathHandler;
pub use summary::SummaryHandler;

use crate::llm::client::{CompletionRequest, LlmError, ModelClient, ModelOptions};
use crate::query::Query;
use crate::routing::Route;
use async_trait::async_trait;
use tracing::{debug, Instrument};

/// Capability shared by all handlers: query in, finished text out
#[async_trait]
pub trait TaskHandler: Send + Sync {
    /// Route this handler serves
    fn route(&self) -> Route;

    /// Build the model prompt for a query (pure)
    fn build_prompt(&self, query: &Query) -> String;

    /// Run the query through the model
    async fn handle(
        &self,
        query: &Query,
        client: &dyn ModelClient,
        options: &ModelOptions,
    ) -> Result<String, LlmError> {
        let prompt = self.build_prompt(query);
        invoke_model(client, prompt, options).await
    }
}

/// Send one prompt to the model, bounded by `options.max_wait`
///
/// Whitespace-only completions are reported as [`LlmError::EmptyResponse`].
pub async fn invoke_model(
    client: &dyn ModelClient,
    prompt: String,
    options: &ModelOptions,
) -> Result<String, LlmError> {
    let span = crate::model_span!(backend = client.name(), model = %options.model);

    async move {
        debug!(prompt_chars = prompt.len(), "Sending prompt to model");
        let request = CompletionRequest::new(prompt, options.clone());

        let response = tokio::time::timeout(options.max_wait, client.complete(request))
            .await
            .map_err(|_| LlmError::Timeout(options.max_wait))??;

        if response.text.trim().is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        debug!(
            output_chars = response.text.len(),
            total_tokens = response.usage.total(),
            "Model completion received"
        );
        Ok(response.text)
    }
    .instrument(span)
    .await
}

/// Total dispatch table from route to handler
pub struct HandlerSet {
    math: Box<dyn TaskHandler>,
    summary: Box<dyn TaskHandler>,
    fallback: Box<dyn TaskHandler>,
}

impl HandlerSet {
    pub fn new(
        math: Box<dyn TaskHandler>,
        summary: Box<dyn TaskHandler>,
        fallback: Box<dyn TaskHandler>,
    ) -> Self {
        Self {
            math,
            summary,
            fallback,
        }
    }

    pub fn handler_for(&self, route: Route) -> &dyn TaskHandler {
        match route {
            Route::Math => self.math.as_ref(),
            Route::Summary => self.summary.as_ref(),
            Route::Fallback => self.fallback.as_ref(),
        }
    }
}

impl Default for HandlerSet {
    fn default() -> Self {
        Self::new(
            Box::new(MathHandler),
            Box::new(SummaryHandler),
            Box::new(FallbackHandler),
        )
    }
}
