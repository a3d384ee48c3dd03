//! Routing agent pipeline
//!
//! Wires the chain `Router → TaskHandler → ModelClient → Recorder` for a
//! single query. The agent holds no mutable state, so one instance can serve
//! many queries at once; each run is an independent sequential chain whose
//! only suspension point is the model call.

use super::state::{RunOutcome, RunState};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::handlers::HandlerSet;
use crate::llm::client::{ModelClient, ModelOptions};
use crate::query::Query;
use crate::recorder::{Clock, ExecutionRecord, Recorder, SystemClock};
use crate::routing::{Classification, Router};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Query router plus handlers, bound to one model client
pub struct RoutingAgent {
    router: Router,
    handlers: HandlerSet,
    client: Arc<dyn ModelClient>,
    options: ModelOptions,
    recorder: Recorder,
}

impl RoutingAgent {
    /// Agent with the default router, handlers and system clock
    pub fn new(client: Arc<dyn ModelClient>, options: ModelOptions) -> Self {
        Self {
            router: Router::default(),
            handlers: HandlerSet::default(),
            client,
            options,
            recorder: Recorder::new(Arc::new(SystemClock)),
        }
    }

    /// Agent configured from an [`AgentConfig`]
    pub fn from_config(config: &AgentConfig, client: Arc<dyn ModelClient>) -> AgentResult<Self> {
        let router = Router::from_config(&config.routing)?;
        Ok(Self::new(client, config.llm.model_options()).with_router(router))
    }

    pub fn with_router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.recorder = Recorder::new(clock);
        self
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Classify without running a handler
    pub fn classify(&self, query: &Query) -> Classification {
        self.router.classify(query.text())
    }

    /// Process one query to a finished record
    ///
    /// Model failures are returned as-is; no partial record is produced.
    pub async fn run(&self, query: Query) -> AgentResult<ExecutionRecord> {
        let run_id = Uuid::new_v4();
        let (_, result) = self.execute(run_id, query).await;
        result
    }

    /// Process one query and fold the result into a terminal outcome
    pub async fn run_outcome(&self, query: Query) -> RunOutcome {
        let run_id = Uuid::new_v4();
        let (classification, result) = self.execute(run_id, query.clone()).await;
        match result {
            Ok(record) => RunOutcome::Recorded(record),
            Err(e) => RunOutcome::failed(query, classification.route, &e),
        }
    }

    /// Run a query, re-running it up to `retries` more times on transient model errors
    ///
    /// Backoff is 100, 200, then 300 ms between attempts. Permanent failures
    /// (unknown model, 4xx, empty output, clock skew) return immediately.
    pub async fn run_with_retries(&self, query: Query, retries: u32) -> RunOutcome {
        let mut attempt = 0u32;
        loop {
            let outcome = self.run_outcome(query.clone()).await;
            if !outcome.is_retryable() || attempt >= retries {
                return outcome;
            }
            attempt += 1;
            let backoff = Duration::from_millis(100 * u64::from(attempt.min(3)));
            warn!(
                attempt,
                retries,
                backoff_ms = backoff.as_millis() as u64,
                "Transient model failure, retrying"
            );
            tokio::time::sleep(backoff).await;
        }
    }

    /// Run a query unless `interrupt` resolves first
    ///
    /// Returns `None` when interrupted; the in-flight model call is dropped.
    pub async fn run_interruptible<S>(&self, query: Query, interrupt: S) -> Option<RunOutcome>
    where
        S: Future,
    {
        tokio::select! {
            _ = interrupt => {
                info!("Run interrupted");
                None
            }
            outcome = self.run_outcome(query) => Some(outcome),
        }
    }

    /// Process independent queries concurrently
    ///
    /// Outcomes come back in input order. A failure in one run has no effect
    /// on the others.
    pub async fn run_many(&self, queries: Vec<Query>) -> Vec<RunOutcome> {
        info!(count = queries.len(), "Running queries concurrently");
        join_all(queries.into_iter().map(|q| self.run_outcome(q))).await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        query: Query,
    ) -> (Classification, AgentResult<ExecutionRecord>) {
        let span = crate::query_span!(run_id = %run_id);

        async move {
            let mut state = RunState::Received;
            info!(input = %query, "Starting agent run");

            let classification = self.router.classify(query.text());
            let route = classification.route;
            advance(&mut state, RunState::Routed(route));

            let handler = self.handlers.handler_for(route);
            let work = handler.handle(&query, self.client.as_ref(), &self.options);
            let result = self.recorder.record(run_id, &query, route, work).await;

            match &result {
                Ok(record) => {
                    advance(&mut state, RunState::Handled);
                    advance(&mut state, RunState::Recorded);
                    info!(
                        route = %record.route,
                        processing_type = record.processing_type(),
                        duration_secs = record.duration_secs(),
                        "Agent run completed"
                    );
                }
                Err(e) => {
                    advance(&mut state, RunState::Failed(e.failure_reason()));
                    error!(route = %route, error = %e.user_message(), "Agent run failed");
                }
            }

            (classification, result)
        }
        .instrument(span)
        .await
    }
}

fn advance(state: &mut RunState, next: RunState) {
    debug_assert!(
        state.can_transition_to(&next),
        "illegal run transition {state} -> {next}"
    );
    debug!(from = %state, to = %next, "Run state transition");
    *state = next;
}

impl std::fmt::Debug for RoutingAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutingAgent")
            .field("router", &self.router)
            .field("client", &self.client.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Reject blank input before it reaches the agent
pub fn parse_query(input: &str) -> AgentResult<Query> {
    let query = Query::new(input.trim());
    if query.is_blank() {
        return Err(AgentError::invalid_input("Please enter a valid query"));
    }
    Ok(query)
}
