//! Route Agent - query routing in front of a local language model
//!
//! A small agent that classifies each incoming query as a math problem, a
//! summarization request or a general question, then hands it to the matching
//! task handler. Every handler builds its own prompt and calls the same
//! locally hosted model. The outcome of each run is captured in an
//! [`ExecutionRecord`] with the route taken, timing and the model output.
//!
//! # Overview
//!
//! - Ordered, typed routing predicates with first-match-wins precedence
//! - Task handlers for math, summary and fallback prompts
//! - Backend-agnostic model client with Ollama and OpenAI-compatible backends
//! - Clock-injected result recording with clock-skew detection
//! - Transcript and console rendering of execution records
//!
//! # Quick Start
//!
//! ```rust
//! use route_agent::agent::RoutingAgent;
//! use route_agent::llm::ModelOptions;
//! use route_agent::testing::MockModelClient;
//! use route_agent::{Query, Route};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let client = Arc::new(MockModelClient::single_response("10 + 15 * 2 = 40"));
//! let agent = RoutingAgent::new(client, ModelOptions::default());
//!
//! let record = agent.run(Query::from("What is 10 + 15 * 2?")).await.unwrap();
//! assert_eq!(record.route, Route::Math);
//! assert!(record.output.contains("40"));
//! # });
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod observability;
pub mod query;
pub mod recorder;
pub mod report;
pub mod routing;
pub mod testing;

pub use agent::{RoutingAgent, RunOutcome, RunState};
pub use config::{AgentConfig, ConfigError};
pub use error::{AgentError, AgentResult, FailureReason};
pub use llm::{LlmError, ModelClient, ModelOptions};
pub use query::Query;
pub use recorder::{Clock, ExecutionRecord, Recorder, SystemClock};
pub use routing::{Classification, Route, Router};
