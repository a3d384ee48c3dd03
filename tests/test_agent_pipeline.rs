//! End-to-end tests of the routing agent over a mock model client
//!
//! Each test drives a full run (route, handle, record) and checks the
//! observable outcome: the record produced, or the failure reason and the
//! absence of a record.


use route_agent::agent::{RoutingAgent, RunOutcome, RunState};
use route_agent::error::{AgentError, FailureReason};
use route_agent::llm::LlmError;
use route_agent::testing::MockModelClient;
use route_agent::{Query, Route};
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_helpers::{agent_with, agent_with_clock, instant, options_with_wait};

const LANGGRAPH_TEXT: &str = "Summarize: LangGraph is a powerful tool for building agent workflows \
with non-linear processing capabilities. It enables developers to create sophisticated \
multi-agent systems.";

/// Answers like a small local model would, keyed on the handler prompt
fn scripted_model() -> MockModelClient {
    MockModelClient::with_responder(|prompt| {
        if prompt.contains("mathematical problem solver") {
            Ok("1. 15 * 2 = 30\n2. 10 + 30 = 40\nFinal answer: 40".to_string())
        } else if prompt.contains("summarization expert") {
            Ok("LangGraph builds non-linear multi-agent workflows.".to_string())
        } else {
            Ok("I'm doing well, thank you for asking!".to_string())
        }
    })
}

#[tokio::test]
async fn test_math_query_is_routed_and_answered() {
    let agent = agent_with(Arc::new(scripted_model()));

    let record = agent.run(Query::from("What is 10 + 15 * 2?")).await.unwrap();

    assert_eq!(record.route, Route::Math);
    assert_eq!(record.processing_type(), "mathematical");
    assert!(record.output.contains("40"));
}

#[tokio::test]
async fn test_summary_is_shorter_than_input() {
    let agent = agent_with(Arc::new(scripted_model()));

    let record = agent.run(Query::from(LANGGRAPH_TEXT)).await.unwrap();

    assert_eq!(record.route, Route::Summary);
    assert!(record.output.len() < LANGGRAPH_TEXT.len());
}

#[tokio::test]
async fn test_general_query_gets_nonempty_answer() {
    let agent = agent_with(Arc::new(scripted_model()));

    let record = agent.run(Query::from("Hello, how are you?")).await.unwrap();

    assert_eq!(record.route, Route::Fallback);
    assert!(!record.output.trim().is_empty());
}

#[tokio::test]
async fn test_output_is_passed_through_verbatim() {
    let raw = "  **Answer**: 4\n\n";
    let agent = agent_with(Arc::new(MockModelClient::single_response(raw)));

    let record = agent.run(Query::from("2 + 2")).await.unwrap();

    assert_eq!(record.output, raw);
}

#[tokio::test]
async fn test_handler_prompt_reaches_model() {
    let client = Arc::new(scripted_model());
    let agent = agent_with(client.clone());

    agent
        .run(Query::from("Summarize: how is earth formed?"))
        .await
        .unwrap();

    let prompts = client.received_prompts().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Text to summarize: how is earth formed?"));
}

#[tokio::test]
async fn test_ambiguous_query_resolves_to_math() {
    let client = Arc::new(scripted_model());
    let agent = agent_with(client.clone());
    let query = Query::from("Summarize: revenue grew 10 + 5 percent");

    let classification = agent.classify(&query);
    assert!(classification.is_ambiguous());
    assert_eq!(classification.candidates, vec![Route::Math, Route::Summary]);

    let record = agent.run(query).await.unwrap();
    assert_eq!(record.route, Route::Math);
    assert!(client.received_prompts().await[0].contains("Problem:"));
}

#[tokio::test]
async fn test_model_timeout_fails_without_record() {
    let client = MockModelClient::single_response("too late").with_delay(Duration::from_millis(300));
    let agent = RoutingAgent::new(Arc::new(client), options_with_wait(Duration::from_millis(50)));

    let outcome = agent.run_outcome(Query::from("What is 2 + 2?")).await;

    assert_eq!(outcome.failure_reason(), Some(FailureReason::ModelTimeout));
    assert_eq!(outcome.state(), RunState::Failed(FailureReason::ModelTimeout));
    assert!(outcome.record().is_none());
    assert_eq!(outcome.route(), Route::Math);
}

#[tokio::test]
async fn test_timeout_error_carries_max_wait() {
    let client = MockModelClient::single_response("too late").with_delay(Duration::from_millis(300));
    let agent = RoutingAgent::new(Arc::new(client), options_with_wait(Duration::from_millis(50)));

    let error = agent.run(Query::from("hello")).await.unwrap_err();

    assert!(matches!(
        error,
        AgentError::Model(LlmError::Timeout(wait)) if wait == Duration::from_millis(50)
    ));
}

#[tokio::test]
async fn test_unavailable_model_fails_run() {
    let client = MockModelClient::with_failure(LlmError::Unavailable(
        "connection refused".to_string(),
    ));
    let agent = agent_with(Arc::new(client));

    let outcome = agent.run_outcome(Query::from("Tell me a joke")).await;

    assert_eq!(outcome.failure_reason(), Some(FailureReason::ModelUnavailable));
    assert!(outcome.is_retryable());
}

#[tokio::test]
async fn test_blank_model_output_is_empty_response() {
    let agent = agent_with(Arc::new(MockModelClient::single_response(" \n\t ")));

    let outcome = agent.run_outcome(Query::from("Hello")).await;

    assert_eq!(outcome.failure_reason(), Some(FailureReason::EmptyResponse));
    assert!(!outcome.is_retryable());
}

#[tokio::test]
async fn test_duration_comes_from_clock_readings() {
    let agent = agent_with_clock(
        Arc::new(scripted_model()),
        vec![instant(1_000), instant(1_003)],
    );

    let record = agent.run(Query::from("Hello")).await.unwrap();

    assert_eq!(record.started_at, instant(1_000));
    assert_eq!(record.finished_at, instant(1_003));
    assert_eq!(record.duration, Duration::from_secs(3));
}

#[tokio::test]
async fn test_clock_running_backwards_is_clock_skew() {
    let agent = agent_with_clock(
        Arc::new(scripted_model()),
        vec![instant(2_000), instant(1_999)],
    );

    let outcome = agent.run_outcome(Query::from("Hello")).await;

    assert_eq!(outcome.failure_reason(), Some(FailureReason::ClockSkew));
    assert!(outcome.record().is_none());
}

#[tokio::test]
async fn test_run_many_isolates_failures_and_keeps_order() {
    let client = MockModelClient::with_responder(|prompt| {
        if prompt.contains("weather") {
            Err(LlmError::Unavailable("backend restarting".to_string()))
        } else {
            Ok("ok".to_string())
        }
    });
    let agent = agent_with(Arc::new(client));

    let outcomes = agent
        .run_many(vec![
            Query::from("Calculate 100 / 5"),
            Query::from("What's the weather like?"),
            Query::from("Sum up this information"),
        ])
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_recorded());
    assert_eq!(outcomes[0].route(), Route::Math);
    assert_eq!(
        outcomes[1].failure_reason(),
        Some(FailureReason::ModelUnavailable)
    );
    assert_eq!(outcomes[1].route(), Route::Fallback);
    assert!(outcomes[2].is_recorded());
    assert_eq!(outcomes[2].route(), Route::Summary);
}

#[tokio::test]
async fn test_run_many_runs_queries_concurrently() {
    let client = MockModelClient::single_response("done").with_delay(Duration::from_millis(200));
    let agent = agent_with(Arc::new(client));
    let queries: Vec<Query> = (0..4).map(|i| Query::new(format!("{i} + {i}"))).collect();

    let started = Instant::now();
    let outcomes = agent.run_many(queries).await;

    assert!(outcomes.iter().all(RunOutcome::is_recorded));
    assert!(started.elapsed() < Duration::from_millis(700));
}

#[tokio::test]
async fn test_each_run_gets_its_own_id() {
    let agent = agent_with(Arc::new(scripted_model()));

    let first = agent.run(Query::from("Hello")).await.unwrap();
    let second = agent.run(Query::from("Hello")).await.unwrap();

    assert_ne!(first.run_id, second.run_id);
}
