//! Result recording
//!
//! The [`Recorder`] wraps one handler invocation. It reads the clock before
//! delegating and again once the output is available, then packs everything
//! into an [`ExecutionRecord`]. A failed handler produces no record at all.

use crate::error::{AgentError, AgentResult};
use crate::llm::client::LlmError;
use crate::query::Query;
use crate::routing::Route;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Structured outcome of one successfully processed query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub run_id: Uuid,
    pub query: Query,
    pub route: Route,
    /// Model output, verbatim
    pub output: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `finished_at - started_at`, never negative
    #[serde(rename = "duration_secs", with = "duration_secs")]
    pub duration: Duration,
}

impl ExecutionRecord {
    pub fn processing_type(&self) -> &'static str {
        self.route.processing_type()
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Elapsed time between two readings, rejecting a clock that ran backwards
pub fn elapsed(started: DateTime<Utc>, finished: DateTime<Utc>) -> AgentResult<Duration> {
    (finished - started)
        .to_std()
        .map_err(|_| AgentError::ClockSkew { started, finished })
}

/// Times a handler invocation and builds its [`ExecutionRecord`]
#[derive(Clone)]
pub struct Recorder {
    clock: Arc<dyn Clock>,
}

impl Recorder {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Await `work` between two clock readings
    ///
    /// Model errors are returned unchanged and no record is produced.
    pub async fn record<F>(
        &self,
        run_id: Uuid,
        query: &Query,
        route: Route,
        work: F,
    ) -> AgentResult<ExecutionRecord>
    where
        F: Future<Output = Result<String, LlmError>>,
    {
        let started_at = self.clock.now();
        let output = work.await?;
        let finished_at = self.clock.now();
        let duration = elapsed(started_at, finished_at)?;

        Ok(ExecutionRecord {
            run_id,
            query: query.clone(),
            route,
            output,
            started_at,
            finished_at,
            duration,
        })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

mod duration_secs {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
