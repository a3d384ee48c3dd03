//! Batch performance summary

use crate::agent::RunOutcome;
use crate::recorder::ExecutionRecord;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Timing totals over a batch of runs
///
/// Only recorded runs contribute to the timing figures; failed runs are
/// counted separately.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub completed: usize,
    pub failed: usize,
    pub total_secs: f64,
    pub average_secs: f64,
}

impl BatchSummary {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a ExecutionRecord>,
    {
        let mut completed = 0;
        let mut total = Duration::ZERO;
        for record in records {
            completed += 1;
            total += record.duration;
        }
        Self::build(completed, 0, total)
    }

    pub fn from_outcomes(outcomes: &[RunOutcome]) -> Self {
        let mut summary = Self::from_records(outcomes.iter().filter_map(RunOutcome::record));
        summary.failed = outcomes.len() - summary.completed;
        summary
    }

    fn build(completed: usize, failed: usize, total: Duration) -> Self {
        let total_secs = total.as_secs_f64();
        let average_secs = if completed == 0 {
            0.0
        } else {
            total_secs / completed as f64
        };
        Self {
            completed,
            failed,
            total_secs,
            average_secs,
        }
    }

    /// Throughput at the average run time; `None` when nothing was timed
    pub fn queries_per_minute(&self) -> Option<f64> {
        (self.average_secs > 0.0).then(|| 60.0 / self.average_secs)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Summary:")?;
        writeln!(f, "Completed: {}", self.completed)?;
        if self.failed > 0 {
            writeln!(f, "Failed: {}", self.failed)?;
        }
        writeln!(f, "Total Time: {:.2}s", self.total_secs)?;
        writeln!(f, "Average Time: {:.2}s", self.average_secs)?;
        match self.queries_per_minute() {
            Some(qpm) => writeln!(f, "Queries per minute: {qpm:.1}"),
            None => writeln!(f, "Queries per minute: n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use crate::llm::client::LlmError;
    use crate::query::Query;
    use crate::routing::Route;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(millis: u64) -> ExecutionRecord {
        let now = Utc::now();
        ExecutionRecord {
            run_id: Uuid::new_v4(),
            query: Query::from("q"),
            route: Route::Fallback,
            output: "out".to_string(),
            started_at: now,
            finished_at: now + chrono::Duration::milliseconds(millis as i64),
            duration: Duration::from_millis(millis),
        }
    }

    #[test]
    fn test_totals_and_average() {
        let records = [record(1000), record(2000), record(3000)];
        let summary = BatchSummary::from_records(&records);

        assert_eq!(summary.completed, 3);
        assert!((summary.total_secs - 6.0).abs() < 1e-9);
        assert!((summary.average_secs - 2.0).abs() < 1e-9);
        assert!((summary.queries_per_minute().unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_failed_runs_are_counted_not_timed() {
        let failure = AgentError::from(LlmError::Timeout(Duration::from_secs(1)));
        let outcomes = vec![
            RunOutcome::Recorded(record(500)),
            RunOutcome::failed(Query::from("2 + 2"), Route::Math, &failure),
        ];
        let summary = BatchSummary::from_outcomes(&outcomes);

        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);
        assert!((summary.average_secs - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_batch_has_no_throughput() {
        let summary = BatchSummary::from_records(std::iter::empty());
        assert_eq!(summary.queries_per_minute(), None);
        assert!(summary.to_string().contains("Queries per minute: n/a"));
    }
}
