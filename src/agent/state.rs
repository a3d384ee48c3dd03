//! Run lifecycle states and terminal outcomes

use crate::error::{AgentError, FailureReason};
use crate::query::Query;
use crate::recorder::ExecutionRecord;
use crate::routing::Route;
use serde::Serialize;
use std::fmt;

/// Where a single run currently is
///
/// `Received → Routed → Handled → Recorded`, or `Failed` from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    Routed(Route),
    Handled,
    Recorded,
    Failed(FailureReason),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Recorded | RunState::Failed(_))
    }

    /// Whether `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match (self, next) {
            (RunState::Received, RunState::Routed(_)) => true,
            (RunState::Routed(_), RunState::Handled) => true,
            (RunState::Handled, RunState::Recorded) => true,
            (state, RunState::Failed(_)) => !state.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Received => f.write_str("received"),
            RunState::Routed(route) => write!(f, "routed({route})"),
            RunState::Handled => f.write_str("handled"),
            RunState::Recorded => f.write_str("recorded"),
            RunState::Failed(reason) => write!(f, "failed({reason})"),
        }
    }
}

/// Terminal value of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Recorded(ExecutionRecord),
    Failed {
        query: Query,
        /// Route chosen before the failure
        route: Route,
        reason: FailureReason,
        message: String,
        /// Whether re-running the query could succeed
        retryable: bool,
    },
}

impl RunOutcome {
    pub fn failed(query: Query, route: Route, error: &AgentError) -> Self {
        RunOutcome::Failed {
            query,
            route,
            reason: error.failure_reason(),
            message: error.user_message(),
            retryable: error.is_retryable(),
        }
    }

    pub fn record(&self) -> Option<&ExecutionRecord> {
        match self {
            RunOutcome::Recorded(record) => Some(record),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            RunOutcome::Recorded(_) => None,
            RunOutcome::Failed { reason, .. } => Some(*reason),
        }
    }

    pub fn route(&self) -> Route {
        match self {
            RunOutcome::Recorded(record) => record.route,
            RunOutcome::Failed { route, .. } => *route,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, RunOutcome::Failed { retryable: true, .. })
    }

    pub fn is_recorded(&self) -> bool {
        matches!(self, RunOutcome::Recorded(_))
    }

    pub fn state(&self) -> RunState {
        match self {
            RunOutcome::Recorded(_) => RunState::Recorded,
            RunOutcome::Failed { reason, .. } => RunState::Failed(*reason),
        }
    }
}
