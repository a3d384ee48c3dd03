//! Agent pipeline and run lifecycle

pub mod pipeline;
pub mod state;

pub use pipeline::{parse_query, RoutingAgent};
pub use state::{RunOutcome, RunState};
