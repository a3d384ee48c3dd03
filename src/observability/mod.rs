//! Observability
//!
//! Structured logging setup and the span macros used around query runs and
//! model calls.

pub mod logging;

pub use logging::{init_default_logging, init_logging, parse_level, LogFormat};

// Span macros for structured logging
pub use logging::{model_span, query_span};
