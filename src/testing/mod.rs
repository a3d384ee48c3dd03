//! Testing utilities and mock implementations
//!
//! Mock implementations for exercising the routing agent without a model
//! server or a real clock.

pub mod mocks;

pub use mocks::*;
