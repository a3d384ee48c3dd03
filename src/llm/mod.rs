//! Model client layer
//!
//! This module provides a backend-agnostic interface over the external
//! language-model service plus the concrete local backends (Ollama and
//! OpenAI-compatible servers).

pub mod client;
pub mod providers;

pub use client::*;
pub use providers::*;
