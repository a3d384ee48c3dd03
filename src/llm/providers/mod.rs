//! Model client implementations
//!
//! Concrete [`ModelClient`](crate::llm::ModelClient) backends for locally
//! hosted language models.

pub mod ollama;
pub mod openai;

pub use ollama::*;
pub use openai::*;
