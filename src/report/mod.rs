//! Presentation of execution records: transcripts, console output and batch
//! summaries

pub mod summary;
pub mod transcript;

pub use summary::BatchSummary;
pub use transcript::{render_console, render_transcript, TranscriptWriter};
