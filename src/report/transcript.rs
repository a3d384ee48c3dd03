//! Plain-text rendering of execution records
//!
//! Two shapes are produced from an [`ExecutionRecord`]: the transcript block
//! saved per run, and the boxed console block printed after a run.

use crate::error::AgentResult;
use crate::recorder::ExecutionRecord;
use chrono::Local;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

/// Width of the `=` rule around console output
pub const RULE_WIDTH: usize = 50;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render the transcript block for one run
///
/// `test_case` names the run when it belongs to a named batch.
pub fn render_transcript(record: &ExecutionRecord, test_case: Option<&str>) -> String {
    let mut out = String::new();

    if let Some(name) = test_case {
        let _ = writeln!(out, "Test Case: {name}");
    }
    let _ = writeln!(out, "Input: {}", record.query);
    let _ = writeln!(out, "Route: {}", record.route);
    let _ = writeln!(out, "Processing Type: {}", record.processing_type());
    let _ = writeln!(out, "Execution Time: {:.2}s", record.duration_secs());
    let _ = writeln!(
        out,
        "Timestamp: {}",
        record.finished_at.with_timezone(&Local).format(TIMESTAMP_FORMAT)
    );
    let _ = writeln!(out, "Output: {}", record.route.output_label());
    let _ = writeln!(out, "{}", record.output);

    out
}

/// Render the boxed block shown on the console after a run
pub fn render_console(record: &ExecutionRecord) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{rule}\nAGENT RESPONSE\n{rule}\n{label}\n{output}\n{rule}\nProcessing Type: {ptype}\nRoute Taken: {route}\n{rule}\n",
        label = record.route.output_label(),
        output = record.output,
        ptype = record.processing_type(),
        route = record.route,
    )
}

/// Writes numbered transcript files into one directory
#[derive(Debug, Clone)]
pub struct TranscriptWriter {
    dir: PathBuf,
}

impl TranscriptWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the transcript for the `index`-th run (1-based)
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("result_{index}.txt"))
    }

    /// Write one transcript, creating the directory if needed
    pub async fn write(
        &self,
        index: usize,
        record: &ExecutionRecord,
        test_case: Option<&str>,
    ) -> AgentResult<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(index);
        tokio::fs::write(&path, render_transcript(record, test_case)).await?;

        info!(path = %path.display(), run_id = %record.run_id, "Transcript saved");
        Ok(path)
    }
}
