//! Route labels and their presentation metadata

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The handler a query is dispatched to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Math,
    Summary,
    Fallback,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Math, Route::Summary, Route::Fallback];

    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Math => "math",
            Route::Summary => "summary",
            Route::Fallback => "fallback",
        }
    }

    /// Human-readable kind of processing performed on this route
    pub fn processing_type(&self) -> &'static str {
        match self {
            Route::Math => "mathematical",
            Route::Summary => "summarization",
            Route::Fallback => "general",
        }
    }

    /// Section header placed in front of the model output in transcripts
    pub fn output_label(&self) -> &'static str {
        match self {
            Route::Math => "[MATH] Math Solution:",
            Route::Summary => "[SUMMARY] Summary:",
            Route::Fallback => "[GENERAL] General Response:",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "math" => Ok(Route::Math),
            // "summarizer" is the node name older transcripts used
            "summary" | "summarizer" => Ok(Route::Summary),
            "fallback" | "general" => Ok(Route::Fallback),
            other => Err(format!("Unknown route: {other}")),
        }
    }
}
