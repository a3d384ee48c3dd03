//! Concise summarization handler

use super::TaskHandler;
use crate::query::Query;
use crate::routing::Route;
use once_cell::sync::Lazy;
use regex::Regex;

static INSTRUCTION_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:summari[sz]e|sum\s+up)\b\s*:?\s*").expect("prefix pattern is valid")
});

/// Asks the model for a short summary of the supplied text
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryHandler;

impl SummaryHandler {
    /// Text left once a leading "Summarize:" style instruction is removed
    pub fn source_text(query: &Query) -> &str {
        let text = query.text();
        let body = match INSTRUCTION_PREFIX.find(text) {
            Some(m) => &text[m.end()..],
            None => text.trim_start(),
        };
        body.trim_end()
    }
}

impl TaskHandler for SummaryHandler {
    fn route(&self) -> Route {
        Route::Summary
    }

    fn build_prompt(&self, query: &Query) -> String {
        format!(
            "You are a text summarization expert. Create a concise and informative summary of the following text.\n\
             \n\
             Text to summarize: {}\n\
             \n\
             Please provide:\n\
             1. A brief summary (2-3 sentences)\n\
             2. Key points if applicable\n\
             \n\
             Keep it clear and concise.",
            Self::source_text(query)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_prefix_is_stripped() {
        assert_eq!(
            SummaryHandler::source_text(&Query::from("Summarize: how is earth formed?")),
            "how is earth formed?"
        );
        assert_eq!(
            SummaryHandler::source_text(&Query::from("summarise the minutes")),
            "the minutes"
        );
        assert_eq!(
            SummaryHandler::source_text(&Query::from("Sum up: tech evolves ")),
            "tech evolves"
        );
    }

    #[test]
    fn test_keyword_in_the_middle_is_kept() {
        assert_eq!(
            SummaryHandler::source_text(&Query::from("Please summarize the following text")),
            "Please summarize the following text"
        );
    }

    #[test]
    fn test_longer_word_is_not_an_instruction() {
        assert_eq!(
            SummaryHandler::source_text(&Query::from("Summarizers give a summary of long text")),
            "Summarizers give a summary of long text"
        );
        assert_eq!(
            SummaryHandler::source_text(&Query::from("summary: quarterly numbers")),
            "summary: quarterly numbers"
        );
    }

    #[test]
    fn test_prompt_uses_source_text() {
        let prompt = SummaryHandler.build_prompt(&Query::from("Summarize: LangGraph builds agents"));
        assert!(prompt.contains("Text to summarize: LangGraph builds agents\n"));
        assert!(prompt.contains("2-3 sentences"));
    }
}
