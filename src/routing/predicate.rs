//! Typed routing predicates
//!
//! Each predicate inspects query text for one kind of task signal and names
//! the [`Route`] it votes for. Predicates never call the model.

use super::route::Route;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

pub const DEFAULT_MATH_KEYWORDS: &[&str] = &["calculate", "compute", "solve", "math", "equation"];

pub const DEFAULT_SUMMARY_KEYWORDS: &[&str] = &["summarize", "summarise", "summary", "sum up"];

/// A digit, an operator, then a digit or an opening parenthesis.
/// `non-linear` has no digits around the hyphen and does not match.
static ARITHMETIC_EXPR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d\s*[-+*/×÷^%]\s*-?\s*[\d(]").expect("arithmetic pattern is valid")
});

/// A single routing signal evaluated against query text
pub trait RoutePredicate: Send + Sync + fmt::Debug {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Route this predicate selects when it matches
    fn route(&self) -> Route;

    fn matches(&self, text: &str) -> bool;
}

/// Case-insensitive whole-word matcher over a keyword list
///
/// Multi-word keywords ("sum up") tolerate any run of whitespace between words.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    pattern: Option<Regex>,
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self, regex::Error> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.is_empty() {
            return Ok(Self {
                pattern: None,
                keywords,
            });
        }

        let alternatives = keywords
            .iter()
            .map(|k| {
                k.split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+")
            })
            .collect::<Vec<_>>()
            .join("|");

        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternatives})\b"))?;
        Ok(Self {
            pattern: Some(pattern),
            keywords,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(text))
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Votes for [`Route::Math`] on arithmetic expressions or math keywords
#[derive(Debug, Clone)]
pub struct ArithmeticPredicate {
    keywords: KeywordSet,
}

impl ArithmeticPredicate {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }

    /// True when the text holds something like `10 + 15 * 2`
    pub fn has_expression(text: &str) -> bool {
        ARITHMETIC_EXPR.is_match(text)
    }
}

impl Default for ArithmeticPredicate {
    fn default() -> Self {
        Self::new(KeywordSet::new(DEFAULT_MATH_KEYWORDS).expect("default math keywords are valid"))
    }
}

impl RoutePredicate for ArithmeticPredicate {
    fn name(&self) -> &str {
        "arithmetic"
    }

    fn route(&self) -> Route {
        Route::Math
    }

    fn matches(&self, text: &str) -> bool {
        Self::has_expression(text) || self.keywords.is_match(text)
    }
}

/// Votes for [`Route::Summary`] on an explicit summarization instruction
#[derive(Debug, Clone)]
pub struct SummaryPredicate {
    keywords: KeywordSet,
}

impl SummaryPredicate {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }
}

impl Default for SummaryPredicate {
    fn default() -> Self {
        Self::new(
            KeywordSet::new(DEFAULT_SUMMARY_KEYWORDS).expect("default summary keywords are valid"),
        )
    }
}

impl RoutePredicate for SummaryPredicate {
    fn name(&self) -> &str {
        "summary_instruction"
    }

    fn route(&self) -> Route {
        Route::Summary
    }

    fn matches(&self, text: &str) -> bool {
        self.keywords.is_match(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_expressions() {
        assert!(ArithmeticPredicate::has_expression("15 + 25 * 3"));
        assert!(ArithmeticPredicate::has_expression("What is 2+2?"));
        assert!(ArithmeticPredicate::has_expression("100 / 5"));
        assert!(ArithmeticPredicate::has_expression("7 * (3 + 1)"));
        assert!(ArithmeticPredicate::has_expression("5 - -3"));
        assert!(ArithmeticPredicate::has_expression("2^10"));
    }

    #[test]
    fn test_hyphenated_words_are_not_arithmetic() {
        assert!(!ArithmeticPredicate::has_expression("non-linear processing"));
        assert!(!ArithmeticPredicate::has_expression("a well-known top-5 list"));
        assert!(!ArithmeticPredicate::has_expression("I scored 10%"));
        assert!(!ArithmeticPredicate::has_expression("and/or"));
    }

    #[test]
    fn test_math_keywords_are_whole_words() {
        let predicate = ArithmeticPredicate::default();
        assert!(predicate.matches("Please calculate my taxes"));
        assert!(predicate.matches("SOLVE for x"));
        assert!(!predicate.matches("The mathematician arrived"));
        assert!(!predicate.matches("a dissolved tablet"));
    }

    #[test]
    fn test_summary_keywords() {
        let predicate = SummaryPredicate::default();
        assert!(predicate.matches("Summarize: the meeting notes"));
        assert!(predicate.matches("give me a summary"));
        assert!(predicate.matches("Sum   up this article"));
        assert!(!predicate.matches("summer holidays"));
        assert!(!predicate.matches("sum of two numbers"));
    }

    #[test]
    fn test_keyword_set_ignores_blank_entries() {
        let set = KeywordSet::new(&["  ", "Explain Like"]).unwrap();
        assert_eq!(set.keywords(), &["explain like".to_string()]);
        assert!(set.is_match("explain  like I'm five"));
    }

    #[test]
    fn test_empty_keyword_set_never_matches() {
        let set = KeywordSet::new::<&str>(&[]).unwrap();
        assert!(!set.is_match("anything at all"));
    }

    #[test]
    fn test_keywords_with_regex_metacharacters_are_escaped() {
        let set = KeywordSet::new(&["c++"]).unwrap();
        assert!(!set.is_match("ccc"));
    }
}
