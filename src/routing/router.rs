//! Query Router
//!
//! The router decides which task handler a query goes to. It holds an ordered
//! list of [`RoutePredicate`]s and evaluates all of them against the query
//! text. The first predicate in list order that matches decides the route; if
//! none match the query goes to [`Route::Fallback`]. Routing is therefore
//! total and deterministic.
//!
//! ## Precedence
//!
//! The default order is:
//!
//! 1. [`ArithmeticPredicate`] → [`Route::Math`]
//! 2. [`SummaryPredicate`] → [`Route::Summary`]
//!
//! A query such as `"Summarize: revenue grew 10 + 5 percent"` matches both
//! and is routed to math. The other candidates are kept on the
//! [`Classification`] and logged as an ambiguous classification, which is
//! informational only.
//!
//! # Example
//!
//! ```rust
//! use route_agent::routing::{Route, Router};
//!
//! let router = Router::default();
//! assert_eq!(router.route("What is 10 + 15 * 2?"), Route::Math);
//! assert_eq!(router.route("Summarize: the quarterly report"), Route::Summary);
//! assert_eq!(router.route("Hello, how are you?"), Route::Fallback);
//! ```

use super::predicate::{ArithmeticPredicate, KeywordSet, RoutePredicate, SummaryPredicate};
use super::route::Route;
use crate::config::{ConfigError, RoutingSection};
use serde::Serialize;
use tracing::{info, warn};

/// Outcome of classifying one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// The route the query is dispatched to
    pub route: Route,
    /// Every route whose predicate matched, in evaluation order
    pub candidates: Vec<Route>,
}

impl Classification {
    /// More than one specialized route matched and precedence decided
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    /// No specialized predicate matched
    pub fn is_fallback(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Ordered, first-match-wins query router
#[derive(Debug)]
pub struct Router {
    predicates: Vec<Box<dyn RoutePredicate>>,
}

impl Router {
    /// Build a router from predicates listed in priority order
    pub fn new(predicates: Vec<Box<dyn RoutePredicate>>) -> Self {
        Self { predicates }
    }

    /// Build the default predicate chain with configured keyword lists
    pub fn from_config(routing: &RoutingSection) -> Result<Self, ConfigError> {
        let math = KeywordSet::new(routing.math_keywords.as_slice())
            .map_err(|e| ConfigError::InvalidConfig(format!("math_keywords: {e}")))?;
        let summary = KeywordSet::new(routing.summary_keywords.as_slice())
            .map_err(|e| ConfigError::InvalidConfig(format!("summary_keywords: {e}")))?;

        Ok(Self::new(vec![
            Box::new(ArithmeticPredicate::new(math)),
            Box::new(SummaryPredicate::new(summary)),
        ]))
    }

    /// Predicate names and routes in evaluation order
    pub fn precedence(&self) -> Vec<(&str, Route)> {
        self.predicates
            .iter()
            .map(|p| (p.name(), p.route()))
            .collect()
    }

    /// Classify a query, keeping every matching candidate
    pub fn classify(&self, text: &str) -> Classification {
        let mut candidates: Vec<Route> = Vec::new();
        for predicate in &self.predicates {
            if predicate.matches(text) && !candidates.contains(&predicate.route()) {
                candidates.push(predicate.route());
            }
        }

        let route = candidates.first().copied().unwrap_or(Route::Fallback);
        let classification = Classification { route, candidates };

        if classification.is_ambiguous() {
            warn!(
                kind = "ClassificationAmbiguous",
                chosen = %classification.route,
                candidates = ?classification.candidates,
                "Query matched several routes, first match wins"
            );
        }
        info!(route = %route, "Router: directing to {} handler", route);

        classification
    }

    /// Route a query
    pub fn route(&self, text: &str) -> Route {
        self.classify(text).route
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(vec![
            Box::new(ArithmeticPredicate::default()),
            Box::new(SummaryPredicate::default()),
        ])
    }
}
