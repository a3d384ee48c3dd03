//! Query routing
//!
//! A query is classified into one of three routes by an ordered list of
//! predicates:
//!
//! - [`route`]: the [`Route`] labels and their presentation metadata
//! - [`predicate`]: the [`RoutePredicate`] trait and the keyword and
//!   arithmetic matchers
//! - [`router`]: the first-match-wins [`Router`]

pub mod predicate;
pub mod route;
pub mod router;

pub use predicate::{ArithmeticPredicate, KeywordSet, RoutePredicate, SummaryPredicate};
pub use route::Route;
pub use router::{Classification, Router};
