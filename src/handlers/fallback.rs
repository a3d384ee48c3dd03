//! General conversation handler

use super::TaskHandler;
use crate::query::Query;
use crate::routing::Route;

#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackHandler;

impl TaskHandler for FallbackHandler {
    fn route(&self) -> Route {
        Route::Fallback
    }

    fn build_prompt(&self, query: &Query) -> String {
        format!(
            "You are a helpful assistant. Please respond to the following query.\n\
             \n\
             Query: {}\n\
             \n\
             Provide a helpful and informative response.",
            query.text().trim()
        )
    }
}
