//! Step-by-step arithmetic handler

use super::TaskHandler;
use crate::query::Query;
use crate::routing::Route;

/// Asks the model to show its working before the final answer
#[derive(Debug, Clone, Copy, Default)]
pub struct MathHandler;

impl TaskHandler for MathHandler {
    fn route(&self) -> Route {
        Route::Math
    }

    fn build_prompt(&self, query: &Query) -> String {
        format!(
            "You are a mathematical problem solver. Solve the following problem step by step.\n\
             \n\
             Problem: {}\n\
             \n\
             Please provide:\n\
             1. The calculation steps\n\
             2. The final answer\n\
             \n\
             Be precise and show your work clearly.",
            query.text().trim()
        )
    }
}
