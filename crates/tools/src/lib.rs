//! Built-in tool implementations for reagent.
//!
//! Tools give the agent the ability to act outside the conversation:
//! search the web, do arithmetic, and (for tests and demos) echo input
//! back. Anything implementing `reagent_core::Tool` can be registered
//! alongside these.

pub mod calculator;
pub mod echo;
pub mod search;

pub use calculator::CalculatorTool;
pub use echo::EchoTool;
pub use search::SearchTool;

use reagent_core::tool::ToolRegistry;

/// Create a registry with all built-in tools.
///
/// `search_api_key` is the SerpAPI key; when `None` the search tool falls
/// back to the `SERPAPI_API_KEY` environment variable at invocation time.
pub fn default_registry(search_api_key: Option<String>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(SearchTool::new(search_api_key)));
    registry.register(Box::new(CalculatorTool));
    registry.register(Box::new(EchoTool));
    registry
}
