//! Web search tool backed by SerpAPI.
//!
//! Sends the query to the Google engine and distills the response into a
//! short textual answer for the model, preferring direct answers over raw
//! result listings: answer box first, then the knowledge graph
//! description, then the top organic snippets.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolInput};
use std::time::Duration;
use tracing::debug;

const SERPAPI_URL: &str = "https://serpapi.com/search.json";

pub struct SearchTool {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl SearchTool {
    /// Create a search tool. When `api_key` is `None`, `SERPAPI_API_KEY`
    /// is read from the environment at invocation time.
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .expect("failed to build HTTP client");
        Self { api_key, client }
    }

    fn resolve_key(&self) -> Result<String, ToolError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("SERPAPI_API_KEY").ok())
            .ok_or_else(|| ToolError::ExecutionFailed {
                tool_name: "search".into(),
                reason: "no SerpAPI key configured (set SERPAPI_API_KEY)".into(),
            })
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "A web search engine. Use it for questions about current events, facts, or anything outside your knowledge."
    }

    async fn invoke(&self, input: ToolInput) -> Result<String, ToolError> {
        let query = input
            .get("query")
            .ok_or_else(|| ToolError::InvalidInput("missing 'query'".into()))?
            .to_string();
        let api_key = self.resolve_key()?;

        debug!(query = %query, "search request");

        let response = self
            .client
            .get(SERPAPI_URL)
            .query(&[
                ("engine", "google"),
                ("q", query.as_str()),
                ("api_key", api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "search".into(),
                reason: e.to_string(),
            })?;

        let results: serde_json::Value =
            response.json().await.map_err(|e| ToolError::ExecutionFailed {
                tool_name: "search".into(),
                reason: format!("malformed search response: {e}"),
            })?;

        Ok(distill(&results, &query))
    }
}

/// Distill a SerpAPI response into a short textual answer.
fn distill(results: &serde_json::Value, query: &str) -> String {
    if let Some(answers) = results["answer_box_list"].as_array() {
        let lines: Vec<&str> = answers.iter().filter_map(|a| a.as_str()).collect();
        if !lines.is_empty() {
            return lines.join("\n");
        }
    }

    if let Some(answer) = results["answer_box"]["answer"].as_str() {
        return answer.to_string();
    }

    if let Some(description) = results["knowledge_graph"]["description"].as_str() {
        return description.to_string();
    }

    if let Some(organic) = results["organic_results"].as_array()
        && !organic.is_empty()
    {
        let snippets: Vec<String> = organic
            .iter()
            .take(3)
            .enumerate()
            .map(|(i, res)| {
                format!(
                    "[{}] {}\n{}",
                    i + 1,
                    res["title"].as_str().unwrap_or(""),
                    res["snippet"].as_str().unwrap_or("")
                )
            })
            .collect();
        return snippets.join("\n\n");
    }

    format!("No results found for '{query}'.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn distill_prefers_answer_box_list() {
        let results = json!({
            "answer_box_list": ["42", "forty-two"],
            "answer_box": {"answer": "ignored"}
        });
        assert_eq!(distill(&results, "q"), "42\nforty-two");
    }

    #[test]
    fn distill_answer_box() {
        let results = json!({"answer_box": {"answer": "100°C"}});
        assert_eq!(distill(&results, "q"), "100°C");
    }

    #[test]
    fn distill_knowledge_graph() {
        let results = json!({"knowledge_graph": {"description": "A systems language."}});
        assert_eq!(distill(&results, "q"), "A systems language.");
    }

    #[test]
    fn distill_organic_snippets_capped_at_three() {
        let results = json!({"organic_results": [
            {"title": "One", "snippet": "first"},
            {"title": "Two", "snippet": "second"},
            {"title": "Three", "snippet": "third"},
            {"title": "Four", "snippet": "fourth"}
        ]});
        let out = distill(&results, "q");
        assert!(out.starts_with("[1] One\nfirst"));
        assert!(out.contains("[3] Three"));
        assert!(!out.contains("Four"));
    }

    #[test]
    fn distill_no_results() {
        let results = json!({});
        assert_eq!(distill(&results, "rust"), "No results found for 'rust'.");
    }

    #[tokio::test]
    async fn missing_query_is_invalid_input() {
        let tool = SearchTool::new(Some("key".into()));
        let input = ToolInput::Params(std::collections::HashMap::new());
        let err = tool.invoke(input).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
