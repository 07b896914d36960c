//! Tool trait and registry — the abstraction over agent capabilities.
//!
//! A tool is a named external operation: text (or decoded key=value
//! parameters) in, text out. Tools are registered in the [`ToolRegistry`]
//! and looked up by name when the model requests an invocation.
//!
//! The registry is read-mostly: build it up front, then share it as
//! `Arc<ToolRegistry>` across concurrent runs. Mutation is not locked, so
//! register/unregister before sharing.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

/// The decoded input handed to a tool handler.
///
/// The argument decoding heuristic (see the parser) produces either the
/// raw argument text or a key=value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolInput {
    /// The raw argument text, unmodified.
    Text(String),
    /// Parsed `key=value` parameters.
    Params(HashMap<String, String>),
}

impl ToolInput {
    /// Look up a parameter by key. For `Text` input, any key returns the text.
    pub fn get(&self, key: &str) -> Option<&str> {
        match self {
            ToolInput::Text(s) => Some(s.as_str()),
            ToolInput::Params(map) => map.get(key).map(String::as_str),
        }
    }

    /// Render the input as a single display string.
    pub fn display(&self) -> String {
        match self {
            ToolInput::Text(s) => s.clone(),
            ToolInput::Params(map) => {
                let mut pairs: Vec<_> = map.iter().map(|(k, v)| format!("{k}={v}")).collect();
                pairs.sort();
                pairs.join(", ")
            }
        }
    }
}

impl From<&str> for ToolInput {
    fn from(s: &str) -> Self {
        ToolInput::Text(s.to_string())
    }
}

/// The core Tool trait.
///
/// Each capability (search, calculator, echo, ...) implements this trait
/// and is registered in the [`ToolRegistry`]. Handlers fail with
/// [`ToolError`]; the dispatcher converts failures into observation text,
/// so a broken tool never crashes a run.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g. "search", "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does, shown to the model.
    fn description(&self) -> &str;

    /// Invoke the tool with the decoded input.
    async fn invoke(&self, input: ToolInput) -> std::result::Result<String, ToolError>;
}

type FnHandler = Box<
    dyn Fn(ToolInput) -> Pin<Box<dyn Future<Output = std::result::Result<String, ToolError>> + Send>>
        + Send
        + Sync,
>;

/// Adapter that turns a plain closure into a [`Tool`].
///
/// Lets callers register capabilities without defining a struct:
///
/// ```
/// use reagent_core::tool::{FnTool, ToolRegistry};
/// let mut registry = ToolRegistry::new();
/// registry.register(Box::new(FnTool::new("echo", "Echoes the input", |input| {
///     Ok(input.display())
/// })));
/// ```
pub struct FnTool {
    name: String,
    description: String,
    handler: FnHandler,
}

impl FnTool {
    /// Wrap a synchronous closure as a tool.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ToolInput) -> std::result::Result<String, ToolError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Box::new(move |input| {
                let out = handler(input);
                Box::pin(async move { out })
            }),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, input: ToolInput) -> std::result::Result<String, ToolError> {
        (self.handler)(input).await
    }
}

/// A registry of available tools, keyed by name.
///
/// Iteration order for [`describe`](ToolRegistry::describe) is registration
/// order. Re-registering an existing name overwrites the tool in place
/// (keeping its position) and logs a diagnostic — it never fails.
pub struct ToolRegistry {
    entries: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Sentinel returned by [`describe`](ToolRegistry::describe) when no
    /// tools are registered. Prompt builders check for it to omit the
    /// tools section entirely.
    pub const NO_TOOLS: &str = "no tools available";

    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Register a tool. Replaces any existing tool with the same name,
    /// keeping its original position in the listing.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(existing) = self.entries.iter_mut().find(|t| t.name() == name) {
            warn!(tool = %name, "overwriting existing tool registration");
            *existing = tool;
        } else {
            debug!(tool = %name, "tool registered");
            self.entries.push(tool);
        }
    }

    /// Register a closure-backed tool. See [`FnTool`].
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) where
        F: Fn(ToolInput) -> std::result::Result<String, ToolError> + Send + Sync + 'static,
    {
        self.register(Box::new(FnTool::new(name, description, handler)));
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.entries
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Remove a tool by name. Returns `true` if it was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|t| t.name() != name);
        self.entries.len() != before
    }

    /// Render the tool listing shown to the model: one `- name: description`
    /// line per tool, in registration order. Returns [`Self::NO_TOOLS`] when
    /// the registry is empty.
    pub fn describe(&self) -> String {
        if self.entries.is_empty() {
            return Self::NO_TOOLS.to_string();
        }
        self.entries
            .iter()
            .map(|t| format!("- {}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_fn("echo", "Echoes back the input", |input| Ok(input.display()));
        registry
    }

    #[test]
    fn register_and_lookup() {
        let registry = echo_registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn unregister_then_lookup_is_absent() {
        let mut registry = echo_registry();
        assert!(registry.unregister("echo"));
        assert!(registry.get("echo").is_none());
        assert!(!registry.unregister("echo"));
    }

    #[test]
    fn describe_lists_in_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("beta", "second tool", |_| Ok(String::new()));
        registry.register_fn("alpha", "first tool", |_| Ok(String::new()));
        let listing = registry.describe();
        let beta_pos = listing.find("- beta: second tool").unwrap();
        let alpha_pos = listing.find("- alpha: first tool").unwrap();
        assert!(beta_pos < alpha_pos);
    }

    #[test]
    fn describe_empty_registry_returns_sentinel() {
        let registry = ToolRegistry::new();
        assert_eq!(registry.describe(), ToolRegistry::NO_TOOLS);
    }

    #[tokio::test]
    async fn duplicate_registration_overwrites_in_place() {
        let mut registry = ToolRegistry::new();
        registry.register_fn("echo", "old", |_| Ok("old".into()));
        registry.register_fn("other", "another tool", |_| Ok(String::new()));
        registry.register_fn("echo", "new", |_| Ok("new".into()));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["echo", "other"]); // position kept
        let out = registry
            .get("echo")
            .unwrap()
            .invoke(ToolInput::Text("x".into()))
            .await
            .unwrap();
        assert_eq!(out, "new");
    }

    #[tokio::test]
    async fn fn_tool_invocation() {
        let registry = echo_registry();
        let out = registry
            .get("echo")
            .unwrap()
            .invoke(ToolInput::Text("hello world".into()))
            .await
            .unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn tool_input_get() {
        let text = ToolInput::Text("raw".into());
        assert_eq!(text.get("anything"), Some("raw"));

        let mut map = HashMap::new();
        map.insert("query".to_string(), "rust".to_string());
        let params = ToolInput::Params(map);
        assert_eq!(params.get("query"), Some("rust"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn tool_input_display_is_deterministic() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), "2".to_string());
        map.insert("a".to_string(), "1".to_string());
        assert_eq!(ToolInput::Params(map).display(), "a=1, b=2");
    }
}
