//! Tool invocation dispatch — the failure containment boundary.
//!
//! The dispatcher turns every possible invocation outcome into an
//! observation string: missing tool, handler failure, timeout, success.
//! Nothing propagates past it, which is what keeps one bad tool from
//! crashing the loop — the model simply reads the error text next
//! iteration and gets a chance to self-correct.

use reagent_core::tool::{ToolInput, ToolRegistry};
use std::time::Duration;
use tracing::{debug, warn};

/// Executes tool invocations against a registry with a per-call timeout.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Invoke `name` with `input`, normalizing the outcome to text.
    /// Total: never returns an error, never panics.
    pub async fn dispatch(&self, registry: &ToolRegistry, name: &str, input: ToolInput) -> String {
        let Some(tool) = registry.get(name) else {
            warn!(tool = %name, "invocation of unregistered tool");
            return format!("Error: no tool named '{name}' is registered.");
        };

        debug!(tool = %name, "dispatching invocation");
        match tokio::time::timeout(self.timeout, tool.invoke(input)).await {
            Ok(Ok(output)) => format!("{name} result: {output}"),
            Ok(Err(e)) => {
                warn!(tool = %name, error = %e, "tool invocation failed");
                format!("Error: tool '{name}' failed: {e}")
            }
            Err(_) => {
                warn!(tool = %name, timeout_secs = self.timeout.as_secs(), "tool invocation timed out");
                format!(
                    "Error: tool '{name}' timed out after {}s.",
                    self.timeout.as_secs()
                )
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reagent_core::error::ToolError;
    use reagent_core::tool::Tool;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register_fn("echo", "echoes", |input| Ok(input.display()));
        registry.register_fn("broken", "always fails", |_| {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "backend unreachable".into(),
            })
        });
        registry
    }

    #[tokio::test]
    async fn success_is_wrapped_with_tool_name() {
        let obs = Dispatcher::default()
            .dispatch(&registry(), "echo", ToolInput::Text("hello".into()))
            .await;
        assert_eq!(obs, "echo result: hello");
    }

    #[tokio::test]
    async fn missing_tool_yields_observation() {
        let obs = Dispatcher::default()
            .dispatch(&registry(), "nonexistent", ToolInput::Text("x".into()))
            .await;
        assert_eq!(obs, "Error: no tool named 'nonexistent' is registered.");
    }

    #[tokio::test]
    async fn handler_failure_yields_observation() {
        let obs = Dispatcher::default()
            .dispatch(&registry(), "broken", ToolInput::Text("x".into()))
            .await;
        assert!(obs.starts_with("Error: tool 'broken' failed:"));
        assert!(obs.contains("backend unreachable"));
    }

    struct SleepyTool;

    #[async_trait]
    impl Tool for SleepyTool {
        fn name(&self) -> &str {
            "sleepy"
        }
        fn description(&self) -> &str {
            "never returns"
        }
        async fn invoke(&self, _input: ToolInput) -> Result<String, ToolError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok("too late".into())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_tool_hits_the_timeout() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(SleepyTool));

        let obs = Dispatcher::new(Duration::from_secs(5))
            .dispatch(&registry, "sleepy", ToolInput::Text("x".into()))
            .await;
        assert_eq!(obs, "Error: tool 'sleepy' timed out after 5s.");
    }
}
