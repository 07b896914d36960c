//! Echo tool — returns its input unchanged.
//!
//! Useful for demos and loop-level tests that need a deterministic tool.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolInput};

pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Returns the given text unchanged. Useful for testing the tool protocol."
    }

    async fn invoke(&self, input: ToolInput) -> Result<String, ToolError> {
        Ok(input.display())
    }
}
