//! Prompt templates for the agent loops.
//!
//! Templates are plain string constants with named placeholders filled by
//! the render helpers below. Keeping them in one module makes the wording
//! auditable in one place; the loops never assemble prompt prose inline.

use reagent_core::tool::ToolRegistry;

/// Single-action reasoning prompt. The model must answer with a
/// `Thought:` line followed by an `Action:` line on every turn.
const REACT_TEMPLATE: &str = "\
Answer the question by reasoning step by step and using tools when needed.
{tools_section}\
On each turn, respond with exactly two lines:
Thought: your reasoning about what to do next
Action: tool_name[argument] to invoke a tool, or Finish[answer] when you know the final answer

Question: {question}
{history}";

/// The tools portion of the single-action prompt. Omitted entirely when
/// the registry is empty so the model is never told about a listing that
/// does not exist.
const REACT_TOOLS_SECTION: &str = "\
You have access to the following tools:
{tools}

";

/// Observation pushed into the trace when a model turn matches neither
/// the `Action:` grammar nor `Finish[...]`.
pub const UNPARSED_OBSERVATION: &str =
    "Your response could not be parsed. Reply with a Thought: line followed by an Action: line, \
     using tool_name[argument] or Finish[answer].";

/// Default system prompt for the multi-call tool protocol.
pub const TOOL_CALL_BASE_PROMPT: &str = "You are a helpful assistant.";

/// Sentinel phrase a critique must contain for the reflection loop to
/// stop early. Matched case-insensitively.
pub const NO_IMPROVEMENT: &str = "no further improvement needed";

/// Build the full single-action prompt: instructions, tool listing,
/// the question, and the rendered trace so far.
pub fn react_prompt(registry: &ToolRegistry, question: &str, history: &str) -> String {
    let listing = registry.describe();
    let tools_section = if listing == ToolRegistry::NO_TOOLS {
        String::new()
    } else {
        REACT_TOOLS_SECTION.replace("{tools}", &listing)
    };

    let history = if history.is_empty() {
        String::new()
    } else {
        format!("\n{history}\n")
    };

    REACT_TEMPLATE
        .replace("{tools_section}", &tools_section)
        .replace("{question}", question)
        .replace("{history}", &history)
}

/// Build the system prompt for the multi-call protocol: the caller's
/// base prompt plus the inline tool-call format instructions. When the
/// registry is empty the base prompt is returned unchanged and the
/// protocol is never mentioned.
pub fn tool_call_system_prompt(base: &str, registry: &ToolRegistry) -> String {
    let listing = registry.describe();
    if listing == ToolRegistry::NO_TOOLS {
        return base.to_string();
    }
    format!(
        "{base}\n\n\
         You have access to the following tools:\n{listing}\n\n\
         To use a tool, include [TOOL_CALL:tool_name:parameters] anywhere in your response. \
         You may make several tool calls in one response. \
         Tool results will be provided to you in the next message. \
         When you have everything you need, answer directly without any tool calls."
    )
}

/// Prompt for the initial draft of a reflection run.
pub fn draft_prompt(task: &str) -> String {
    format!(
        "Complete the following task as well as you can.\n\nTask: {task}\n\n\
         Produce your best attempt."
    )
}

/// Prompt asking the model to critique its own attempt. The critique must
/// use the exact sentinel phrase when it finds nothing left to improve.
pub fn critique_prompt(task: &str, attempt: &str) -> String {
    format!(
        "Review the following attempt at a task and point out concrete problems \
         and how to fix them.\n\nTask: {task}\n\nAttempt:\n{attempt}\n\n\
         If the attempt is already satisfactory, reply with exactly: {NO_IMPROVEMENT}"
    )
}

/// Prompt asking the model to produce an improved attempt from a critique.
pub fn refine_prompt(task: &str, attempt: &str, critique: &str) -> String {
    format!(
        "Improve the attempt below using the critique.\n\nTask: {task}\n\n\
         Previous attempt:\n{attempt}\n\nCritique:\n{critique}\n\n\
         Produce the improved version only, with no commentary."
    )
}

/// Final-answer nudge sent after the iteration bound is reached in the
/// multi-call loop.
pub const FORCED_FINAL_PROMPT: &str =
    "You have used all available tool invocations. Give your complete final answer now, \
     without any tool calls.";
