//! Trajectory — the ordered record of one agent run.
//!
//! Each run owns exactly one [`Trajectory`]: thoughts, actions, and
//! observations (plus executions and reflections for the refinement loop),
//! appended in order and re-rendered into the prompt each iteration.
//! It also carries the iteration accounting that bounds the run.
//!
//! A trajectory is never shared between runs: the loop clears it at the
//! start of each top-level invocation, which is what makes concurrent
//! sessions safe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of trajectory step.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StepKind {
    /// The model's reasoning text (informational, not control-affecting)
    Thought,
    /// A requested tool invocation
    Action,
    /// The textual result of an invocation, fed back to the model
    Observation,
    /// A produced artifact (draft or refinement) in the reflection loop
    Execution,
    /// A critique of the latest execution
    Reflection,
}

/// A single entry in the trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub kind: StepKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The per-run loop state: ordered steps plus iteration accounting.
///
/// Invariant: `iterations <= max_iterations` whenever [`tick`](Trajectory::tick)
/// is used as the loop guard — the run must terminate once the bound is hit,
/// regardless of what the model keeps producing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    /// Ordered steps, append-only within a run.
    pub steps: Vec<Step>,

    /// Iterations consumed so far.
    pub iterations: usize,

    /// The hard cap on iterations.
    pub max_iterations: usize,
}

impl Trajectory {
    /// Create an empty trajectory with the given iteration bound.
    pub fn new(max_iterations: usize) -> Self {
        Self {
            steps: Vec::new(),
            iterations: 0,
            max_iterations,
        }
    }

    pub fn push_thought(&mut self, content: &str) {
        self.push(StepKind::Thought, content);
    }

    pub fn push_action(&mut self, content: &str) {
        self.push(StepKind::Action, content);
    }

    pub fn push_observation(&mut self, content: &str) {
        self.push(StepKind::Observation, content);
    }

    pub fn push_execution(&mut self, content: &str) {
        self.push(StepKind::Execution, content);
    }

    pub fn push_reflection(&mut self, content: &str) {
        self.push(StepKind::Reflection, content);
    }

    fn push(&mut self, kind: StepKind, content: &str) {
        self.steps.push(Step {
            kind,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Consume one iteration. Returns `false` once the bound is exceeded.
    pub fn tick(&mut self) -> bool {
        if self.iterations >= self.max_iterations {
            return false;
        }
        self.iterations += 1;
        true
    }

    /// Render the history block re-fed into subsequent prompts:
    /// one `Label: content` line per step, in order.
    pub fn render(&self) -> String {
        self.steps
            .iter()
            .map(|s| {
                let label = match s.kind {
                    StepKind::Thought => "Thought",
                    StepKind::Action => "Action",
                    StepKind::Observation => "Observation",
                    StepKind::Execution => "Execution",
                    StepKind::Reflection => "Reflection",
                };
                format!("{}: {}", label, s.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The most recent `Execution` step, if any. Used by the reflection
    /// loop to pick the artifact to critique (and to return as final).
    pub fn last_execution(&self) -> Option<&str> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.kind == StepKind::Execution)
            .map(|s| s.content.as_str())
    }

    /// Count steps of a given kind.
    pub fn count(&self, kind: StepKind) -> usize {
        self.steps.iter().filter(|s| s.kind == kind).count()
    }

    /// Reset for a new run.
    pub fn clear(&mut self) {
        self.steps.clear();
        self.iterations = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}
