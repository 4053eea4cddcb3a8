//! Plan response types received from the planner.
//!
//! A response carries an ordered list of steps. An absent or empty `plan` is
//! a valid "no task" answer (the planner chose to chat or think), not an
//! error; only malformed JSON is a protocol failure.

use serde::{Deserialize, Serialize};

use crate::args::ActionArgs;

/// One discrete action in a plan. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    /// Advisory reasoning shown to the operator; never used for control flow.
    #[serde(rename = "thought_trace", default)]
    pub rationale: String,
    /// Action name used to look up the handler (`move_to`, `pickup`, ...).
    pub function: String,
    /// Weakly-typed handler arguments.
    #[serde(default)]
    pub args: ActionArgs,
    /// Planner hint that this is the final step.
    #[serde(rename = "plan_complete", default)]
    pub is_last_step: bool,
}

impl ActionStep {
    /// Create a step with no rationale.
    pub fn new(function: &str, args: ActionArgs) -> Self {
        Self {
            rationale: String::new(),
            function: function.to_owned(),
            args,
            is_last_step: false,
        }
    }
}

/// The raw message the planner sends back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    /// Echoed session identifier.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Human-readable task label.
    #[serde(default, alias = "current_task")]
    pub task: Option<String>,
    /// Ordered action steps.
    #[serde(default)]
    pub plan: Option<Vec<ActionStep>>,
    /// Server-side error report (e.g. a rejected perception schema).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanResponse {
    /// Parse a text frame.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the frame is not a valid response object.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Extract an executable plan. Returns `None` for "no task" responses.
    pub fn into_plan(self) -> Option<Plan> {
        let steps = self.plan.filter(|steps| !steps.is_empty())?;
        Some(Plan {
            task: self.task.unwrap_or_default(),
            steps,
        })
    }
}

/// An ordered, non-empty sequence of steps for one perception cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Task label.
    pub task: String,
    /// Steps, consumed strictly in order.
    pub steps: Vec<ActionStep>,
}

impl Plan {
    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
