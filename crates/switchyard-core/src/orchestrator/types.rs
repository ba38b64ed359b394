use crate::agents::{AgentResult, TaskInput};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Entry points selected by `AgentTask::task_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorMode {
    /// Classify a free-text message and route it
    Chat,
    /// Run an explicit list of agent calls, collecting every result
    ComplexTask,
    /// Call one named agent directly
    Delegate,
    /// Run a named workflow template
    Workflow,
}

impl OrchestratorMode {
    /// Every mode, in the order they are listed to callers
    pub const ALL: [OrchestratorMode; 4] = [
        OrchestratorMode::Chat,
        OrchestratorMode::ComplexTask,
        OrchestratorMode::Delegate,
        OrchestratorMode::Workflow,
    ];

    /// Task type string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::ComplexTask => "complex_task",
            Self::Delegate => "delegate",
            Self::Workflow => "workflow",
        }
    }

    /// Parse a task type; exact match
    #[must_use]
    pub fn from_task_type(task_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == task_type)
    }

    pub(crate) fn valid_types() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for OrchestratorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatInput {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComplexTaskInput {
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StepSpec {
    pub agent: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub input: TaskInput,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DelegateInput {
    pub agent_name: String,
    pub task_type: String,
    #[serde(default)]
    pub task_input: TaskInput,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowInput {
    pub template: String,
    #[serde(default)]
    pub context: TaskInput,
}

/// One entry of `complex_task` output
#[derive(Debug, Serialize)]
pub(crate) struct StepOutcome {
    pub agent: String,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(flatten)]
    pub result: AgentResult,
}

/// Decode a mode's input payload
pub(crate) fn parse_input<T: DeserializeOwned>(
    mode: OrchestratorMode,
    input: &TaskInput,
) -> Result<T, String> {
    serde_json::from_value(Value::Object(input.clone()))
        .map_err(|e| format!("Invalid {} input: {}", mode, e))
}
