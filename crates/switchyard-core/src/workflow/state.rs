//! Workflow run state

use super::definition::WorkflowDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Context key every successful step writes its output to
pub const LAST_OUTPUT_KEY: &str = "lastOutput";

/// Unique identifier of a workflow run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkflowId(Uuid);

impl WorkflowId {
    /// Allocate a fresh ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WorkflowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkflowId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Run-level status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Created, not started
    Pending,
    /// Steps are executing
    Running,
    /// Every step succeeded or was skipped
    Succeeded,
    /// A step failed and the run stopped
    Failed,
}

impl RunStatus {
    /// Whether the run is finished
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Lowercase name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Step-level status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// Not attempted
    Pending,
    /// Agent call in flight
    Running,
    /// Agent call succeeded
    Succeeded,
    /// Agent call or input resolution failed
    Failed,
    /// `when` condition was not met
    Skipped,
}

/// Status record of one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    /// Step name
    pub name: String,
    /// Agent the step calls
    pub agent: String,
    /// Current status
    pub status: StepStatus,
    /// Output of a successful call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of times the step was started
    pub attempts: u32,
    /// Last start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Last finish time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepState {
    fn pending(name: &str, agent: &str) -> Self {
        Self {
            name: name.to_string(),
            agent: agent.to_string(),
            status: StepStatus::Pending,
            output: None,
            error: None,
            attempts: 0,
            started_at: None,
            finished_at: None,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.status = StepStatus::Pending;
        self.output = None;
        self.error = None;
        self.started_at = None;
        self.finished_at = None;
    }
}

/// Inspectable record of a workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Run ID
    pub workflow_id: WorkflowId,
    /// Definition name
    pub name: String,
    /// Run status
    pub status: RunStatus,
    /// One entry per step, in definition order
    pub steps: Vec<StepState>,
    /// Accumulated context
    pub context: Map<String, Value>,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// First start time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Finish time of the latest attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl WorkflowState {
    /// Materialize a pending run
    pub(crate) fn new(
        workflow_id: WorkflowId,
        definition: &WorkflowDefinition,
        context: Map<String, Value>,
    ) -> Self {
        Self {
            workflow_id,
            name: definition.name.clone(),
            status: RunStatus::Pending,
            steps: definition
                .steps
                .iter()
                .map(|s| StepState::pending(&s.name, &s.agent))
                .collect(),
            context,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Output of the last successful step
    #[must_use]
    pub fn final_output(&self) -> Option<&Value> {
        self.context.get(LAST_OUTPUT_KEY)
    }

    /// Look up a step by name
    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepState> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Step statuses in order
    #[must_use]
    pub fn step_statuses(&self) -> Vec<StepStatus> {
        self.steps.iter().map(|s| s.status).collect()
    }
}
