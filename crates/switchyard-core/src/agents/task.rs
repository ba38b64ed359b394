//! Task and result envelopes shared by every agent

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::fmt;

/// Agent task input payload
pub type TaskInput = Map<String, Value>;

/// Registry key for an agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Create an agent ID
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for AgentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

fn generate_task_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A unit of work handed to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTask {
    /// Caller-supplied or generated task ID
    #[serde(default = "generate_task_id")]
    pub id: String,
    /// Selects behavior inside the target agent
    #[serde(rename = "type")]
    pub task_type: String,
    /// Task-type-specific payload
    #[serde(default)]
    pub input: TaskInput,
}

impl AgentTask {
    /// Create a task with a generated ID
    pub fn new(task_type: impl Into<String>, input: TaskInput) -> Self {
        Self {
            id: generate_task_id(),
            task_type: task_type.into(),
            input,
        }
    }

    /// Create a task with an explicit ID
    pub fn with_id(id: impl Into<String>, task_type: impl Into<String>, input: TaskInput) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            input,
        }
    }

    /// Create a task from a JSON value; non-object values become an empty input
    pub fn from_value(task_type: impl Into<String>, input: Value) -> Self {
        let input = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(task_type, input)
    }

    /// Read a string field from the input
    #[must_use]
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.input.get(key).and_then(Value::as_str)
    }
}

/// Outcome of an agent call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Whether the call succeeded
    pub success: bool,
    /// Output payload (meaningful when `success`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    /// Error message (meaningful when not `success`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Advisory metadata: model, token counts, cost, classification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl AgentResult {
    /// Successful result
    pub fn ok(output: Value) -> Self {
        Self {
            success: true,
            output: Some(output),
            error: None,
            metadata: None,
        }
    }

    /// Failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
            metadata: None,
        }
    }

    /// Attach a metadata entry
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// Look up a metadata entry
    #[must_use]
    pub fn metadata_value(&self, key: &str) -> Option<&Value> {
        self.metadata.as_ref().and_then(|m| m.get(key))
    }
}
