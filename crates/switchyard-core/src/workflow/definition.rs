//! Workflow definitions and input bindings

use super::engine::WorkflowError;
use super::state::LAST_OUTPUT_KEY;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)*)\s*\}\}")
        .expect("PLACEHOLDER is a compile-time constant")
});

/// How a step input field gets its value
///
/// In TOML, `{ from = "research.content" }` reads the context and
/// `{ template = "About {{topic}}" }` interpolates it. Those forms are only
/// recognized as a table with that single string key; any other value is
/// passed through unchanged. `{ literal = ... }` passes its value through
/// as-is, for fixed tables that would otherwise read as a binding.
#[derive(Debug, Clone, PartialEq)]
pub enum InputBinding {
    /// Dot path into the context; the first segment is the context key
    Context {
        /// Path such as `draft.content`
        from: String,
    },
    /// String with `{{path}}` placeholders
    Template {
        /// Template text
        template: String,
    },
    /// Fixed value
    Literal(Value),
}

impl InputBinding {
    /// Read a context path
    pub fn context(path: impl Into<String>) -> Self {
        Self::Context { from: path.into() }
    }

    /// Interpolate a template
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template {
            template: template.into(),
        }
    }

    /// Fixed value
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Context keys this binding reads
    fn root_keys(&self) -> Vec<&str> {
        match self {
            Self::Context { from } => vec![root_key(from)],
            Self::Template { template } => PLACEHOLDER
                .captures_iter(template)
                .filter_map(|c| c.get(1))
                .map(|m| root_key(m.as_str()))
                .collect(),
            Self::Literal(_) => Vec::new(),
        }
    }

    /// Resolve against the current context
    fn resolve(&self, context: &Map<String, Value>) -> Result<Value, String> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Context { from } => lookup(context, from)
                .cloned()
                .ok_or_else(|| format!("context path '{}' is not set", from)),
            Self::Template { template } => {
                let mut missing = None;
                let rendered = PLACEHOLDER.replace_all(template, |caps: &regex::Captures<'_>| {
                    let path = caps.get(1).map_or("", |m| m.as_str());
                    match lookup(context, path) {
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                        None => {
                            missing.get_or_insert_with(|| path.to_string());
                            String::new()
                        }
                    }
                });
                match missing {
                    Some(path) => Err(format!("context path '{}' is not set", path)),
                    None => Ok(Value::String(rendered.into_owned())),
                }
            }
        }
    }
}

impl From<Value> for InputBinding {
    fn from(value: Value) -> Self {
        if let Value::Object(map) = &value {
            if map.len() == 1 {
                match map.iter().next() {
                    Some((key, Value::String(path))) if key == "from" => {
                        return Self::context(path.as_str());
                    }
                    Some((key, Value::String(text))) if key == "template" => {
                        return Self::template(text.as_str());
                    }
                    Some((key, inner)) if key == "literal" => {
                        return Self::Literal(inner.clone());
                    }
                    _ => {}
                }
            }
        }
        Self::Literal(value)
    }
}

impl<'de> Deserialize<'de> for InputBinding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for InputBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (key, value) = match self {
            Self::Context { from } => ("from", Value::String(from.clone())),
            Self::Template { template } => ("template", Value::String(template.clone())),
            Self::Literal(value) if Self::from(value.clone()) == *self => {
                return value.serialize(serializer);
            }
            Self::Literal(value) => ("literal", value.clone()),
        };
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(key, &value)?;
        map.end()
    }
}

fn root_key(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Follow a dot path through nested objects
pub fn lookup<'a>(context: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = context.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Truthiness used by `when` conditions
pub(crate) fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

/// One step of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    /// Unique step name within the workflow
    pub name: String,
    /// Agent to call
    pub agent: String,
    /// Task type passed to the agent
    pub task_type: String,
    /// Input fields and where their values come from
    #[serde(default)]
    pub input: BTreeMap<String, InputBinding>,
    /// Context key the step output is stored under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    /// Context path that must be truthy for the step to run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<String>,
}

impl StepDefinition {
    /// Create a step with no inputs
    pub fn new(
        name: impl Into<String>,
        agent: impl Into<String>,
        task_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            agent: agent.into(),
            task_type: task_type.into(),
            input: BTreeMap::new(),
            output_key: None,
            when: None,
        }
    }

    /// Add an input binding
    #[must_use]
    pub fn bind(mut self, field: impl Into<String>, binding: InputBinding) -> Self {
        self.input.insert(field.into(), binding);
        self
    }

    /// Store the output under a context key
    #[must_use]
    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = Some(key.into());
        self
    }

    /// Run only when a context path is truthy
    #[must_use]
    pub fn with_when(mut self, path: impl Into<String>) -> Self {
        self.when = Some(path.into());
        self
    }

    /// Build the task input from the context
    pub(crate) fn resolve_input(
        &self,
        context: &Map<String, Value>,
    ) -> Result<Map<String, Value>, String> {
        self.input
            .iter()
            .map(|(field, binding)| Ok((field.clone(), binding.resolve(context)?)))
            .collect()
    }
}

/// Declarative, ordered plan of agent calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Template name
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl WorkflowDefinition {
    /// Create an empty workflow
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: StepDefinition) -> Self {
        self.steps.push(step);
        self
    }

    /// Check the definition against the keys the initial context provides
    ///
    /// Walks the steps in order and tracks the keys guaranteed to exist when
    /// each step starts. A conditional step may be skipped, so its outputs are
    /// not guaranteed for later steps.
    ///
    /// # Errors
    ///
    /// Returns the first structural or binding problem found.
    pub fn validate(&self, initial_keys: &[&str]) -> Result<(), WorkflowError> {
        let mut available: HashSet<&str> = initial_keys.iter().copied().collect();
        let mut seen = HashSet::new();

        for step in &self.steps {
            if step.name.trim().is_empty() {
                return Err(self.invalid("step with empty name"));
            }
            if !seen.insert(step.name.as_str()) {
                return Err(self.invalid(format!("duplicate step name '{}'", step.name)));
            }
            if step.agent.trim().is_empty() {
                return Err(self.invalid(format!("step '{}' has no agent", step.name)));
            }
            if step.task_type.trim().is_empty() {
                return Err(self.invalid(format!("step '{}' has no task type", step.name)));
            }
            if step.output_key.as_deref() == Some(LAST_OUTPUT_KEY) {
                return Err(self.invalid(format!(
                    "step '{}' may not use reserved output key '{}'",
                    step.name, LAST_OUTPUT_KEY
                )));
            }

            for binding in step.input.values() {
                for key in binding.root_keys() {
                    if !available.contains(key) {
                        return Err(WorkflowError::Binding {
                            step: step.name.clone(),
                            key: key.to_string(),
                        });
                    }
                }
            }

            if step.when.is_none() {
                available.insert(LAST_OUTPUT_KEY);
                if let Some(key) = step.output_key.as_deref() {
                    available.insert(key);
                }
            }
        }

        Ok(())
    }

    fn invalid(&self, reason: impl Into<String>) -> WorkflowError {
        WorkflowError::InvalidDefinition {
            workflow: self.name.clone(),
            reason: reason.into(),
        }
    }
}
