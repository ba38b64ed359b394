//! Orchestrator
//!
//! Single entry point that turns an `AgentTask` into an `AgentResult`:
//!
//! | type           | input                                 |
//! |----------------|---------------------------------------|
//! | `chat`         | `{message}`                           |
//! | `complex_task` | `{steps: [{agent, type, input}]}`     |
//! | `delegate`     | `{agentName, taskType, taskInput}`    |
//! | `workflow`     | `{template, context?}`                |
//!
//! Nothing escapes `execute`: unknown modes, bad input, agent errors and
//! panics all come back as failed results.

mod execution;
mod routing;
mod types;

pub use routing::build_task_input;
pub use types::OrchestratorMode;

use crate::agents::{AgentRegistry, AgentResult, AgentTask};
use crate::intent::IntentClassifier;
use crate::workflow::{WorkflowEngine, WorkflowTemplates};
use futures::FutureExt;
use serde_json::json;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

/// Routes tasks to agents, workflow templates or the classifier
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    classifier: IntentClassifier,
    engine: Arc<WorkflowEngine>,
    templates: WorkflowTemplates,
}

impl Orchestrator {
    /// Create an orchestrator over shared components
    pub fn new(
        registry: Arc<AgentRegistry>,
        classifier: IntentClassifier,
        engine: Arc<WorkflowEngine>,
        templates: WorkflowTemplates,
    ) -> Self {
        Self {
            registry,
            classifier,
            engine,
            templates,
        }
    }

    /// Agent registry
    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Intent classifier
    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    /// Workflow engine
    pub fn engine(&self) -> &Arc<WorkflowEngine> {
        &self.engine
    }

    /// Workflow templates
    pub fn templates(&self) -> &WorkflowTemplates {
        &self.templates
    }

    /// Execute a task; never fails
    ///
    /// The result always carries `metadata.mode` and `metadata.durationMs`.
    pub async fn execute(&self, task: AgentTask) -> AgentResult {
        let start = Instant::now();
        let mode = OrchestratorMode::from_task_type(&task.task_type);
        debug!(task_id = %task.id, task_type = %task.task_type, "Orchestrating task");

        let result = match mode {
            Some(mode) => AssertUnwindSafe(self.dispatch(mode, &task))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    error!(task_id = %task.id, %mode, "Orchestrator panicked");
                    AgentResult::fail(format!("Internal error while handling {} task", mode))
                }),
            None => AgentResult::fail(format!(
                "Unknown task type '{}'. Valid types: {}",
                task.task_type,
                OrchestratorMode::valid_types()
            )),
        };

        let mode_name = mode.map_or(task.task_type.as_str(), |m| m.as_str());
        result
            .with_metadata("mode", json!(mode_name))
            .with_metadata("durationMs", json!(start.elapsed().as_millis() as u64))
    }

    async fn dispatch(&self, mode: OrchestratorMode, task: &AgentTask) -> AgentResult {
        let input = &task.input;
        match mode {
            OrchestratorMode::Chat => match types::parse_input(mode, input) {
                Ok(input) => self.chat(input).await,
                Err(e) => AgentResult::fail(e),
            },
            OrchestratorMode::ComplexTask => match types::parse_input(mode, input) {
                Ok(input) => self.complex_task(input).await,
                Err(e) => AgentResult::fail(e),
            },
            OrchestratorMode::Delegate => match types::parse_input(mode, input) {
                Ok(input) => self.delegate(input).await,
                Err(e) => AgentResult::fail(e),
            },
            OrchestratorMode::Workflow => match types::parse_input(mode, input) {
                Ok(input) => self.workflow(input).await,
                Err(e) => AgentResult::fail(e),
            },
        }
    }
}

#[cfg(test)]
mod tests;
