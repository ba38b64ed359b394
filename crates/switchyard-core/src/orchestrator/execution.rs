use super::routing::build_task_input;
use super::types::{ChatInput, ComplexTaskInput, DelegateInput, StepOutcome, WorkflowInput};
use super::Orchestrator;
use crate::agents::{AgentResult, AgentTask, TaskInput};
use crate::error::Error;
use crate::intent::capability_message;
use crate::workflow::{RunStatus, WorkflowState};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

impl Orchestrator {
    /// Classify a message and route it to the bound agent
    pub(super) async fn chat(&self, input: ChatInput) -> AgentResult {
        let classification = self.classifier.classify(&input.message).await;
        let classification_value = serde_json::to_value(&classification).unwrap_or(Value::Null);

        let target = classification
            .binding()
            .and_then(|(agent, task_type)| self.registry.get(agent).map(|a| (a, task_type)));

        let Some((agent, task_type)) = target else {
            debug!(
                intent = %classification.intent,
                agent = ?classification.agent,
                "No routable agent, answering with capabilities"
            );
            return AgentResult::ok(json!({
                "response": capability_message(),
                "classification": classification_value.clone(),
            }))
            .with_metadata("classification", classification_value);
        };

        info!(
            intent = %classification.intent,
            agent = %agent.name(),
            source = ?classification.source,
            "Routing chat message"
        );

        let task = AgentTask::new(
            task_type,
            build_task_input(classification.intent, &input.message),
        );
        agent
            .invoke(&task)
            .await
            .with_metadata("classification", classification_value)
    }

    /// Run each step in order, collecting every outcome
    pub(super) async fn complex_task(&self, input: ComplexTaskInput) -> AgentResult {
        let total = input.steps.len();
        let mut outcomes = Vec::with_capacity(total);
        let mut succeeded = 0usize;

        for (index, step) in input.steps.into_iter().enumerate() {
            let result = self.call_agent(&step.agent, &step.task_type, step.input).await;
            if result.success {
                succeeded += 1;
            } else {
                warn!(
                    step = index,
                    agent = %step.agent,
                    error = ?result.error,
                    "Complex task step failed"
                );
            }
            outcomes.push(StepOutcome {
                agent: step.agent,
                task_type: step.task_type,
                result,
            });
        }

        info!(total, succeeded, failed = total - succeeded, "Complex task finished");
        AgentResult::ok(json!({
            "results": outcomes,
            "succeeded": succeeded,
            "failed": total - succeeded,
        }))
    }

    /// Call one agent directly
    pub(super) async fn delegate(&self, input: DelegateInput) -> AgentResult {
        debug!(agent = %input.agent_name, task_type = %input.task_type, "Delegating task");
        self.call_agent(&input.agent_name, &input.task_type, input.task_input)
            .await
    }

    /// Resolve a template, then create and run it
    pub(super) async fn workflow(&self, input: WorkflowInput) -> AgentResult {
        let definition = match self.templates.resolve(&input.template) {
            Ok(definition) => definition.clone(),
            Err(e) => {
                warn!(template = %input.template, "Unknown workflow template");
                return AgentResult::fail(e.to_string());
            }
        };
        info!(template = %definition.name, "Starting workflow template");

        let id = match self.engine.create(definition, input.context).await {
            Ok(id) => id,
            Err(e) => return AgentResult::fail(e.to_string()),
        };
        let state = match self.engine.run(id).await {
            Ok(state) => state,
            Err(e) => return AgentResult::fail(e.to_string()),
        };

        let output = workflow_output(&state);
        if state.status == RunStatus::Succeeded {
            AgentResult::ok(output)
        } else {
            AgentResult {
                success: false,
                output: Some(output),
                error: state.error.clone(),
                metadata: None,
            }
        }
    }

    async fn call_agent(&self, name: &str, task_type: &str, input: TaskInput) -> AgentResult {
        match self.registry.get(name) {
            Some(agent) => agent.invoke(&AgentTask::new(task_type, input)).await,
            None => {
                warn!(agent = %name, "Agent not registered");
                AgentResult::fail(Error::AgentNotFound(name.to_string()).to_string())
            }
        }
    }
}

fn workflow_output(state: &WorkflowState) -> Value {
    let steps: Vec<Value> = state
        .steps
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "status": s.status,
                "output": s.output,
            })
        })
        .collect();

    json!({
        "workflowId": state.workflow_id,
        "status": state.status,
        "steps": steps,
        "finalOutput": state.final_output(),
        "error": state.error,
    })
}
