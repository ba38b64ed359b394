//! Workflow Engine
//!
//! Creates runs from definitions and drives them step by step. Each run is
//! owned by exactly one `run`/`resume` call at a time; snapshots stay
//! readable through `get` while a step is in flight.

use super::definition::{is_truthy, lookup, WorkflowDefinition};
use super::state::{RunStatus, StepStatus, WorkflowId, WorkflowState, LAST_OUTPUT_KEY};
use crate::agents::{AgentRegistry, AgentResult, AgentTask};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Workflow engine errors
///
/// Step failures are not errors; they are recorded in the run state.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No run with this ID
    #[error("workflow run {0} not found")]
    NotFound(WorkflowId),

    /// Another call currently owns the run
    #[error("workflow run {0} is already running")]
    AlreadyRunning(WorkflowId),

    /// The run is not in the state the operation requires
    #[error("workflow run {id} is {status}, expected {expected}")]
    InvalidState {
        /// Run ID
        id: WorkflowId,
        /// Current status
        status: RunStatus,
        /// Status the operation requires
        expected: RunStatus,
    },

    /// A step reads a context key that is not available when it starts
    #[error("step '{step}' reads context key '{key}' which is not available at that point")]
    Binding {
        /// Step name
        step: String,
        /// Missing context key
        key: String,
    },

    /// Structural problem in a definition
    #[error("invalid workflow '{workflow}': {reason}")]
    InvalidDefinition {
        /// Definition name
        workflow: String,
        /// What is wrong
        reason: String,
    },

    /// No template with this name
    #[error("Unknown workflow template '{name}'. Available templates: {available}")]
    UnknownTemplate {
        /// Requested name
        name: String,
        /// Comma-separated known names
        available: String,
    },

    /// Template files could not be read
    #[error("failed to load workflow templates: {0}")]
    Load(String),
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Terminal runs kept for inspection; 0 keeps everything
    #[serde(default = "default_max_retained_runs")]
    pub max_retained_runs: usize,
}

fn default_max_retained_runs() -> usize {
    256
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_retained_runs: default_max_retained_runs(),
        }
    }
}

struct RunRecord {
    definition: Arc<WorkflowDefinition>,
    state: WorkflowState,
}

/// Exclusive ownership of a run, released on drop
///
/// While armed the run is `running` in the store. Dropping an armed claim
/// means the owning future was cancelled mid-run, so the run is marked
/// failed and can be resumed.
struct RunClaim<'a> {
    engine: &'a WorkflowEngine,
    id: WorkflowId,
    armed: bool,
}

impl Drop for RunClaim<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(workflow_id = %self.id, "Workflow run dropped before completion");
            match self.engine.runs.try_write() {
                Ok(mut runs) => {
                    if let Some(record) = runs.get_mut(&self.id) {
                        interrupt(&mut record.state);
                    }
                }
                // applied by the next call that takes the store lock
                Err(_) => {
                    self.engine
                        .interrupted
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .insert(self.id);
                }
            }
        }

        self.engine
            .running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
    }
}

/// Executes workflow runs against an agent registry
pub struct WorkflowEngine {
    registry: Arc<AgentRegistry>,
    config: EngineConfig,
    runs: RwLock<HashMap<WorkflowId, RunRecord>>,
    running: Mutex<HashSet<WorkflowId>>,
    interrupted: Mutex<HashSet<WorkflowId>>,
}

impl WorkflowEngine {
    /// Create an engine with default configuration
    pub fn new(registry: Arc<AgentRegistry>) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(registry: Arc<AgentRegistry>, config: EngineConfig) -> Self {
        Self {
            registry,
            config,
            runs: RwLock::new(HashMap::new()),
            running: Mutex::new(HashSet::new()),
            interrupted: Mutex::new(HashSet::new()),
        }
    }

    /// Configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a pending run
    ///
    /// # Errors
    ///
    /// Returns a definition or binding error; nothing is stored in that case.
    pub async fn create(
        &self,
        definition: WorkflowDefinition,
        context: Map<String, Value>,
    ) -> Result<WorkflowId, WorkflowError> {
        let keys: Vec<&str> = context.keys().map(String::as_str).collect();
        definition.validate(&keys)?;

        let id = WorkflowId::new();
        let state = WorkflowState::new(id, &definition, context);
        info!(
            workflow_id = %id,
            workflow = %definition.name,
            steps = definition.steps.len(),
            "Workflow created"
        );

        let mut runs = self.runs.write().await;
        self.settle(&mut runs);
        runs.insert(
            id,
            RunRecord {
                definition: Arc::new(definition),
                state,
            },
        );
        self.evict(&mut runs);

        Ok(id)
    }

    /// Execute a pending run to completion
    ///
    /// A failing step stops the run and is recorded in the returned state.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ID, a run that is already running, or
    /// a run that is not pending.
    pub async fn run(&self, id: WorkflowId) -> Result<WorkflowState, WorkflowError> {
        let mut claim = self.claim(id)?;

        let (definition, state) = {
            let mut runs = self.runs.write().await;
            self.settle(&mut runs);
            let record = runs.get_mut(&id).ok_or(WorkflowError::NotFound(id))?;
            if record.state.status != RunStatus::Pending {
                return Err(WorkflowError::InvalidState {
                    id,
                    status: record.state.status,
                    expected: RunStatus::Pending,
                });
            }
            record.state.status = RunStatus::Running;
            record.state.started_at = Some(Utc::now());
            claim.armed = true;
            (Arc::clone(&record.definition), record.state.clone())
        };

        info!(workflow_id = %id, workflow = %definition.name, "Workflow started");
        let state = self.drive(&definition, state, 0).await;
        claim.armed = false;
        Ok(state)
    }

    /// Continue a failed run from its failed step
    ///
    /// Steps that already succeeded are not executed again and the context
    /// is kept as it stood.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown ID, a run that is already running, or
    /// a run that has not failed.
    pub async fn resume(&self, id: WorkflowId) -> Result<WorkflowState, WorkflowError> {
        let mut claim = self.claim(id)?;

        let (definition, state, start) = {
            let mut runs = self.runs.write().await;
            self.settle(&mut runs);
            let record = runs.get_mut(&id).ok_or(WorkflowError::NotFound(id))?;
            if record.state.status != RunStatus::Failed {
                return Err(WorkflowError::InvalidState {
                    id,
                    status: record.state.status,
                    expected: RunStatus::Failed,
                });
            }

            let steps = &mut record.state.steps;
            let start = steps
                .iter()
                .position(|s| s.status == StepStatus::Failed)
                .or_else(|| steps.iter().position(|s| s.status == StepStatus::Pending))
                .unwrap_or(steps.len());
            if let Some(step) = steps.get_mut(start) {
                step.reset();
            }

            record.state.status = RunStatus::Running;
            record.state.error = None;
            record.state.finished_at = None;
            claim.armed = true;
            (
                Arc::clone(&record.definition),
                record.state.clone(),
                start,
            )
        };

        info!(workflow_id = %id, workflow = %definition.name, from_step = start, "Workflow resumed");
        let state = self.drive(&definition, state, start).await;
        claim.armed = false;
        Ok(state)
    }

    /// Snapshot of a run
    pub async fn get(&self, id: WorkflowId) -> Option<WorkflowState> {
        self.settle_pending().await;
        self.runs.read().await.get(&id).map(|r| r.state.clone())
    }

    /// Snapshots of every retained run, oldest first
    pub async fn list(&self) -> Vec<WorkflowState> {
        self.settle_pending().await;
        let runs = self.runs.read().await;
        let mut states: Vec<_> = runs.values().map(|r| r.state.clone()).collect();
        states.sort_by_key(|s| s.created_at);
        states
    }

    /// Whether a `run` or `resume` call currently owns the run
    #[must_use]
    pub fn is_running(&self, id: WorkflowId) -> bool {
        self.running
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&id)
    }

    fn claim(&self, id: WorkflowId) -> Result<RunClaim<'_>, WorkflowError> {
        let mut running = self.running.lock().unwrap_or_else(|e| e.into_inner());
        if !running.insert(id) {
            return Err(WorkflowError::AlreadyRunning(id));
        }
        Ok(RunClaim {
            engine: self,
            id,
            armed: false,
        })
    }

    /// Mark runs whose owner was dropped while the store was busy
    fn settle(&self, runs: &mut HashMap<WorkflowId, RunRecord>) {
        let ids = {
            let mut interrupted = self.interrupted.lock().unwrap_or_else(|e| e.into_inner());
            std::mem::take(&mut *interrupted)
        };
        for id in ids {
            if let Some(record) = runs.get_mut(&id) {
                if record.state.status == RunStatus::Running {
                    interrupt(&mut record.state);
                }
            }
        }
    }

    async fn settle_pending(&self) {
        let pending = !self
            .interrupted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty();
        if pending {
            let mut runs = self.runs.write().await;
            self.settle(&mut runs);
        }
    }

    async fn drive(
        &self,
        definition: &WorkflowDefinition,
        mut state: WorkflowState,
        start: usize,
    ) -> WorkflowState {
        let id = state.workflow_id;

        for (index, step) in definition.steps.iter().enumerate().skip(start) {
            if state.steps[index].status != StepStatus::Pending {
                continue;
            }

            if let Some(condition) = &step.when {
                if !is_truthy(lookup(&state.context, condition)) {
                    debug!(workflow_id = %id, step = %step.name, %condition, "Step skipped");
                    let record = &mut state.steps[index];
                    record.status = StepStatus::Skipped;
                    record.finished_at = Some(Utc::now());
                    self.publish(&state).await;
                    continue;
                }
            }

            let input = match step.resolve_input(&state.context) {
                Ok(input) => input,
                Err(reason) => {
                    fail_step(&mut state, index, reason);
                    break;
                }
            };

            {
                let record = &mut state.steps[index];
                record.status = StepStatus::Running;
                record.attempts += 1;
                record.started_at = Some(Utc::now());
            }
            debug!(workflow_id = %id, step = %step.name, agent = %step.agent, "Step started");
            self.publish(&state).await;

            let result = match self.registry.get(&step.agent) {
                Some(agent) => {
                    agent
                        .invoke(&AgentTask::new(step.task_type.clone(), input))
                        .await
                }
                None => AgentResult::fail(format!("Agent {} not found", step.agent)),
            };

            if !result.success {
                let reason = result
                    .error
                    .unwrap_or_else(|| "agent reported failure".to_string());
                fail_step(&mut state, index, reason);
                break;
            }

            let output = result.output.unwrap_or(Value::Null);
            state
                .context
                .insert(LAST_OUTPUT_KEY.to_string(), output.clone());
            if let Some(key) = &step.output_key {
                state.context.insert(key.clone(), output.clone());
            }
            let record = &mut state.steps[index];
            record.status = StepStatus::Succeeded;
            record.output = Some(output);
            record.finished_at = Some(Utc::now());
            debug!(workflow_id = %id, step = %step.name, "Step succeeded");
            self.publish(&state).await;
        }

        if state.status == RunStatus::Running {
            state.status = RunStatus::Succeeded;
        }
        state.finished_at = Some(Utc::now());

        match &state.error {
            None => info!(workflow_id = %id, workflow = %state.name, "Workflow succeeded"),
            Some(error) => {
                warn!(workflow_id = %id, workflow = %state.name, %error, "Workflow failed")
            }
        }

        self.publish(&state).await;
        state
    }

    async fn publish(&self, state: &WorkflowState) {
        let mut runs = self.runs.write().await;
        if let Some(record) = runs.get_mut(&state.workflow_id) {
            record.state = state.clone();
        }
    }

    fn evict(&self, runs: &mut HashMap<WorkflowId, RunRecord>) {
        let max = self.config.max_retained_runs;
        if max == 0 || runs.len() <= max {
            return;
        }

        let mut terminal: Vec<_> = runs
            .values()
            .filter(|r| r.state.status.is_terminal())
            .map(|r| {
                (
                    r.state.finished_at.unwrap_or(r.state.created_at),
                    r.state.workflow_id,
                )
            })
            .collect();
        terminal.sort();

        let excess = runs.len() - max;
        for (_, id) in terminal.into_iter().take(excess) {
            runs.remove(&id);
            debug!(workflow_id = %id, "Evicted workflow run");
        }
    }
}

fn fail_step(state: &mut WorkflowState, index: usize, reason: String) {
    let record = &mut state.steps[index];
    record.status = StepStatus::Failed;
    record.error = Some(reason.clone());
    record.finished_at = Some(Utc::now());
    warn!(
        workflow_id = %state.workflow_id,
        step = %record.name,
        error = %reason,
        "Step failed"
    );

    state.error = Some(format!("Step '{}' failed: {}", record.name, reason));
    state.status = RunStatus::Failed;
}

/// Fail a run whose owning call went away mid-step
fn interrupt(state: &mut WorkflowState) {
    match state
        .steps
        .iter()
        .position(|s| s.status == StepStatus::Running)
    {
        Some(index) => fail_step(state, index, "interrupted before completion".to_string()),
        None => {
            state.status = RunStatus::Failed;
            state.error = Some("Workflow interrupted before completion".to_string());
        }
    }
    state.finished_at = Some(Utc::now());
}

#[cfg(test)]
mod tests;
