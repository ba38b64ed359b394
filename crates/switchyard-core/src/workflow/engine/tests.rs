use super::*;
use crate::agents::{Agent, AgentProfile};
use crate::workflow::{InputBinding, StepDefinition};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Echoes its input under `content`; fails while `failures_left > 0`
struct ScriptedAgent {
    name: &'static str,
    calls: Arc<AtomicUsize>,
    failures_left: AtomicUsize,
}

impl ScriptedAgent {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            calls: Arc::new(AtomicUsize::new(0)),
            failures_left: AtomicUsize::new(0),
        }
    }

    fn failing(name: &'static str, times: usize) -> Self {
        let agent = Self::new(name);
        agent.failures_left.store(times, Ordering::SeqCst);
        agent
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn profile(&self) -> AgentProfile {
        AgentProfile::new(self.name, "scripted")
    }

    async fn execute(
        &self,
        task: &AgentTask,
        _profile: &AgentProfile,
    ) -> crate::Result<AgentResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Ok(AgentResult::fail(format!("{} is unavailable", self.name)));
        }
        Ok(AgentResult::ok(json!({
            "content": format!("{}:{}", self.name, task.task_type),
            "input": task.input,
        })))
    }
}

/// Signals when it starts and blocks until released
struct GatedAgent {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Agent for GatedAgent {
    fn profile(&self) -> AgentProfile {
        AgentProfile::new("gated", "waits for a signal")
    }

    async fn execute(
        &self,
        _task: &AgentTask,
        _profile: &AgentProfile,
    ) -> crate::Result<AgentResult> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(AgentResult::ok(json!("released")))
    }
}

fn context(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn three_steps() -> WorkflowDefinition {
    WorkflowDefinition::new("three", "")
        .step(StepDefinition::new("one", "first", "a").with_output_key("one"))
        .step(
            StepDefinition::new("two", "second", "b")
                .bind("previous", InputBinding::context("one.content")),
        )
        .step(StepDefinition::new("three", "third", "c"))
}

#[tokio::test]
async fn test_zero_step_workflow_succeeds_with_unchanged_context() {
    let engine = WorkflowEngine::new(Arc::new(AgentRegistry::new()));
    let initial = context(json!({"topic": "rust"}));

    let id = engine
        .create(WorkflowDefinition::new("empty", ""), initial.clone())
        .await
        .unwrap();
    let state = engine.run(id).await.unwrap();

    assert_eq!(state.status, RunStatus::Succeeded);
    assert_eq!(state.context, initial);
    assert!(state.final_output().is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_steps_chain_through_context() {
    let registry = Arc::new(AgentRegistry::new());
    registry.register(Arc::new(ScriptedAgent::new("first")));
    registry.register(Arc::new(ScriptedAgent::new("second")));
    registry.register(Arc::new(ScriptedAgent::new("third")));
    let engine = WorkflowEngine::new(registry);

    let id = engine.create(three_steps(), Map::new()).await.unwrap();
    let state = engine.run(id).await.unwrap();

    assert_eq!(state.status, RunStatus::Succeeded);
    assert_eq!(
        state.step_statuses(),
        vec![StepStatus::Succeeded, StepStatus::Succeeded, StepStatus::Succeeded]
    );
    assert_eq!(
        state.step("two").unwrap().output.as_ref().unwrap()["input"]["previous"],
        "first:a"
    );
    assert_eq!(state.final_output().unwrap()["content"], "third:c");
    assert_eq!(state.context["one"]["content"], "first:a");
}

#[tokio::test]
async fn test_failure_stops_run_and_leaves_later_steps_pending() {
    let registry = Arc::new(AgentRegistry::new());
    let third = ScriptedAgent::new("third");
    let third_calls = Arc::clone(&third.calls);
    registry.register(Arc::new(ScriptedAgent::new("first")));
    registry.register(Arc::new(ScriptedAgent::failing("second", 1)));
    registry.register(Arc::new(third));
    let engine = WorkflowEngine::new(registry);

    let id = engine.create(three_steps(), Map::new()).await.unwrap();
    let state = engine.run(id).await.unwrap();

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(
        state.step_statuses(),
        vec![StepStatus::Succeeded, StepStatus::Failed, StepStatus::Pending]
    );
    assert_eq!(
        state.error.as_deref(),
        Some("Step 'two' failed: second is unavailable")
    );
    assert_eq!(third_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_agent_fails_step() {
    let engine = WorkflowEngine::new(Arc::new(AgentRegistry::new()));
    let definition = WorkflowDefinition::new("ghost", "").step(StepDefinition::new("s", "ghost", "t"));

    let id = engine.create(definition, Map::new()).await.unwrap();
    let state = engine.run(id).await.unwrap();

    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(
        state.steps[0].error.as_deref(),
        Some("Agent ghost not found")
    );
}

#[tokio::test]
async fn test_resume_reruns_only_from_failed_step() {
    let registry = Arc::new(AgentRegistry::new());
    let first = ScriptedAgent::new("first");
    let first_calls = Arc::clone(&first.calls);
    let second = ScriptedAgent::failing("second", 1);
    let second_calls = Arc::clone(&second.calls);
    registry.register(Arc::new(first));
    registry.register(Arc::new(second));
    registry.register(Arc::new(ScriptedAgent::new("third")));
    let engine = WorkflowEngine::new(registry);

    let id = engine.create(three_steps(), Map::new()).await.unwrap();
    let failed = engine.run(id).await.unwrap();
    assert_eq!(failed.status, RunStatus::Failed);

    let resumed = engine.resume(id).await.unwrap();

    assert_eq!(resumed.status, RunStatus::Succeeded);
    assert!(resumed.error.is_none());
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 2);
    assert_eq!(resumed.step("two").unwrap().attempts, 2);
    assert_eq!(resumed.step("one").unwrap().attempts, 1);
}

#[tokio::test]
async fn test_conditional_step_skipped_when_falsy() {
    let registry = Arc::new(AgentRegistry::new());
    let optional = ScriptedAgent::new("first");
    let optional_calls = Arc::clone(&optional.calls);
    registry.register(Arc::new(optional));
    registry.register(Arc::new(ScriptedAgent::new("second")));
    let engine = WorkflowEngine::new(registry);

    let definition = WorkflowDefinition::new("cond", "")
        .step(StepDefinition::new("optional", "first", "a").with_when("polish"))
        .step(StepDefinition::new("always", "second", "b"));

    let id = engine
        .create(definition, context(json!({"polish": false})))
        .await
        .unwrap();
    let state = engine.run(id).await.unwrap();

    assert_eq!(state.status, RunStatus::Succeeded);
    assert_eq!(state.step_statuses(), vec![StepStatus::Skipped, StepStatus::Succeeded]);
    assert_eq!(optional_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_create_rejects_unbound_context_key() {
    let engine = WorkflowEngine::new(Arc::new(AgentRegistry::new()));
    let definition = WorkflowDefinition::new("needs-topic", "").step(
        StepDefinition::new("s", "a", "t").bind("query", InputBinding::context("topic")),
    );

    let err = engine.create(definition, Map::new()).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Binding { .. }));
    assert!(engine.list().await.is_empty());
}

#[tokio::test]
async fn test_misuse_errors() {
    let engine = WorkflowEngine::new(Arc::new(AgentRegistry::new()));

    let unknown = WorkflowId::new();
    assert!(matches!(
        engine.run(unknown).await,
        Err(WorkflowError::NotFound(id)) if id == unknown
    ));

    let id = engine
        .create(WorkflowDefinition::new("empty", ""), Map::new())
        .await
        .unwrap();
    assert!(matches!(
        engine.resume(id).await,
        Err(WorkflowError::InvalidState { status: RunStatus::Pending, .. })
    ));

    engine.run(id).await.unwrap();
    assert!(matches!(
        engine.run(id).await,
        Err(WorkflowError::InvalidState { status: RunStatus::Succeeded, .. })
    ));
    assert!(!engine.is_running(id));
}

#[tokio::test]
async fn test_state_observable_mid_run_and_concurrent_run_rejected() {
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let registry = Arc::new(AgentRegistry::new());
    registry.register(Arc::new(GatedAgent {
        started: Arc::clone(&started),
        release: Arc::clone(&release),
    }));
    let engine = Arc::new(WorkflowEngine::new(registry));

    let definition =
        WorkflowDefinition::new("gated", "").step(StepDefinition::new("wait", "gated", "t"));
    let id = engine.create(definition, Map::new()).await.unwrap();

    let handle = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.run(id).await })
    };

    started.notified().await;
    let snapshot = engine.get(id).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Running);
    assert_eq!(snapshot.steps[0].status, StepStatus::Running);
    assert!(engine.is_running(id));
    assert!(matches!(
        engine.run(id).await,
        Err(WorkflowError::AlreadyRunning(_))
    ));

    release.notify_one();
    let state = handle.await.unwrap().unwrap();
    assert_eq!(state.status, RunStatus::Succeeded);
    assert_eq!(engine.get(id).await.unwrap(), state);
}

#[tokio::test]
async fn test_eviction_keeps_newest_terminal_runs() {
    let engine = WorkflowEngine::with_config(
        Arc::new(AgentRegistry::new()),
        EngineConfig {
            max_retained_runs: 2,
        },
    );

    let mut ids = Vec::new();
    for _ in 0..2 {
        let id = engine
            .create(WorkflowDefinition::new("empty", ""), Map::new())
            .await
            .unwrap();
        engine.run(id).await.unwrap();
        ids.push(id);
    }
    let pending = engine
        .create(WorkflowDefinition::new("empty", ""), Map::new())
        .await
        .unwrap();

    assert_eq!(engine.list().await.len(), 2);
    assert!(engine.get(ids[0]).await.is_none());
    assert!(engine.get(ids[1]).await.is_some());
    assert!(engine.get(pending).await.is_some());
}

#[tokio::test]
async fn test_dropped_run_is_failed_and_resumable() {
    let started = Arc::new(Notify::new());
    let registry = Arc::new(AgentRegistry::new());
    registry.register(Arc::new(GatedAgent {
        started: Arc::clone(&started),
        release: Arc::new(Notify::new()),
    }));
    let engine = WorkflowEngine::with_config(
        Arc::clone(&registry),
        EngineConfig {
            max_retained_runs: 1,
        },
    );

    let definition =
        WorkflowDefinition::new("gated", "").step(StepDefinition::new("wait", "gated", "t"));
    let id = engine.create(definition, Map::new()).await.unwrap();

    let timed_out =
        tokio::time::timeout(std::time::Duration::from_millis(50), engine.run(id)).await;
    assert!(timed_out.is_err());

    let state = engine.get(id).await.unwrap();
    assert!(!engine.is_running(id));
    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.steps[0].status, StepStatus::Failed);
    assert_eq!(
        state.error.as_deref(),
        Some("Step 'wait' failed: interrupted before completion")
    );
    assert!(state.finished_at.is_some());
    assert!(matches!(
        engine.run(id).await,
        Err(WorkflowError::InvalidState { .. })
    ));

    registry.register(Arc::new(ScriptedAgent::new("gated")));
    let resumed = engine.resume(id).await.unwrap();
    assert_eq!(resumed.status, RunStatus::Succeeded);
    assert_eq!(resumed.steps[0].attempts, 2);

    // terminal again, so the retention limit applies
    engine
        .create(WorkflowDefinition::new("empty", ""), Map::new())
        .await
        .unwrap();
    assert_eq!(engine.list().await.len(), 1);
    assert!(engine.get(id).await.is_none());
}

#[tokio::test]
async fn test_interruption_recorded_while_store_is_busy() {
    let registry = Arc::new(AgentRegistry::new());
    let engine = WorkflowEngine::new(registry);
    let id = engine
        .create(
            WorkflowDefinition::new("one", "").step(StepDefinition::new("s", "gated", "t")),
            Map::new(),
        )
        .await
        .unwrap();

    {
        let mut runs = engine.runs.write().await;
        let record = runs.get_mut(&id).unwrap();
        record.state.status = RunStatus::Running;
        record.state.steps[0].status = StepStatus::Running;
        let mut claim = engine.claim(id).unwrap();
        claim.armed = true;
        drop(claim);
        assert_eq!(runs[&id].state.status, RunStatus::Running);
    }

    let state = engine.get(id).await.unwrap();
    assert_eq!(state.status, RunStatus::Failed);
    assert_eq!(state.steps[0].status, StepStatus::Failed);
    assert!(!engine.is_running(id));
}
