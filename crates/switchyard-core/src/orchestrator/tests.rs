use super::*;
use crate::agents::{Agent, AgentProfile};
use crate::workflow::{InputBinding, StepDefinition, WorkflowDefinition};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;
use switchyard_llm::MockProvider;

/// Records every task it receives and echoes the input back
struct RecordingAgent {
    name: &'static str,
    seen: Mutex<Vec<AgentTask>>,
}

impl RecordingAgent {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<AgentTask> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Agent for RecordingAgent {
    fn profile(&self) -> AgentProfile {
        AgentProfile::new(self.name, "records tasks")
    }

    async fn execute(
        &self,
        task: &AgentTask,
        _profile: &AgentProfile,
    ) -> crate::Result<AgentResult> {
        self.seen.lock().unwrap().push(task.clone());
        Ok(AgentResult::ok(json!({
            "content": format!("{} handled {}", self.name, task.task_type),
            "input": task.input,
        })))
    }
}

struct PanickingAgent;

#[async_trait]
impl Agent for PanickingAgent {
    fn profile(&self) -> AgentProfile {
        AgentProfile::new("panicky", "always panics")
    }

    async fn execute(
        &self,
        _task: &AgentTask,
        _profile: &AgentProfile,
    ) -> crate::Result<AgentResult> {
        panic!("handler bug")
    }
}

fn orchestrator_with(registry: Arc<AgentRegistry>, templates: WorkflowTemplates) -> Orchestrator {
    let engine = Arc::new(WorkflowEngine::new(Arc::clone(&registry)));
    Orchestrator::new(registry, IntentClassifier::offline(), engine, templates)
}

fn task(task_type: &str, input: Value) -> AgentTask {
    AgentTask::from_value(task_type, input)
}

fn metadata(result: &AgentResult, key: &str) -> Value {
    result.metadata_value(key).cloned().unwrap_or(Value::Null)
}

#[tokio::test]
async fn test_chat_routes_to_bound_agent() {
    let registry = Arc::new(AgentRegistry::new());
    let writer = RecordingAgent::new("content-writer");
    registry.register(writer.clone());
    let orchestrator = orchestrator_with(registry, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task("chat", json!({"message": "Write a blog post about Rust"})))
        .await;

    assert!(result.success);
    let seen = writer.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].task_type, "generate_content");
    assert_eq!(seen[0].input["topic"], "Write a blog post about Rust");
    assert_eq!(seen[0].input["tone"], "professional");

    let classification = metadata(&result, "classification");
    assert_eq!(classification["intent"], "content");
    assert_eq!(classification["agent"], "content-writer");
    assert_eq!(metadata(&result, "mode"), "chat");
}

#[tokio::test]
async fn test_chat_uses_semantic_classification_when_available() {
    let registry = Arc::new(AgentRegistry::new());
    let researcher = RecordingAgent::new("researcher");
    registry.register(researcher.clone());
    let engine = Arc::new(WorkflowEngine::new(Arc::clone(&registry)));
    let provider = Arc::new(MockProvider::with_content(
        r#"{"intent": "research", "confidence": 0.95, "reasoning": "asks about the market"}"#,
    ));
    let classifier = IntentClassifier::new(provider, Default::default());
    let orchestrator = Orchestrator::new(registry, classifier, engine, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task("chat", json!({"message": "What is happening in our market?"})))
        .await;

    assert!(result.success);
    assert_eq!(researcher.seen()[0].input["depth"], "standard");
    assert_eq!(metadata(&result, "classification")["source"], "semantic");
}

#[tokio::test]
async fn test_chat_registry_miss_answers_with_capabilities() {
    let orchestrator = orchestrator_with(Arc::new(AgentRegistry::new()), WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task("chat", json!({"message": "Design a logo for us"})))
        .await;

    assert!(result.success);
    let output = result.output.unwrap();
    assert!(output["response"].as_str().unwrap().contains("I can help you with"));
    assert_eq!(output["classification"]["intent"], "design");
}

#[tokio::test]
async fn test_chat_without_message_fails() {
    let orchestrator = orchestrator_with(Arc::new(AgentRegistry::new()), WorkflowTemplates::builtin());

    let result = orchestrator.execute(task("chat", json!({"text": "hi"}))).await;

    assert!(!result.success);
    let error = result.error.unwrap();
    assert!(error.starts_with("Invalid chat input"), "{}", error);
    assert!(error.contains("message"));
}

#[tokio::test]
async fn test_unknown_mode_lists_valid_types() {
    let orchestrator = orchestrator_with(Arc::new(AgentRegistry::new()), WorkflowTemplates::builtin());

    let result = orchestrator.execute(task("summarize", json!({}))).await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Unknown task type 'summarize'. Valid types: chat, complex_task, delegate, workflow")
    );
    assert_eq!(metadata(&result, "mode"), "summarize");
    assert!(metadata(&result, "durationMs").is_u64());
}

#[tokio::test]
async fn test_delegate_passes_input_through() {
    let registry = Arc::new(AgentRegistry::new());
    let seo = RecordingAgent::new("seo-analyst");
    registry.register(seo.clone());
    let orchestrator = orchestrator_with(registry, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task(
            "delegate",
            json!({
                "agentName": "seo-analyst",
                "taskType": "keyword_research",
                "taskInput": {"keywords": ["rust", "async"]},
            }),
        ))
        .await;

    assert!(result.success);
    let seen = seo.seen();
    assert_eq!(seen[0].task_type, "keyword_research");
    assert_eq!(seen[0].input["keywords"], json!(["rust", "async"]));
    assert_eq!(metadata(&result, "mode"), "delegate");
}

#[tokio::test]
async fn test_delegate_panic_becomes_failed_result() {
    let registry = Arc::new(AgentRegistry::new());
    registry.register(Arc::new(PanickingAgent));
    let orchestrator = orchestrator_with(registry, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task(
            "delegate",
            json!({"agentName": "panicky", "taskType": "anything"}),
        ))
        .await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("handler bug"));
    assert_eq!(metadata(&result, "mode"), "delegate");
}

#[tokio::test]
async fn test_complex_task_counts_outcomes() {
    let registry = Arc::new(AgentRegistry::new());
    registry.register(RecordingAgent::new("researcher"));
    registry.register(Arc::new(PanickingAgent));
    let orchestrator = orchestrator_with(registry, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task(
            "complex_task",
            json!({"steps": [
                {"agent": "panicky", "type": "x"},
                {"agent": "researcher", "type": "research_topic", "input": {"query": "rust"}},
            ]}),
        ))
        .await;

    assert!(result.success);
    let output = result.output.unwrap();
    assert_eq!(output["succeeded"], 1);
    assert_eq!(output["failed"], 1);
    assert_eq!(output["results"][0]["success"], false);
    assert_eq!(output["results"][1]["success"], true);
    assert_eq!(output["results"][1]["agent"], "researcher");
    assert_eq!(output["results"][1]["type"], "research_topic");
}

#[tokio::test]
async fn test_workflow_template_runs_to_completion() {
    let registry = Arc::new(AgentRegistry::new());
    let writer = RecordingAgent::new("content-writer");
    let builder = RecordingAgent::new("page-builder");
    registry.register(writer.clone());
    registry.register(builder.clone());
    let orchestrator = orchestrator_with(registry, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task(
            "workflow",
            json!({"template": "page-creation", "context": {"topic": "Spring sale"}}),
        ))
        .await;

    assert!(result.success, "{:?}", result.error);
    let output = result.output.unwrap();
    assert_eq!(output["status"], "succeeded");
    assert_eq!(output["steps"][0]["name"], "draft");
    assert_eq!(output["steps"][1]["status"], "succeeded");
    assert_eq!(
        output["finalOutput"]["content"],
        "page-builder handled create_page"
    );
    assert_eq!(output["error"], Value::Null);

    let page_task = &builder.seen()[0];
    assert_eq!(page_task.input["title"], "Spring sale");
    assert_eq!(page_task.input["body"], "content-writer handled generate_content");

    let id: crate::workflow::WorkflowId = output["workflowId"].as_str().unwrap().parse().unwrap();
    assert!(orchestrator.engine().get(id).await.is_some());
}

#[tokio::test]
async fn test_workflow_failure_mirrors_run_status() {
    let mut templates = WorkflowTemplates::empty();
    templates.insert(
        WorkflowDefinition::new("broken", "")
            .step(StepDefinition::new("first", "researcher", "research_topic"))
            .step(
                StepDefinition::new("second", "missing", "x")
                    .bind("notes", InputBinding::context("lastOutput")),
            ),
    );
    let registry = Arc::new(AgentRegistry::new());
    registry.register(RecordingAgent::new("researcher"));
    let orchestrator = orchestrator_with(registry, templates);

    let result = orchestrator
        .execute(task("workflow", json!({"template": "broken"})))
        .await;

    assert!(!result.success);
    assert_eq!(
        result.error.as_deref(),
        Some("Step 'second' failed: Agent missing not found")
    );
    let output = result.output.unwrap();
    assert_eq!(output["status"], "failed");
    assert_eq!(output["steps"][0]["status"], "succeeded");
    assert_eq!(output["steps"][1]["status"], "failed");
}

#[tokio::test]
async fn test_workflow_binding_error_fails_before_execution() {
    let registry = Arc::new(AgentRegistry::new());
    let researcher = RecordingAgent::new("researcher");
    registry.register(researcher.clone());
    let orchestrator = orchestrator_with(registry, WorkflowTemplates::builtin());

    let result = orchestrator
        .execute(task("workflow", json!({"template": "content-pipeline"})))
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("'topic'"));
    assert!(researcher.seen().is_empty());
}

#[test]
fn test_mode_parsing_is_exact() {
    assert_eq!(
        OrchestratorMode::from_task_type("complex_task"),
        Some(OrchestratorMode::ComplexTask)
    );
    assert_eq!(OrchestratorMode::from_task_type("Chat"), None);
    assert_eq!(OrchestratorMode::Workflow.to_string(), "workflow");
}
