//! Switchyard Core - Agent Orchestration Engine
//!
//! This crate provides the orchestration logic for Switchyard, including:
//! - Agents: the task/result contract, the agent registry and profile loading
//! - Intent: semantic classification with a deterministic keyword fallback
//! - Orchestrator: chat, complex task, delegate and workflow entry points
//! - Workflow: declarative step plans executed as inspectable runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agents;
pub mod error;
pub mod intent;
pub mod orchestrator;
pub mod workflow;

pub use agents::{
    Agent, AgentId, AgentProfile, AgentRegistry, AgentResult, AgentTask, ProfileLoader,
    PromptAgent, RegisteredAgent,
};
pub use error::{Error, Result};
pub use intent::{
    extract_json_object, fallback_classify, parse_classification, ClassificationSource,
    ClassifiedIntent, ClassifierConfig, Intent, IntentClassifier, IntentSpec,
};
pub use orchestrator::{Orchestrator, OrchestratorMode};
pub use workflow::{
    EngineConfig, InputBinding, RunStatus, StepDefinition, StepState, StepStatus,
    WorkflowDefinition, WorkflowEngine, WorkflowError, WorkflowId, WorkflowState,
    WorkflowTemplates,
};
