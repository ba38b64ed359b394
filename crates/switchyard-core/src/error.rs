//! Error types for switchyard-core

use crate::workflow::WorkflowError;
use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Agent not registered
    #[error("Agent {0} not found")]
    AgentNotFound(String),

    /// An agent handler failed
    #[error("agent error: {0}")]
    Agent(String),

    /// Workflow engine misuse or definition problem
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Configuration error (unreadable profile or template files)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] switchyard_llm::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
