//! LLM Provider trait definition

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;
use std::sync::Arc;

/// Trait for LLM providers
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Complete a conversation (text only)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

/// Provider handle shared between the classifier and prompt agents
pub type SharedProvider = Arc<dyn LlmProvider>;

/// Stand-in used when no backend is configured; every call fails
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredProvider;

#[async_trait::async_trait]
impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn default_model(&self) -> &str {
        ""
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        Err(crate::error::Error::NotConfigured(
            "set llm.provider to use language model agents".to_string(),
        ))
    }
}
