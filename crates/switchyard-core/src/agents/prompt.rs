//! Prompt-backed agent
//!
//! Executes a task by sending the agent's profile and the task input to an
//! LLM provider.

use super::profile::AgentProfile;
use super::registry::Agent;
use super::task::{AgentResult, AgentTask};
use crate::error::Result;
use async_trait::async_trait;
use serde_json::json;
use switchyard_llm::{CompletionRequest, Message, SharedProvider};
use tracing::debug;

/// Default max tokens for agent completions
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Agent that answers from a language model using its profile as instructions
pub struct PromptAgent {
    profile: AgentProfile,
    provider: SharedProvider,
    model: String,
    max_tokens: u32,
}

impl PromptAgent {
    /// Create a prompt agent on the provider's default model
    pub fn new(profile: AgentProfile, provider: SharedProvider) -> Self {
        Self {
            profile,
            provider,
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Use a specific model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the completion token limit
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Build the system and user messages for a task
pub fn build_messages(profile: &AgentProfile, task: &AgentTask) -> Vec<Message> {
    let mut system = profile.system_prompt.clone();
    if !profile.role.is_empty() {
        system.push_str(&format!("\n\nRole: {}", profile.role));
    }
    if !profile.rules.is_empty() {
        system.push_str("\n\nRules:");
        for rule in &profile.rules {
            system.push_str(&format!("\n- {}", rule));
        }
    }

    let input = serde_json::to_string_pretty(&task.input).unwrap_or_else(|_| "{}".to_string());
    let user = format!("Task type: {}\n\nInput:\n{}", task.task_type, input);

    vec![Message::system(system), Message::user(user)]
}

#[async_trait]
impl Agent for PromptAgent {
    fn profile(&self) -> AgentProfile {
        self.profile.clone()
    }

    async fn execute(&self, task: &AgentTask, profile: &AgentProfile) -> Result<AgentResult> {
        let mut request = CompletionRequest::new(self.model.clone()).with_max_tokens(self.max_tokens);
        request.messages = build_messages(profile, task);

        debug!(agent = %profile.name, task_type = %task.task_type, "Prompting provider");
        let response = self.provider.complete(request).await?;

        let mut result = AgentResult::ok(json!({ "content": response.content }))
            .with_metadata("model", json!(response.model))
            .with_metadata("provider", json!(self.provider.name()));

        if let Some(usage) = response.usage {
            result = result
                .with_metadata("promptTokens", json!(usage.prompt_tokens))
                .with_metadata("completionTokens", json!(usage.completion_tokens))
                .with_metadata("totalTokens", json!(usage.total_tokens));
        }

        Ok(result)
    }
}
