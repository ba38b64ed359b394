//! Two-tier intent classifier

use super::fallback::fallback_classify;
use super::parser::{parse_classification, ParseError};
use super::table::Intent;
use super::ClassifiedIntent;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use switchyard_llm::{CompletionRequest, Message, SharedProvider};
use thiserror::Error;
use tracing::{debug, warn};

/// Semantic classification failures; all of them trigger the fallback
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Semantic path disabled or no provider configured
    #[error("semantic classification unavailable")]
    Unavailable,

    /// Provider call timed out
    #[error("classifier timed out after {0}ms")]
    Timeout(u64),

    /// Provider call failed
    #[error("classifier backend failed: {0}")]
    Llm(#[from] switchyard_llm::Error),

    /// Response could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Use the language model before falling back to keywords
    #[serde(default = "default_true")]
    pub semantic: bool,
    /// Model override (empty = provider default)
    #[serde(default)]
    pub model: String,
    /// Timeout for the model call in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: f32,
    /// Token limit for the answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    8_000
}

fn default_max_tokens() -> u32 {
    200
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            semantic: default_true(),
            model: String::new(),
            timeout_ms: default_timeout_ms(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Build the system and user prompts for semantic classification
pub fn build_prompt(message: &str) -> (String, String) {
    let mut system = String::from(
        "You route user requests to specialist agents. Classify the request into exactly one intent.\n\nIntents:",
    );
    for intent in Intent::ALL {
        let spec = intent.spec();
        system.push_str(&format!("\n- {}: {}", spec.key, spec.description));
    }
    system.push_str(
        "\n\nRespond with JSON only, no other text:\n{\"intent\": \"<key>\", \"confidence\": <0.0-1.0>, \"reasoning\": \"<one sentence>\"}",
    );

    (system, format!("Request: {}", message))
}

/// Intent classifier with a semantic primary path and keyword fallback
#[derive(Clone)]
pub struct IntentClassifier {
    provider: Option<SharedProvider>,
    config: ClassifierConfig,
}

impl IntentClassifier {
    /// Classifier backed by a language model
    pub fn new(provider: SharedProvider, config: ClassifierConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
        }
    }

    /// Keyword-only classifier
    #[must_use]
    pub fn offline() -> Self {
        Self {
            provider: None,
            config: ClassifierConfig {
                semantic: false,
                ..Default::default()
            },
        }
    }

    /// Configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a message; never fails
    pub async fn classify(&self, message: &str) -> ClassifiedIntent {
        if message.trim().is_empty() {
            return fallback_classify(message);
        }

        match self.classify_semantic(message).await {
            Ok(classified) => {
                debug!(
                    intent = %classified.intent,
                    confidence = classified.confidence,
                    "Semantic classification"
                );
                classified
            }
            Err(ClassifyError::Unavailable) => fallback_classify(message),
            Err(e) => {
                warn!(error = %e, "Semantic classification failed, using keyword fallback");
                fallback_classify(message)
            }
        }
    }

    /// Semantic path only
    ///
    /// # Errors
    ///
    /// Returns the reason the semantic path could not produce an intent.
    pub async fn classify_semantic(&self, message: &str) -> Result<ClassifiedIntent, ClassifyError> {
        let provider = match (&self.provider, self.config.semantic) {
            (Some(provider), true) => provider,
            _ => return Err(ClassifyError::Unavailable),
        };

        let (system, user) = build_prompt(message);
        let request = CompletionRequest::new(self.config.model.clone())
            .with_message(Message::system(system))
            .with_message(Message::user(user))
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens)
            .with_json_mode();

        let timeout = Duration::from_millis(self.config.timeout_ms);
        let response = tokio::time::timeout(timeout, provider.complete(request))
            .await
            .map_err(|_| ClassifyError::Timeout(self.config.timeout_ms))??;

        Ok(parse_classification(&response.content)?)
    }
}

#[cfg(test)]
mod tests;
