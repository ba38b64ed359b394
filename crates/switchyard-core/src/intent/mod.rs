//! Intent Classification
//!
//! Maps a free-text message to one intent of a closed table.
//!
//! ```text
//! message ──► semantic (LLM, JSON answer) ──ok──► ClassifiedIntent
//!                 │ error / timeout / unknown intent
//!                 ▼
//!             keyword fallback (pure) ──────────► ClassifiedIntent
//! ```

mod classifier;
mod fallback;
mod parser;
mod table;

pub use classifier::{build_prompt, ClassifierConfig, ClassifyError, IntentClassifier};
pub use fallback::{fallback_classify, GENERAL_CONFIDENCE, KEYWORD_CONFIDENCE};
pub use parser::{extract_json_object, parse_classification, ParseError, DEFAULT_SEMANTIC_CONFIDENCE};
pub use table::{capability_message, Intent, IntentSpec};

use serde::{Deserialize, Serialize};

/// Which strategy produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    /// Language model
    Semantic,
    /// Keyword matching
    Fallback,
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedIntent {
    /// Intent key
    pub intent: Intent,
    /// Bound agent; `None` for the general intent
    pub agent: Option<String>,
    /// Bound task type; `None` for the general intent
    pub task_type: Option<String>,
    /// Advisory confidence in [0, 1]
    pub confidence: f32,
    /// Short explanation
    pub reasoning: String,
    /// Strategy that produced this result
    pub source: ClassificationSource,
}

impl ClassifiedIntent {
    /// Build a classification, filling the agent binding from the intent table
    pub fn new(
        intent: Intent,
        confidence: f32,
        reasoning: String,
        source: ClassificationSource,
    ) -> Self {
        let spec = intent.spec();
        Self {
            intent,
            agent: spec.agent.map(str::to_string),
            task_type: spec.task_type.map(str::to_string),
            confidence: confidence.clamp(0.0, 1.0),
            reasoning,
            source,
        }
    }

    /// The `(agent, task_type)` pair, if the intent is routable
    #[must_use]
    pub fn binding(&self) -> Option<(&str, &str)> {
        match (self.agent.as_deref(), self.task_type.as_deref()) {
            (Some(agent), Some(task_type)) => Some((agent, task_type)),
            _ => None,
        }
    }
}
