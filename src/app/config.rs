//! Application configuration types

use serde::{Deserialize, Serialize};
use switchyard_core::agents::DEFAULT_PROFILES_DIR;
use switchyard_core::workflow::DEFAULT_TEMPLATES_DIR;
use switchyard_core::{ClassifierConfig, EngineConfig};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
}

/// Language model backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `ollama` or `none`
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model for agents; empty uses the provider default
    #[serde(default)]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_base_url() -> String {
    switchyard_llm::ollama::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_max_tokens() -> u32 {
    2048
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: default_base_url(),
            model: String::new(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Workflow engine and template settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_max_retained_runs")]
    pub max_retained_runs: usize,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
}

fn default_max_retained_runs() -> usize {
    EngineConfig::default().max_retained_runs
}

fn default_templates_dir() -> String {
    DEFAULT_TEMPLATES_DIR.to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_retained_runs: default_max_retained_runs(),
            templates_dir: default_templates_dir(),
        }
    }
}

impl WorkflowConfig {
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_retained_runs: self.max_retained_runs,
        }
    }
}

/// Agent profile settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: String,
}

fn default_profiles_dir() -> String {
    DEFAULT_PROFILES_DIR.to_string()
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            profiles_dir: default_profiles_dir(),
        }
    }
}
