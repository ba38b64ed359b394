//! Application composition
//!
//! Wires the provider, agents, classifier, workflow engine and templates
//! into one `Orchestrator`. Agents are registered explicitly here.

pub mod config;
pub mod loader;
pub mod providers;

pub use config::AppConfig;
pub use loader::load_config;

use anyhow::{Context, Result};
use std::sync::Arc;
use switchyard_core::{
    AgentProfile, AgentRegistry, IntentClassifier, Orchestrator, ProfileLoader, PromptAgent,
    WorkflowEngine, WorkflowTemplates,
};
use switchyard_llm::{SharedProvider, UnconfiguredProvider};
use tracing::{info, warn};

/// Build the orchestrator from configuration
///
/// `offline` skips the language model entirely: the classifier uses keywords
/// and agents fail with a not-configured error.
pub fn build(config: &AppConfig, offline: bool) -> Result<Orchestrator> {
    let provider = if offline {
        None
    } else {
        providers::resolve_llm_provider(&config.llm)?
    };

    let registry = Arc::new(register_agents(config, provider.clone()));

    let loader = ProfileLoader::with_path(&config.agents.profiles_dir);
    let refreshed = registry
        .refresh(&loader)
        .with_context(|| format!("Failed to load agent profiles from {}", config.agents.profiles_dir))?;
    if refreshed > 0 {
        info!(refreshed, "Applied agent profile overrides");
    }

    let mut templates = WorkflowTemplates::builtin();
    templates
        .load_dir(&config.workflow.templates_dir)
        .with_context(|| {
            format!(
                "Failed to load workflow templates from {}",
                config.workflow.templates_dir
            )
        })?;

    let classifier = match provider {
        Some(provider) if config.classifier.semantic => {
            IntentClassifier::new(provider, config.classifier.clone())
        }
        _ => IntentClassifier::offline(),
    };

    let engine = Arc::new(WorkflowEngine::with_config(
        Arc::clone(&registry),
        config.workflow.engine(),
    ));

    info!(
        agents = registry.len(),
        templates = templates.len(),
        semantic = classifier.config().semantic,
        "Switchyard ready"
    );

    Ok(Orchestrator::new(registry, classifier, engine, templates))
}

fn register_agents(config: &AppConfig, provider: Option<SharedProvider>) -> AgentRegistry {
    let provider = provider.unwrap_or_else(|| {
        warn!("Agents have no language model; agent calls will fail");
        Arc::new(UnconfiguredProvider)
    });

    let registry = AgentRegistry::new();
    for profile in AgentProfile::defaults() {
        let mut agent = PromptAgent::new(profile, Arc::clone(&provider))
            .with_max_tokens(config.llm.max_tokens);
        if !config.llm.model.is_empty() {
            agent = agent.with_model(config.llm.model.as_str());
        }
        registry.register(Arc::new(agent));
    }
    registry
}
