//! LLM provider resolution

use super::config::LlmConfig;
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use switchyard_llm::{OllamaConfig, OllamaProvider, SharedProvider};
use tracing::info;

/// Build the configured provider; `None` when language models are disabled
pub fn resolve_llm_provider(config: &LlmConfig) -> Result<Option<SharedProvider>> {
    match config.provider.trim().to_lowercase().as_str() {
        "" | "none" => {
            info!("No LLM provider configured, using keyword routing only");
            Ok(None)
        }
        "ollama" => {
            let mut ollama = OllamaConfig::new()
                .with_base_url(config.base_url.as_str())
                .with_max_tokens(config.max_tokens)
                .with_timeout(Duration::from_secs(config.timeout_secs));
            if !config.model.is_empty() {
                ollama = ollama.with_model(config.model.as_str());
            }

            let provider =
                OllamaProvider::new(ollama).context("Failed to initialize Ollama provider")?;
            info!(
                base_url = %provider.config().base_url,
                model = %provider.config().default_model,
                "Registered Ollama provider"
            );
            Ok(Some(Arc::new(provider)))
        }
        other => bail!(
            "Unknown LLM provider '{}'. Expected 'ollama' or 'none'",
            other
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_none_disables_models() {
        assert!(resolve_llm_provider(&llm("none")).unwrap().is_none());
        assert!(resolve_llm_provider(&llm("")).unwrap().is_none());
    }

    #[test]
    fn test_ollama_provider() {
        let provider = resolve_llm_provider(&llm("Ollama")).unwrap().unwrap();
        assert_eq!(provider.name(), "ollama");
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let Err(err) = resolve_llm_provider(&llm("gpt")) else {
            panic!("unknown provider was accepted");
        };
        assert!(err.to_string().contains("Unknown LLM provider 'gpt'"));
    }
}
