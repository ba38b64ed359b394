//! Switchyard LLM - Language model provider abstraction
//!
//! This crate provides the model access used by Switchyard:
//! - Provider: the `LlmProvider` trait every backend implements
//! - Ollama: local Ollama HTTP provider
//! - Mock: scripted provider for tests and offline runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod error;
pub mod message;
pub mod mock;
pub mod ollama;
pub mod provider;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::{MockProvider, MockReply};
pub use ollama::{OllamaConfig, OllamaProvider};
pub use provider::{LlmProvider, SharedProvider, UnconfiguredProvider};
