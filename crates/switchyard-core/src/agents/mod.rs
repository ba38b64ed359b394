//! Agents
//!
//! The uniform contract every handler implements, and the registry that
//! holds them.
//!
//! ```text
//! AgentTask { id, type, input } ──► Agent::execute ──► AgentResult { success, output | error }
//! ```
//!
//! Agents are registered explicitly at startup. Profile metadata (prompts,
//! rules) can be edited on disk and reloaded with `AgentRegistry::refresh`.

mod loader;
mod profile;
mod prompt;
mod registry;
mod task;

pub use loader::{ProfileLoader, DEFAULT_PROFILES_DIR};
pub(crate) use loader::is_toml_file;
pub use profile::AgentProfile;
pub use prompt::{build_messages, PromptAgent};
pub use registry::{Agent, AgentRegistry, RegisteredAgent};
pub use task::{AgentId, AgentResult, AgentTask, TaskInput};
