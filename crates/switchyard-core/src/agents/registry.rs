//! Agent Registry
//!
//! Holds every agent handler under its name. Registration happens once at
//! startup by explicit composition; `refresh` swaps profile metadata in place.

use super::loader::ProfileLoader;
use super::profile::AgentProfile;
use super::task::{AgentId, AgentResult, AgentTask};
use crate::error::Result;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Trait every agent implements
#[async_trait]
pub trait Agent: Send + Sync {
    /// Profile the agent registers with. Its `name` is the registry key.
    fn profile(&self) -> AgentProfile;

    /// Execute a task using the profile currently held by the registry
    ///
    /// # Errors
    ///
    /// Any error is converted into a failed `AgentResult` by the caller.
    async fn execute(&self, task: &AgentTask, profile: &AgentProfile) -> Result<AgentResult>;
}

struct Slot {
    agent: Arc<dyn Agent>,
    profile: Arc<AgentProfile>,
}

#[derive(Default)]
struct Inner {
    order: Vec<AgentId>,
    slots: HashMap<AgentId, Slot>,
}

/// Snapshot of a registered agent
///
/// Holds the handler together with the profile that was current when the
/// snapshot was taken; a later `refresh` does not change it.
#[derive(Clone)]
pub struct RegisteredAgent {
    id: AgentId,
    agent: Arc<dyn Agent>,
    profile: Arc<AgentProfile>,
}

impl RegisteredAgent {
    /// Agent name
    #[must_use]
    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    /// Agent ID
    #[must_use]
    pub fn id(&self) -> &AgentId {
        &self.id
    }

    /// Profile metadata
    #[must_use]
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Run a task on this agent
    pub async fn execute(&self, task: &AgentTask) -> Result<AgentResult> {
        self.agent.execute(task, &self.profile).await
    }

    /// Run a task, converting errors and panics into a failed result
    pub async fn invoke(&self, task: &AgentTask) -> AgentResult {
        match AssertUnwindSafe(self.execute(task)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(agent = %self.id, task_type = %task.task_type, error = %e, "Agent failed");
                AgentResult::fail(e.to_string())
            }
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!(agent = %self.id, task_type = %task.task_type, %reason, "Agent panicked");
                AgentResult::fail(format!("Agent {} panicked: {}", self.id, reason))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl fmt::Debug for RegisteredAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredAgent")
            .field("id", &self.id)
            .field("profile", &self.profile)
            .finish()
    }
}

/// Registry of agents keyed by name
#[derive(Default)]
pub struct AgentRegistry {
    inner: RwLock<Inner>,
}

impl AgentRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent, replacing any agent with the same name
    ///
    /// A replaced agent keeps its original position in `get_all`.
    pub fn register(&self, agent: Arc<dyn Agent>) -> AgentId {
        let profile = agent.profile();
        let id = AgentId::new(profile.name.clone());
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());

        let slot = Slot {
            agent,
            profile: Arc::new(profile),
        };

        if inner.slots.insert(id.clone(), slot).is_some() {
            info!(agent = %id, "Replacing agent");
        } else {
            info!(agent = %id, "Registering agent");
            inner.order.push(id.clone());
        }

        id
    }

    /// Look up an agent; unknown names return `None`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RegisteredAgent> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.slots.get_key_value(name).map(|(id, slot)| RegisteredAgent {
            id: id.clone(),
            agent: Arc::clone(&slot.agent),
            profile: Arc::clone(&slot.profile),
        })
    }

    /// Check whether an agent is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.slots.contains_key(name)
    }

    /// All agents in registration order
    #[must_use]
    pub fn get_all(&self) -> Vec<RegisteredAgent> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .order
            .iter()
            .filter_map(|id| {
                inner.slots.get(id).map(|slot| RegisteredAgent {
                    id: id.clone(),
                    agent: Arc::clone(&slot.agent),
                    profile: Arc::clone(&slot.profile),
                })
            })
            .collect()
    }

    /// Agent names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.order.iter().map(|id| id.to_string()).collect()
    }

    /// Number of registered agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .order
            .len()
    }

    /// Whether no agents are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reload profile metadata from disk
    ///
    /// Returns the number of agents whose profile was replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile directory cannot be read.
    pub fn refresh(&self, loader: &ProfileLoader) -> Result<usize> {
        let profiles = loader.load_all()?;
        Ok(self.apply_profiles(profiles))
    }

    /// Replace profile metadata for registered agents
    ///
    /// The registry key always wins over the `name` field of the incoming
    /// profile, so identity never changes. Profiles for unknown agents are
    /// ignored.
    pub fn apply_profiles(&self, profiles: Vec<AgentProfile>) -> usize {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let mut updated = 0;

        for mut profile in profiles {
            let Some((id, slot)) = inner.slots.get_key_value(profile.name.as_str()) else {
                warn!(agent = %profile.name, "Ignoring profile for unregistered agent");
                continue;
            };
            let id = id.clone();
            profile.name = id.to_string();
            if *slot.profile == profile {
                continue;
            }
            if let Some(slot) = inner.slots.get_mut(&id) {
                slot.profile = Arc::new(profile);
                updated += 1;
                debug!(agent = %id, "Profile refreshed");
            }
        }

        info!(updated, "Agent profiles refreshed");
        updated
    }
}
