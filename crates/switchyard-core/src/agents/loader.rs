//! Profile TOML Loader
//!
//! Loads agent profile overrides from the `config/agents/` directory.

use super::profile::AgentProfile;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default profile directory
pub const DEFAULT_PROFILES_DIR: &str = "config/agents";

/// Profile TOML Loader
#[derive(Debug, Clone)]
pub struct ProfileLoader {
    config_dir: PathBuf,
}

impl Default for ProfileLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileLoader {
    /// Create loader with default path (`config/agents/`)
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_PROFILES_DIR),
        }
    }

    /// Create loader with custom path
    #[must_use]
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            config_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Return configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load all profiles, sorted by name
    ///
    /// # Errors
    /// - Directory read failure
    /// - Individual file parse failures are warned and skipped
    pub fn load_all(&self) -> Result<Vec<AgentProfile>> {
        let mut profiles = Vec::new();

        if !self.config_dir.exists() {
            warn!("Profile directory not found: {:?}", self.config_dir);
            return Ok(profiles);
        }

        let entries = std::fs::read_dir(&self.config_dir).map_err(|e| {
            Error::Configuration(format!(
                "Failed to read profile directory {:?}: {}",
                self.config_dir, e
            ))
        })?;

        for entry in entries.flatten() {
            let path = entry.path();

            if !is_toml_file(&path) {
                continue;
            }

            match self.load_file(&path) {
                Ok(profile) => {
                    info!("Loaded agent profile: {}", profile.name);
                    profiles.push(profile);
                }
                Err(e) => {
                    warn!("Failed to load {:?}: {}", path, e);
                }
            }
        }

        profiles.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(
            "Loaded {} profiles from {:?}",
            profiles.len(),
            self.config_dir
        );
        Ok(profiles)
    }

    /// Load a single profile by agent name
    ///
    /// # Errors
    /// - File read failure
    /// - TOML parse failure
    pub fn load(&self, name: &str) -> Result<AgentProfile> {
        let path = self.config_dir.join(format!("{}.toml", name));

        if !path.exists() {
            return Err(Error::Configuration(format!(
                "Profile not found: {} (expected at {:?})",
                name, path
            )));
        }

        self.load_file(&path)
    }

    fn load_file(&self, path: &Path) -> Result<AgentProfile> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Configuration(format!("Failed to read {:?}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Failed to parse {:?}: {}", path, e)))
    }
}

pub(crate) fn is_toml_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
