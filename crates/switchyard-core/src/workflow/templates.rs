//! Named workflow templates

use super::definition::{InputBinding, StepDefinition, WorkflowDefinition};
use super::engine::WorkflowError;
use crate::agents::is_toml_file;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default directory for template files
pub const DEFAULT_TEMPLATES_DIR: &str = "config/workflows";

/// Name → definition table with exact-name lookup
#[derive(Debug, Clone, Default)]
pub struct WorkflowTemplates {
    templates: BTreeMap<String, WorkflowDefinition>,
}

impl WorkflowTemplates {
    /// Empty table
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the built-in templates
    #[must_use]
    pub fn builtin() -> Self {
        let mut templates = Self::empty();
        templates.insert(content_pipeline());
        templates.insert(page_creation());
        templates.insert(seo_audit());
        templates
    }

    /// Add or replace a template under its own name
    pub fn insert(&mut self, definition: WorkflowDefinition) {
        if self.templates.contains_key(&definition.name) {
            debug!(template = %definition.name, "Replacing workflow template");
        }
        self.templates.insert(definition.name.clone(), definition);
    }

    /// Look up a template by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WorkflowDefinition> {
        self.templates.get(name)
    }

    /// Look up a template, listing the known names on a miss
    ///
    /// # Errors
    ///
    /// Returns `UnknownTemplate` when no template has this name.
    pub fn resolve(&self, name: &str) -> Result<&WorkflowDefinition, WorkflowError> {
        self.get(name).ok_or_else(|| WorkflowError::UnknownTemplate {
            name: name.to_string(),
            available: self.names().join(", "),
        })
    }

    /// Template names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.templates.keys().cloned().collect()
    }

    /// All templates, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = &WorkflowDefinition> {
        self.templates.values()
    }

    /// Number of templates
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the table is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Load `*.toml` templates from a directory
    ///
    /// A missing directory loads nothing. Unparsable files are skipped with a
    /// warning. A file template replaces a built-in with the same name.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub fn load_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, WorkflowError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            debug!(path = %dir.display(), "Workflow template directory not found");
            return Ok(0);
        }

        let entries = std::fs::read_dir(dir)
            .map_err(|e| WorkflowError::Load(format!("{}: {}", dir.display(), e)))?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_toml_file(&path) {
                continue;
            }

            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    toml::from_str::<WorkflowDefinition>(&content).map_err(|e| e.to_string())
                });

            match parsed {
                Ok(definition) => {
                    debug!(template = %definition.name, path = %path.display(), "Loaded workflow template");
                    self.insert(definition);
                    loaded += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping workflow template");
                }
            }
        }

        info!(loaded, total = self.len(), "Workflow templates loaded");
        Ok(loaded)
    }
}

/// research → content → seo
fn content_pipeline() -> WorkflowDefinition {
    WorkflowDefinition::new(
        "content-pipeline",
        "Research a topic, draft an article from the findings, then optimize it for search",
    )
    .step(
        StepDefinition::new("research", "researcher", "research_topic")
            .bind("query", InputBinding::context("topic"))
            .bind("depth", InputBinding::literal("standard"))
            .with_output_key("research"),
    )
    .step(
        StepDefinition::new("draft", "content-writer", "generate_content")
            .bind("topic", InputBinding::context("topic"))
            .bind("research", InputBinding::context("research.content"))
            .bind("tone", InputBinding::literal("professional"))
            .bind("length", InputBinding::literal("long"))
            .with_output_key("draft"),
    )
    .step(
        StepDefinition::new("optimize", "seo-analyst", "analyze_seo")
            .bind("content", InputBinding::context("draft.content"))
            .bind("focus", InputBinding::literal("on_page"))
            .with_output_key("seo"),
    )
}

/// content → page
fn page_creation() -> WorkflowDefinition {
    WorkflowDefinition::new(
        "page-creation",
        "Write page copy for a topic and publish it as a draft page",
    )
    .step(
        StepDefinition::new("draft", "content-writer", "generate_content")
            .bind("topic", InputBinding::context("topic"))
            .bind("tone", InputBinding::literal("professional"))
            .bind("length", InputBinding::literal("medium"))
            .with_output_key("draft"),
    )
    .step(
        StepDefinition::new("publish", "page-builder", "create_page")
            .bind("title", InputBinding::template("{{topic}}"))
            .bind("body", InputBinding::context("draft.content"))
            .bind("status", InputBinding::literal("draft"))
            .with_output_key("page"),
    )
}

/// seo → content
fn seo_audit() -> WorkflowDefinition {
    WorkflowDefinition::new(
        "seo-audit",
        "Audit existing content for search and suggest a rewrite",
    )
    .step(
        StepDefinition::new("audit", "seo-analyst", "analyze_seo")
            .bind("content", InputBinding::context("content"))
            .bind("focus", InputBinding::literal("audit"))
            .with_output_key("audit"),
    )
    .step(
        StepDefinition::new("rewrite", "content-writer", "generate_content")
            .bind(
                "topic",
                InputBinding::template("Rewrite the content applying these findings: {{audit.content}}"),
            )
            .bind("source", InputBinding::context("content"))
            .bind("tone", InputBinding::literal("professional"))
            .bind("length", InputBinding::literal("medium"))
            .with_output_key("rewrite"),
    )
}
