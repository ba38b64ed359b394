//! Agent Profiles
//!
//! Metadata describing an agent: what it does, how it presents itself and
//! the rules it follows. Profiles are plain data and can be edited as TOML.

use serde::{Deserialize, Serialize};

/// Agent capability record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent name (registry key)
    pub name: String,
    /// Agent description
    #[serde(default)]
    pub description: String,
    /// Specialized capabilities
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Display icon
    #[serde(default = "default_icon")]
    pub icon: String,
    /// Role the agent plays
    #[serde(default)]
    pub role: String,
    /// Rules appended to the system prompt
    #[serde(default)]
    pub rules: Vec<String>,
    /// System prompt for prompt-backed agents
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_icon() -> String {
    "🤖".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

impl AgentProfile {
    /// Create a profile with basic settings
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            capabilities: Vec::new(),
            icon: default_icon(),
            role: String::new(),
            rules: Vec::new(),
            system_prompt: default_system_prompt(),
        }
    }

    /// Set the role
    #[must_use]
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the icon
    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Set the capabilities
    #[must_use]
    pub fn with_capabilities(mut self, caps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.capabilities = caps.into_iter().map(Into::into).collect();
        self
    }

    /// Set the rules
    #[must_use]
    pub fn with_rules(mut self, rules: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.rules = rules.into_iter().map(Into::into).collect();
        self
    }

    /// Set the system prompt
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Content writer profile
    pub fn content_writer() -> Self {
        Self::new("content-writer", "Writes articles, blog posts and marketing copy")
            .with_icon("✍️")
            .with_role("writer")
            .with_capabilities(["blog_posts", "articles", "copywriting"])
            .with_system_prompt("You are a content writer. Produce clear, well-structured text.")
            .with_rules(["Match the requested tone", "Respect the requested length"])
    }

    /// SEO analyst profile
    pub fn seo_analyst() -> Self {
        Self::new("seo-analyst", "Keyword research, SEO audits and meta tags")
            .with_icon("🔎")
            .with_role("analyst")
            .with_capabilities(["keyword_research", "seo_audit", "meta_tags"])
            .with_system_prompt("You are an SEO analyst. Give concrete, prioritized findings.")
    }

    /// Designer profile
    pub fn designer() -> Self {
        Self::new("designer", "Layouts, colour palettes and visual direction")
            .with_icon("🎨")
            .with_role("designer")
            .with_capabilities(["layout", "palette", "typography"])
            .with_system_prompt("You are a visual designer. Describe designs precisely.")
    }

    /// Researcher profile
    pub fn researcher() -> Self {
        Self::new("researcher", "Topic research and competitor analysis")
            .with_icon("📚")
            .with_role("researcher")
            .with_capabilities(["research", "competitor_analysis", "summaries"])
            .with_system_prompt("You are a researcher. Summarize findings with key facts.")
    }

    /// Knowledge base profile
    pub fn knowledge() -> Self {
        Self::new("knowledge", "Answers questions from the knowledge base")
            .with_icon("🧠")
            .with_role("librarian")
            .with_capabilities(["knowledge_search", "question_answering"])
            .with_system_prompt("You answer questions using the organization's knowledge base.")
            .with_rules(["Say when the knowledge base has no answer"])
    }

    /// Page builder profile
    pub fn page_builder() -> Self {
        Self::new("page-builder", "Creates and updates CMS pages")
            .with_icon("📄")
            .with_role("builder")
            .with_capabilities(["page_creation", "page_update"])
            .with_system_prompt("You turn content into CMS page structures.")
    }

    /// Profiles for every agent the intent table routes to
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::content_writer(),
            Self::seo_analyst(),
            Self::designer(),
            Self::researcher(),
            Self::knowledge(),
            Self::page_builder(),
        ]
    }
}
