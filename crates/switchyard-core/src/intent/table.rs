//! Intent table
//!
//! The closed set of intents a message can be routed to. Adding a routable
//! capability means adding a variant here and registering its agent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Routing intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Articles, blog posts, copy
    Content,
    /// Keyword research, audits, meta tags
    Seo,
    /// Layouts, palettes, visual direction
    Design,
    /// Topic and competitor research
    Research,
    /// Questions answered from the knowledge base
    Knowledge,
    /// CMS page creation
    Page,
    /// Anything else; not bound to an agent
    General,
}

/// Static description of an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentSpec {
    /// Key used in classifier prompts and responses
    pub key: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Agent the intent routes to
    pub agent: Option<&'static str>,
    /// Task type handed to that agent
    pub task_type: Option<&'static str>,
}

impl Intent {
    /// Every intent, `General` last
    pub const ALL: [Intent; 7] = [
        Intent::Content,
        Intent::Seo,
        Intent::Design,
        Intent::Research,
        Intent::Knowledge,
        Intent::Page,
        Intent::General,
    ];

    /// Static routing entry for this intent
    #[must_use]
    pub const fn spec(self) -> IntentSpec {
        match self {
            Intent::Content => IntentSpec {
                key: "content",
                description: "Write articles, blog posts, newsletters or marketing copy",
                agent: Some("content-writer"),
                task_type: Some("generate_content"),
            },
            Intent::Seo => IntentSpec {
                key: "seo",
                description: "Keyword research, SEO audits, meta tags and search rankings",
                agent: Some("seo-analyst"),
                task_type: Some("analyze_seo"),
            },
            Intent::Design => IntentSpec {
                key: "design",
                description: "Layouts, colour palettes, typography and visual design",
                agent: Some("designer"),
                task_type: Some("generate_design"),
            },
            Intent::Research => IntentSpec {
                key: "research",
                description: "Research a topic, market or competitors",
                agent: Some("researcher"),
                task_type: Some("research_topic"),
            },
            Intent::Knowledge => IntentSpec {
                key: "knowledge",
                description: "Answer questions from the organization's knowledge base",
                agent: Some("knowledge"),
                task_type: Some("search_knowledge"),
            },
            Intent::Page => IntentSpec {
                key: "page",
                description: "Create, update or publish CMS pages",
                agent: Some("page-builder"),
                task_type: Some("create_page"),
            },
            Intent::General => IntentSpec {
                key: "general",
                description: "Greetings, help requests and anything else",
                agent: None,
                task_type: None,
            },
        }
    }

    /// Intent key
    #[must_use]
    pub const fn key(self) -> &'static str {
        self.spec().key
    }

    /// Look up an intent by key (case-insensitive)
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|intent| intent.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Static capability message for unroutable chat messages
pub fn capability_message() -> String {
    let mut message = String::from("I can help you with:");
    for intent in Intent::ALL {
        let spec = intent.spec();
        if spec.agent.is_some() {
            message.push_str(&format!("\n- {}: {}", spec.key, spec.description));
        }
    }
    message.push_str("\n\nTell me what you need and I'll route it to the right agent.");
    message
}
