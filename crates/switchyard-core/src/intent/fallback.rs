//! Deterministic keyword classification
//!
//! Used whenever the semantic path is unavailable. Pure: no I/O, never panics.

use super::table::Intent;
use super::{ClassificationSource, ClassifiedIntent};

/// Confidence for a keyword match
pub const KEYWORD_CONFIDENCE: f32 = 0.7;

/// Confidence for the unmatched default
pub const GENERAL_CONFIDENCE: f32 = 0.3;

/// Keyword categories in priority order: domain vocabulary first, broad
/// writing verbs last.
const KEYWORD_RULES: &[(Intent, &[&str])] = &[
    (
        Intent::Seo,
        &[
            "seo",
            "keyword",
            "meta description",
            "meta tag",
            "backlink",
            "serp",
            "search ranking",
            "search engine",
        ],
    ),
    (
        Intent::Design,
        &[
            "design",
            "layout",
            "palette",
            "colour",
            "color scheme",
            "typography",
            "logo",
            "mockup",
            "wireframe",
        ],
    ),
    (
        Intent::Page,
        &[
            "create page",
            "create a page",
            "new page",
            "landing page",
            "publish page",
            "update page",
            "cms",
        ],
    ),
    (
        Intent::Knowledge,
        &[
            "knowledge base",
            "documentation",
            "our policy",
            "according to our",
            "faq",
            "look up",
        ],
    ),
    (
        Intent::Research,
        &[
            "research",
            "competitor",
            "market analysis",
            "trends",
            "investigate",
        ],
    ),
    (
        Intent::Content,
        &[
            "write",
            "article",
            "blog",
            "newsletter",
            "copywriting",
            "draft",
            "content",
        ],
    ),
];

/// Classify a message by keyword
///
/// Always returns a valid intent, defaulting to `General`.
#[must_use]
pub fn fallback_classify(message: &str) -> ClassifiedIntent {
    let lower = message.to_lowercase();

    for (intent, keywords) in KEYWORD_RULES {
        if let Some(keyword) = keywords.iter().find(|k| lower.contains(*k)) {
            return ClassifiedIntent::new(
                *intent,
                KEYWORD_CONFIDENCE,
                format!("Matched keyword '{}'", keyword),
                ClassificationSource::Fallback,
            );
        }
    }

    ClassifiedIntent::new(
        Intent::General,
        GENERAL_CONFIDENCE,
        "No keyword matched; using general intent".to_string(),
        ClassificationSource::Fallback,
    )
}
