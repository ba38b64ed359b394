//! Chat message → agent task input

use crate::agents::TaskInput;
use crate::intent::Intent;
use serde_json::{json, Value};

/// Build the task input for the agent an intent is bound to
///
/// Pure: the same message always yields the same input.
#[must_use]
pub fn build_task_input(intent: Intent, message: &str) -> TaskInput {
    let value = match intent {
        Intent::Content => json!({
            "topic": message,
            "tone": "professional",
            "length": "medium",
        }),
        Intent::Seo => json!({
            "content": message,
            "focus": "audit",
        }),
        Intent::Design => json!({
            "brief": message,
            "style": "modern",
        }),
        Intent::Research => json!({
            "query": message,
            "depth": "standard",
        }),
        Intent::Knowledge => json!({
            "query": message,
            "limit": 5,
        }),
        Intent::Page => json!({
            "title": message,
            "status": "draft",
        }),
        Intent::General => json!({
            "message": message,
        }),
    };

    match value {
        Value::Object(map) => map,
        _ => TaskInput::new(),
    }
}
