use super::*;
use crate::intent::{ClassificationSource, GENERAL_CONFIDENCE, KEYWORD_CONFIDENCE};
use std::sync::Arc;
use switchyard_llm::{MockProvider, MockReply};

fn classifier_with(provider: Arc<MockProvider>) -> IntentClassifier {
    IntentClassifier::new(
        provider,
        ClassifierConfig {
            timeout_ms: 50,
            ..Default::default()
        },
    )
}

#[test]
fn test_prompt_lists_every_intent() {
    let (system, user) = build_prompt("make me a logo");
    for intent in Intent::ALL {
        assert!(system.contains(&format!("- {}:", intent.key())));
    }
    assert!(system.contains("\"intent\""));
    assert_eq!(user, "Request: make me a logo");
}

#[tokio::test]
async fn test_semantic_result_is_used() {
    let provider = Arc::new(MockProvider::with_content(
        r#"Here you go: {"intent": "research", "confidence": 0.9, "reasoning": "market question"}"#,
    ));
    let classifier = classifier_with(provider.clone());

    let result = classifier.classify("Write something about our market").await;

    assert_eq!(result.intent, Intent::Research);
    assert_eq!(result.source, ClassificationSource::Semantic);
    assert_eq!(result.reasoning, "market question");
    assert_eq!(provider.calls(), 1);
    assert!(provider.requests()[0].json_mode);
}

#[tokio::test]
async fn test_backend_error_falls_back() {
    let provider = Arc::new(MockProvider::new());
    provider.push(MockReply::Error("503".to_string()));
    let classifier = classifier_with(provider);

    let result = classifier.classify("Write a blog post").await;

    assert_eq!(result.intent, Intent::Content);
    assert_eq!(result.source, ClassificationSource::Fallback);
    assert_eq!(result.confidence, KEYWORD_CONFIDENCE);
}

#[tokio::test]
async fn test_unknown_intent_falls_back() {
    let provider = Arc::new(MockProvider::with_content(r#"{"intent": "weather"}"#));
    let classifier = classifier_with(provider);

    let result = classifier.classify("hello there").await;

    assert_eq!(result.intent, Intent::General);
    assert_eq!(result.source, ClassificationSource::Fallback);
    assert_eq!(result.confidence, GENERAL_CONFIDENCE);
}

#[tokio::test]
async fn test_unparseable_output_falls_back() {
    let provider = Arc::new(MockProvider::with_content("I would say SEO."));
    let classifier = classifier_with(provider);

    let result = classifier.classify("check our seo").await;
    assert_eq!(result.intent, Intent::Seo);
    assert_eq!(result.source, ClassificationSource::Fallback);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_falls_back() {
    let provider = Arc::new(MockProvider::new());
    provider.push(MockReply::Delayed(
        Duration::from_secs(30),
        r#"{"intent": "design"}"#.to_string(),
    ));
    let classifier = classifier_with(provider);

    let err = classifier.classify_semantic("research trends").await.unwrap_err();
    assert!(matches!(err, ClassifyError::Timeout(50)));
}

#[tokio::test]
async fn test_offline_never_calls_provider() {
    let classifier = IntentClassifier::offline();
    assert!(matches!(
        classifier.classify_semantic("anything").await,
        Err(ClassifyError::Unavailable)
    ));

    let result = classifier.classify("design a wireframe").await;
    assert_eq!(result.intent, Intent::Design);
}

#[tokio::test]
async fn test_disabled_semantic_skips_provider() {
    let provider = Arc::new(MockProvider::with_content(r#"{"intent": "page"}"#));
    let classifier = IntentClassifier::new(
        provider.clone(),
        ClassifierConfig {
            semantic: false,
            ..Default::default()
        },
    );

    let result = classifier.classify("hello").await;
    assert_eq!(result.intent, Intent::General);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_empty_message_skips_provider() {
    let provider = Arc::new(MockProvider::with_content(r#"{"intent": "page"}"#));
    let classifier = classifier_with(provider.clone());

    let result = classifier.classify("   ").await;
    assert_eq!(result.intent, Intent::General);
    assert_eq!(provider.calls(), 0);
}
