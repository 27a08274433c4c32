//! Integration tests for classification feeding the ledger

use async_trait::async_trait;
use std::time::Duration;
use truthchain::classifier::{
    self, ClassificationResult, Classifier, ClassifierError, ConfidenceTier, HeuristicClassifier,
};
use truthchain::config::{ClassifierConfig, ClassifierProvider};
use truthchain::ledger::Ledger;
use truthchain::participants::ContentCreator;

/// Never answers within any reasonable deadline.
struct StalledDetector;

#[async_trait]
impl Classifier for StalledDetector {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn classify(&self, _content: &str) -> Result<ClassificationResult, ClassifierError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(ClassifierError::Unavailable("never reached".to_string()))
    }
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_classifier_does_not_block_append() {
    let ledger = Ledger::new();
    let (entry, result) = ContentCreator::new("Alice")
        .publish(&ledger, &StalledDetector, "Field notes from the river bank.", Duration::from_secs(2))
        .await
        .unwrap();

    assert_eq!(result, ClassificationResult::neutral());
    assert_eq!(entry.content_type(), "unknown");
    assert_eq!(entry.classification_score(), 0.5);
    assert_eq!(ledger.len(), 2);
    assert!(ledger.validate().is_valid());
}

#[tokio::test]
async fn test_heuristic_from_config() {
    let classifier = classifier::from_config(&ClassifierConfig::default()).unwrap();
    assert_eq!(classifier.name(), "heuristic");

    let result = classifier
        .classify("As an AI, furthermore, it is important to note that, in summary, results vary.")
        .await
        .unwrap();
    assert_eq!(result.label, "ai-generated");
    assert_eq!(result.tier, ConfidenceTier::VeryHigh);
}

#[test]
fn test_remote_without_credentials_is_a_config_error() {
    let config = ClassifierConfig {
        provider: ClassifierProvider::Remote,
        api_key_env: "TRUTHCHAIN_INTEGRATION_KEY_NEVER_SET".to_string(),
        ..ClassifierConfig::default()
    };
    assert!(matches!(
        classifier::from_config(&config),
        Err(truthchain::LedgerError::Config(_))
    ));
}

#[test]
fn test_heuristic_labels_feed_entries() {
    let ledger = Ledger::new();
    let heuristic = HeuristicClassifier::default();
    let content = "We fixed the fence after the storm and had lunch by the barn.";
    let result = heuristic.classify_sync(content);
    let entry = ContentCreator::new("Dana").publish_classified(&ledger, content, &result).unwrap();
    assert_eq!(entry.content_type(), "human-written");
    assert_eq!(entry.classification_score(), result.score);
}
