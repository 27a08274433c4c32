use super::{ClassificationResult, Classifier, ClassifierError, DEFAULT_AI_THRESHOLD};
use async_trait::async_trait;

/// Phrases that show up disproportionately in machine-written prose.
const AI_MARKERS: [&str; 6] = [
    "as an ai",
    "in conclusion",
    "furthermore",
    "overall",
    "it is important to note",
    "in summary",
];

const BASE_SCORE: f64 = 0.2;
const MARKER_WEIGHT: f64 = 0.12;
const MAX_SCORE: f64 = 0.95;

/// Offline, dependency-free detector: counts marker phrases and comma density.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    threshold: f64,
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_AI_THRESHOLD)
    }
}

impl HeuristicClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn score(content: &str) -> f64 {
        let lower = content.to_lowercase();
        let words = content.split_whitespace().count().max(1);
        let commas = content.matches(',').count();
        let marker_hits = AI_MARKERS.iter().filter(|m| lower.contains(*m)).count();

        let raw = BASE_SCORE + marker_hits as f64 * MARKER_WEIGHT + commas as f64 / words as f64;
        (raw.min(MAX_SCORE) * 10_000.0).round() / 10_000.0
    }

    pub fn classify_sync(&self, content: &str) -> ClassificationResult {
        ClassificationResult::from_score(Self::score(content), self.threshold)
    }
}

#[async_trait]
impl Classifier for HeuristicClassifier {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn classify(&self, content: &str) -> Result<ClassificationResult, ClassifierError> {
        Ok(self.classify_sync(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ConfidenceTier;

    #[test]
    fn test_plain_prose_scores_low() {
        let result = HeuristicClassifier::default()
            .classify_sync("Breaking report: Satellite imagery confirms heavy flooding in the delta region.");
        assert_eq!(result.score, 0.2);
        assert_eq!(result.label, "human-written");
        assert_eq!(result.tier, ConfidenceTier::Low);
    }

    #[test]
    fn test_markers_raise_score() {
        // Two markers, one comma over eleven words.
        let text = "In conclusion, this response uses structured phrasing and overall polished transitions.";
        let expected = ((0.2 + 2.0 * 0.12 + 1.0 / 11.0) * 10_000.0_f64).round() / 10_000.0;
        assert_eq!(HeuristicClassifier::score(text), expected);
        assert_eq!(HeuristicClassifier::default().classify_sync(text).label, "ai-generated");
    }

    #[test]
    fn test_score_is_capped() {
        let text = "As an AI, in conclusion, furthermore, overall, it is important to note, in summary,";
        assert_eq!(HeuristicClassifier::score(text), 0.95);
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = HeuristicClassifier::new(0.9);
        let text = "In conclusion, this response uses structured phrasing and overall polished transitions.";
        assert_eq!(strict.classify_sync(text).label, "human-written");
    }
}
