//! Content classification ("AI detector") collaborators.
//!
//! The ledger never classifies anything itself. Callers run a [`Classifier`]
//! before `append`, normally through [`classify_with_fallback`], which turns
//! timeouts and failures into a neutral result so the append still happens.

pub mod heuristic;
pub mod remote;

pub use heuristic::HeuristicClassifier;
pub use remote::RemoteClassifier;

use crate::config::{ClassifierConfig, ClassifierProvider};
use crate::error::LedgerError;
use crate::ledger::content_type;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Score at or above which content is labelled AI-generated.
pub const DEFAULT_AI_THRESHOLD: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    #[error("classifier timed out after {0:?}")]
    Timeout(Duration),
    #[error("classifier API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("could not decode classifier response: {0}")]
    Decode(String),
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

impl From<reqwest::Error> for ClassifierError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClassifierError::Unavailable(format!("request timed out: {}", err))
        } else if err.is_decode() {
            ClassifierError::Decode(err.to_string())
        } else {
            ClassifierError::Unavailable(err.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfidenceTier {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ConfidenceTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            ConfidenceTier::VeryHigh
        } else if score >= 0.60 {
            ConfidenceTier::High
        } else if score >= 0.40 {
            ConfidenceTier::Medium
        } else if score >= 0.20 {
            ConfidenceTier::Low
        } else {
            ConfidenceTier::VeryLow
        }
    }

    pub fn verdict(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryHigh => "Almost Certainly AI-Generated",
            ConfidenceTier::High => "Likely AI-Generated",
            ConfidenceTier::Medium => "Uncertain, Could Be Either",
            ConfidenceTier::Low => "Likely Human-Written",
            ConfidenceTier::VeryLow => "Almost Certainly Human-Written",
        }
    }

    pub fn explanation(&self) -> &'static str {
        match self {
            ConfidenceTier::VeryHigh => "Highly structured, formal patterns strongly indicate AI authorship.",
            ConfidenceTier::High => "Writing style and structure suggest AI generation.",
            ConfidenceTier::Medium => "Mixed signals. Possibly AI-assisted or paraphrased.",
            ConfidenceTier::Low => "Natural phrasing and variation suggest human authorship.",
            ConfidenceTier::VeryLow => "Strong human writing signals. Very unlikely AI-generated.",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            ConfidenceTier::VeryLow => "VERY LOW",
            ConfidenceTier::Low => "LOW",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::High => "HIGH",
            ConfidenceTier::VeryHigh => "VERY HIGH",
        };
        f.write_str(s)
    }
}

/// Fixed-shape classifier output consumed by `Ledger::append` callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Likelihood that the content is AI-generated, in [0, 1].
    pub score: f64,
    pub label: String,
    pub tier: ConfidenceTier,
    pub explanation: String,
}

impl ClassificationResult {
    /// Builds a result from a raw score, clamping it into [0, 1].
    pub fn from_score(score: f64, threshold: f64) -> Self {
        let score = if score.is_finite() { score.clamp(0.0, 1.0) } else { 0.5 };
        let tier = ConfidenceTier::from_score(score);
        ClassificationResult {
            score,
            label: label_for_score(score, threshold).to_string(),
            tier,
            explanation: tier.explanation().to_string(),
        }
    }

    /// Result used when no classifier answer is available.
    pub fn neutral() -> Self {
        ClassificationResult {
            score: 0.5,
            label: content_type::UNKNOWN.to_string(),
            tier: ConfidenceTier::Medium,
            explanation: "Classifier unavailable; neutral score recorded.".to_string(),
        }
    }

    pub fn human_score(&self) -> f64 {
        1.0 - self.score
    }
}

pub fn label_for_score(score: f64, threshold: f64) -> &'static str {
    if score >= threshold {
        content_type::AI_GENERATED
    } else {
        content_type::HUMAN_WRITTEN
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    async fn classify(&self, content: &str) -> Result<ClassificationResult, ClassifierError>;
}

/// Runs `classifier` with a deadline. Errors and timeouts resolve to
/// [`ClassificationResult::neutral`].
pub async fn classify_with_fallback(
    classifier: &dyn Classifier,
    content: &str,
    timeout: Duration,
) -> ClassificationResult {
    match tokio::time::timeout(timeout, classifier.classify(content)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            warn!(classifier = classifier.name(), error = %e, "Classification failed, using neutral result");
            ClassificationResult::neutral()
        }
        Err(_) => {
            let e = ClassifierError::Timeout(timeout);
            warn!(classifier = classifier.name(), error = %e, "Classification failed, using neutral result");
            ClassificationResult::neutral()
        }
    }
}

/// Builds the classifier selected in configuration.
pub fn from_config(config: &ClassifierConfig) -> Result<Box<dyn Classifier>, LedgerError> {
    match config.provider {
        ClassifierProvider::Heuristic => Ok(Box::new(HeuristicClassifier::new(config.ai_threshold))),
        ClassifierProvider::Remote => {
            let remote = RemoteClassifier::from_config(config)
                .map_err(|e| LedgerError::Config(format!("remote classifier: {}", e)))?;
            Ok(Box::new(remote))
        }
    }
}
