//! Roles that interact with the ledger.
//!
//! Each role is a named wrapper over one ledger operation. Creators classify
//! before appending; the ledger itself never sees the classifier.

use crate::classifier::{classify_with_fallback, ClassificationResult, Classifier};
use crate::error::Result;
use crate::ledger::{Entry, Ledger, ProvenanceRecord, Validation};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ContentCreator {
    pub name: String,
}

impl ContentCreator {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Appends `content` with an already computed classification.
    pub fn publish_classified(
        &self,
        ledger: &Ledger,
        content: &str,
        classification: &ClassificationResult,
    ) -> Result<Entry> {
        ledger.append(&self.name, content, &classification.label, classification.score)
    }

    /// Classifies `content` (falling back to a neutral result) and appends it.
    pub async fn publish(
        &self,
        ledger: &Ledger,
        classifier: &dyn Classifier,
        content: &str,
        timeout: Duration,
    ) -> Result<(Entry, ClassificationResult)> {
        let classification = classify_with_fallback(classifier, content, timeout).await;
        let entry = self.publish_classified(ledger, content, &classification)?;
        Ok((entry, classification))
    }
}

#[derive(Debug, Clone)]
pub struct FactChecker {
    pub name: String,
}

impl FactChecker {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn verify(&self, ledger: &Ledger, index: u64) -> Result<()> {
        ledger.attest(index, &self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Publisher {
    pub name: String,
}

impl Publisher {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn run_integrity_check(&self, ledger: &Ledger) -> Validation {
        ledger.validate()
    }
}

#[derive(Debug, Clone)]
pub struct EndUser {
    pub name: String,
}

impl EndUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn query_provenance(&self, ledger: &Ledger, index: u64) -> Result<ProvenanceRecord> {
        ledger.provenance(index)
    }
}
