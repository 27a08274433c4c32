//! Remote detector behind a HuggingFace-style inference endpoint.
//!
//! The endpoint answers `POST {"inputs": text}` with per-label scores, e.g.
//! `[[{"label": "Fake", "score": 0.93}, {"label": "Real", "score": 0.07}]]`.
//! `Fake`/`LABEL_1` is the AI-generated probability.

use super::{ClassificationResult, Classifier, ClassifierError};
use crate::config::ClassifierConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Below this many words the detector's answer is unreliable.
const MIN_RELIABLE_WORDS: usize = 20;

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            InferenceResponse::Nested(mut batches) => {
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.swap_remove(0)
                }
            }
            InferenceResponse::Flat(scores) => scores,
        }
    }
}

/// Picks the AI-generated probability out of the label scores.
fn ai_score(scores: &[LabelScore]) -> Option<f64> {
    let find = |name: &str| scores.iter().find(|s| s.label == name).map(|s| s.score);
    find("Fake")
        .or_else(|| find("LABEL_1"))
        .or_else(|| find("Real").or_else(|| find("LABEL_0")).map(|human| 1.0 - human))
}

pub struct RemoteClassifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    retry_delay: Duration,
    threshold: f64,
}

impl RemoteClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
        retry_delay: Duration,
        threshold: f64,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint, api_key, retry_delay, threshold))
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        retry_delay: Duration,
        threshold: f64,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            retry_delay,
            threshold,
        }
    }

    /// Reads the API key from the environment variable named in `config`.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let api_key = std::env::var(&config.api_key_env).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            return Err(ClassifierError::MissingCredentials(format!(
                "environment variable {} is not set",
                config.api_key_env
            )));
        }
        Self::new(
            config.endpoint.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.retry_delay_secs),
            config.ai_threshold,
        )
    }

    async fn post(&self, content: &str) -> Result<reqwest::Response, ClassifierError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": content }));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        Ok(request.send().await?)
    }
}

#[async_trait]
impl Classifier for RemoteClassifier {
    fn name(&self) -> &str {
        "remote"
    }

    async fn classify(&self, content: &str) -> Result<ClassificationResult, ClassifierError> {
        if content.split_whitespace().count() < MIN_RELIABLE_WORDS {
            warn!(
                "Text too short for accurate detection (need {}+ words)",
                MIN_RELIABLE_WORDS
            );
        }

        let mut response = self.post(content).await?;

        // Cold model: wait once and retry.
        if response.status() == StatusCode::SERVICE_UNAVAILABLE {
            info!(delay = ?self.retry_delay, "Model loading, retrying");
            tokio::time::sleep(self.retry_delay).await;
            response = self.post(content).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClassifierError::MissingCredentials("API key rejected".to_string()));
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable>".to_string());
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Decode(e.to_string()))?;
        let scores = parsed.into_scores();
        let score = ai_score(&scores)
            .ok_or_else(|| ClassifierError::Decode("response carries no recognised label".to_string()))?;
        debug!(score, "Remote classification received");

        Ok(ClassificationResult::from_score(score, self.threshold))
    }
}
