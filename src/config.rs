//! Configuration management for TruthChain

use crate::error::LedgerError;
use crate::ledger::{GenesisSpec, DEFAULT_GENESIS_AUTHOR, DEFAULT_GENESIS_CONTENT, DEFAULT_SYSTEM_IDENTITY};
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "truthchain.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_path")]
    pub path: String,
    #[serde(default = "default_system_identity")]
    pub system_identity: String,
    #[serde(default = "default_genesis_author")]
    pub genesis_author: String,
    #[serde(default = "default_genesis_content")]
    pub genesis_content: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
            system_identity: default_system_identity(),
            genesis_author: default_genesis_author(),
            genesis_content: default_genesis_content(),
        }
    }
}

impl LedgerConfig {
    pub fn genesis_spec(&self) -> GenesisSpec {
        GenesisSpec {
            author: self.genesis_author.clone(),
            content: self.genesis_content.clone(),
            system_identity: self.system_identity.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    #[default]
    Heuristic,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub provider: ClassifierProvider,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_ai_threshold")]
    pub ai_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::Heuristic,
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout(),
            retry_delay_secs: default_retry_delay(),
            ai_threshold: default_ai_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_ledger_path() -> String {
    "./data/ledger.json".to_string()
}

fn default_system_identity() -> String {
    DEFAULT_SYSTEM_IDENTITY.to_string()
}

fn default_genesis_author() -> String {
    DEFAULT_GENESIS_AUTHOR.to_string()
}

fn default_genesis_content() -> String {
    DEFAULT_GENESIS_CONTENT.to_string()
}

fn default_endpoint() -> String {
    "https://router.huggingface.co/hf-inference/models/openai-community/roberta-base-openai-detector".to_string()
}

fn default_api_key_env() -> String {
    "HUGGINGFACE_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    20
}

fn default_ai_threshold() -> f64 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn from_toml(config_str: &str) -> Result<Config, LedgerError> {
        let config: Config = toml::from_str(config_str)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), LedgerError> {
        if self.ledger.path.trim().is_empty() {
            return Err(LedgerError::Config("ledger.path must be set".to_string()));
        }
        if self.ledger.system_identity.trim().is_empty() {
            return Err(LedgerError::Config("ledger.system_identity must be set".to_string()));
        }
        if !(0.0..=1.0).contains(&self.classifier.ai_threshold) {
            return Err(LedgerError::Config(format!(
                "classifier.ai_threshold must be within [0, 1], got {}",
                self.classifier.ai_threshold
            )));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(LedgerError::Config("classifier.timeout_secs must be positive".to_string()));
        }
        Ok(())
    }
}

/// Loads the configuration at `path`, falling back to defaults when the file
/// is absent.
pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config, LedgerError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(Config::default());
    }
    let config_str = fs::read_to_string(path)
        .map_err(|e| LedgerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    Config::from_toml(&config_str)
}
