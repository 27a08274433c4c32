//! Error types for TruthChain

use crate::ledger::validation::Violation;
use thiserror::Error;

/// Every failure the ledger can report. None of these are process-fatal;
/// callers match on them and carry on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Entry #{0} not found")]
    NotFound(u64),
    #[error("Genesis entry cannot be attested")]
    GenesisImmutable,
    #[error("Entry #{index} already attested by {attested_by}")]
    AlreadyAttested { index: u64, attested_by: String },
    #[error("Entry #{0} failed its digest check and cannot be attested")]
    TamperedEntry(u64),
    #[error("Chain corrupted: {0}")]
    ChainCorrupted(Violation),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::validation::ViolationKind;

    #[test]
    fn test_error_messages() {
        assert_eq!(LedgerError::NotFound(7).to_string(), "Entry #7 not found");
        assert_eq!(
            LedgerError::AlreadyAttested { index: 1, attested_by: "Dr.V".to_string() }.to_string(),
            "Entry #1 already attested by Dr.V"
        );
        let corrupted = LedgerError::ChainCorrupted(Violation { index: 2, kind: ViolationKind::HashMismatch });
        assert_eq!(corrupted.to_string(), "Chain corrupted: entry #2 hash-mismatch");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(LedgerError::from(io), LedgerError::Io(msg) if msg == "missing"));
    }
}
