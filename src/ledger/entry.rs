use crate::error::{LedgerError, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type Fingerprint = [u8; 32];

/// `previous_fingerprint` of the genesis entry.
pub const ZERO_FINGERPRINT: Fingerprint = [0u8; 32];

/// Well-known `content_type` labels. Callers may supply any other string.
pub mod content_type {
    pub const AI_GENERATED: &str = "ai-generated";
    pub const HUMAN_WRITTEN: &str = "human-written";
    pub const SYSTEM: &str = "system";
    pub const UNKNOWN: &str = "unknown";
}

/// SHA-256 of the UTF-8 bytes of `content`.
pub fn content_digest(content: &str) -> Fingerprint {
    Sha256::digest(content.as_bytes()).into()
}

pub fn fingerprint_to_hex(fingerprint: &Fingerprint) -> String {
    hex::encode(fingerprint)
}

pub fn fingerprint_from_hex(hex_str: &str) -> Result<Fingerprint> {
    let bytes = hex::decode(hex_str)
        .map_err(|e| LedgerError::Serialization(format!("Invalid hex fingerprint: {}", e)))?;
    if bytes.len() != 32 {
        return Err(LedgerError::Serialization(format!(
            "Fingerprint must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    bytes
        .try_into()
        .map_err(|_| LedgerError::Serialization("Failed to convert bytes into fingerprint".to_string()))
}

/// Timestamps are stored and encoded at microsecond precision.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| LedgerError::Serialization(format!("Invalid timestamp '{}': {}", value, e)))
}

/// The digested field set. Fields are declared in lexicographic order so the
/// JSON encoding has sorted keys.
#[derive(Serialize)]
struct CanonicalFields<'a> {
    author: &'a str,
    classification_score: f64,
    content_fingerprint: String,
    content_type: &'a str,
    index: u64,
    previous_fingerprint: String,
    timestamp: String,
}

/// One recorded provenance claim.
///
/// The binding digest (`entry_fingerprint`) covers `content_fingerprint`, not
/// `content`. Two edits therefore slip past the entry's own digest check:
///
/// - changing `content` alone leaves the digest intact; only
///   [`Entry::content_matches_fingerprint`] notices it;
/// - rewriting `content` and `content_fingerprint` together and then
///   recomputing `entry_fingerprint` yields a self-consistent entry that is
///   caught only by the next entry's link check (and not at all on the tip).
///
/// `attested_by` is also outside the digest, so attestation never moves the
/// fingerprint and a swapped attester goes unnoticed.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub(crate) index: u64,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) author: String,
    pub(crate) content: String,
    pub(crate) content_fingerprint: Fingerprint,
    pub(crate) content_type: String,
    pub(crate) classification_score: f64,
    pub(crate) previous_fingerprint: Fingerprint,
    pub(crate) entry_fingerprint: Fingerprint,
    pub(crate) attested_by: Option<String>,
}

impl Entry {
    pub fn new(
        index: u64,
        author: &str,
        content: &str,
        content_type: &str,
        classification_score: f64,
        previous_fingerprint: Fingerprint,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        if author.trim().is_empty() {
            return Err(LedgerError::InvalidInput("author must not be empty".to_string()));
        }
        if content.trim().is_empty() {
            return Err(LedgerError::InvalidInput("content must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&classification_score) {
            return Err(LedgerError::InvalidInput(format!(
                "classification score must be within [0, 1], got {}",
                classification_score
            )));
        }

        Ok(Self::seal(index, author, content, content_type, classification_score, previous_fingerprint, timestamp))
    }

    /// Builds and fingerprints an entry without input checks.
    pub(crate) fn seal(
        index: u64,
        author: &str,
        content: &str,
        content_type: &str,
        classification_score: f64,
        previous_fingerprint: Fingerprint,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut entry = Entry {
            index,
            timestamp: timestamp.trunc_subsecs(6),
            author: author.to_string(),
            content: content.to_string(),
            content_fingerprint: content_digest(content),
            content_type: content_type.to_string(),
            classification_score,
            previous_fingerprint,
            entry_fingerprint: ZERO_FINGERPRINT,
            attested_by: None,
        };
        entry.entry_fingerprint = entry.recompute_fingerprint();
        entry
    }

    /// Deterministic JSON encoding of the digested fields: sorted keys, no
    /// whitespace, lowercase hex, RFC 3339 timestamp with microseconds.
    pub fn canonical_encoding(&self) -> String {
        let fields = CanonicalFields {
            author: &self.author,
            classification_score: self.classification_score,
            content_fingerprint: fingerprint_to_hex(&self.content_fingerprint),
            content_type: &self.content_type,
            index: self.index,
            previous_fingerprint: fingerprint_to_hex(&self.previous_fingerprint),
            timestamp: format_timestamp(&self.timestamp),
        };
        // Serializing a flat struct of strings and numbers cannot fail.
        serde_json::to_string(&fields).unwrap_or_default()
    }

    /// Digest of the entry's current field values.
    pub fn recompute_fingerprint(&self) -> Fingerprint {
        Sha256::digest(self.canonical_encoding().as_bytes()).into()
    }

    /// True when the stored fingerprint no longer matches the fields.
    pub fn is_tampered(&self) -> bool {
        self.entry_fingerprint != self.recompute_fingerprint()
    }

    /// Re-digests `content` and compares it with `content_fingerprint`.
    /// Not part of [`Entry::is_tampered`]; audit tooling uses it to tell a
    /// content edit apart from a fingerprint edit.
    pub fn content_matches_fingerprint(&self) -> bool {
        content_digest(&self.content) == self.content_fingerprint
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn content_fingerprint(&self) -> &Fingerprint {
        &self.content_fingerprint
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn classification_score(&self) -> f64 {
        self.classification_score
    }

    pub fn previous_fingerprint(&self) -> &Fingerprint {
        &self.previous_fingerprint
    }

    pub fn entry_fingerprint(&self) -> &Fingerprint {
        &self.entry_fingerprint
    }

    pub fn attested_by(&self) -> Option<&str> {
        self.attested_by.as_deref()
    }

    pub fn is_attested(&self) -> bool {
        self.attested_by.is_some()
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    pub fn to_view(&self) -> EntryView {
        EntryView::from(self)
    }
}

/// Read-only export shape of an [`Entry`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryView {
    pub index: u64,
    pub timestamp: String,
    pub author: String,
    pub content: String,
    pub content_fingerprint: String,
    pub content_type: String,
    pub classification_score: f64,
    pub previous_fingerprint: String,
    pub entry_fingerprint: String,
    pub attested_by: Option<String>,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        EntryView {
            index: entry.index,
            timestamp: format_timestamp(&entry.timestamp),
            author: entry.author.clone(),
            content: entry.content.clone(),
            content_fingerprint: fingerprint_to_hex(&entry.content_fingerprint),
            content_type: entry.content_type.clone(),
            classification_score: entry.classification_score,
            previous_fingerprint: fingerprint_to_hex(&entry.previous_fingerprint),
            entry_fingerprint: fingerprint_to_hex(&entry.entry_fingerprint),
            attested_by: entry.attested_by.clone(),
        }
    }
}

/// Rebuilds an entry exactly as exported. Digests are decoded, never
/// recomputed, so a tampered export stays tampered.
impl TryFrom<EntryView> for Entry {
    type Error = LedgerError;

    fn try_from(view: EntryView) -> Result<Self> {
        if !view.classification_score.is_finite() {
            return Err(LedgerError::Serialization(format!(
                "Entry #{} has a non-finite classification score",
                view.index
            )));
        }
        Ok(Entry {
            index: view.index,
            timestamp: parse_timestamp(&view.timestamp)?,
            author: view.author,
            content: view.content,
            content_fingerprint: fingerprint_from_hex(&view.content_fingerprint)?,
            content_type: view.content_type,
            classification_score: view.classification_score,
            previous_fingerprint: fingerprint_from_hex(&view.previous_fingerprint)?,
            entry_fingerprint: fingerprint_from_hex(&view.entry_fingerprint)?,
            attested_by: view.attested_by,
        })
    }
}
