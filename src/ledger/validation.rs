//! Whole-chain integrity checks.

use super::entry::{Entry, ZERO_FINGERPRINT};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// Stored `entry_fingerprint` differs from the recomputed digest.
    HashMismatch,
    /// `previous_fingerprint` does not match the predecessor (or the zero
    /// sentinel for genesis).
    LinkBroken,
    /// `index` differs from the entry's position.
    IndexGap,
    /// `content` no longer digests to `content_fingerprint`. The entry digest
    /// does not cover `content`, so only [`audit_entries`] reports this.
    ContentMismatch,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::HashMismatch => "hash-mismatch",
            ViolationKind::LinkBroken => "link-broken",
            ViolationKind::IndexGap => "index-gap",
            ViolationKind::ContentMismatch => "content-mismatch",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a broken invariant in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub index: u64,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "entry #{} {}", self.index, self.kind)
    }
}

/// Outcome of [`validate_entries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Valid,
    Corrupted(Violation),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    pub fn violation(&self) -> Option<Violation> {
        match self {
            Validation::Valid => None,
            Validation::Corrupted(violation) => Some(*violation),
        }
    }

    pub fn into_result(self) -> Result<(), LedgerError> {
        match self {
            Validation::Valid => Ok(()),
            Validation::Corrupted(violation) => Err(LedgerError::ChainCorrupted(violation)),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Validation::Valid => "Chain integrity verified".to_string(),
            Validation::Corrupted(v) => match v.kind {
                ViolationKind::HashMismatch => format!("Entry #{} hash mismatch", v.index),
                ViolationKind::LinkBroken => format!("Entry #{} previous fingerprint mismatch", v.index),
                ViolationKind::IndexGap => format!("Entry at position {} carries the wrong index", v.index),
                ViolationKind::ContentMismatch => format!("Entry #{} content does not match its fingerprint", v.index),
            },
        }
    }
}

/// Checks one entry against its position and predecessor. Digest first, then
/// linkage, then index.
fn check_entry(position: usize, entry: &Entry, previous: Option<&Entry>) -> Option<ViolationKind> {
    if entry.is_tampered() {
        return Some(ViolationKind::HashMismatch);
    }
    let expected_previous = previous.map_or(ZERO_FINGERPRINT, |p| p.entry_fingerprint);
    if entry.previous_fingerprint != expected_previous {
        return Some(ViolationKind::LinkBroken);
    }
    if entry.index != position as u64 {
        return Some(ViolationKind::IndexGap);
    }
    None
}

/// Scans the chain in order and stops at the first broken invariant.
pub fn validate_entries(entries: &[Entry]) -> Validation {
    for (position, entry) in entries.iter().enumerate() {
        let previous = position.checked_sub(1).map(|p| &entries[p]);
        if let Some(kind) = check_entry(position, entry, previous) {
            return Validation::Corrupted(Violation { index: position as u64, kind });
        }
    }
    Validation::Valid
}

/// Like [`validate_entries`] but keeps going, reporting at most one violation
/// per entry. Also re-digests `content`, which the fail-fast check never does.
pub fn audit_entries(entries: &[Entry]) -> Vec<Violation> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(position, entry)| {
            let previous = position.checked_sub(1).map(|p| &entries[p]);
            check_entry(position, entry, previous)
                .or_else(|| (!entry.content_matches_fingerprint()).then_some(ViolationKind::ContentMismatch))
                .map(|kind| Violation { index: position as u64, kind })
        })
        .collect()
}
