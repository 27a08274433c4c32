//! Out-of-band entry mutation.
//!
//! Nothing here is part of the supported ledger API. It exists so tamper
//! scenarios can be staged: every setter writes straight into the stored
//! entry and bypasses all invariant checks. Compiled only for tests or with
//! the `tamper` feature.

use super::chain::Ledger;
use super::entry::{content_digest, Entry, Fingerprint};
use crate::error::{LedgerError, Result};
use tracing::warn;

/// Mutable handle on a stored entry.
pub struct RawEntry<'a> {
    entry: &'a mut Entry,
}

impl RawEntry<'_> {
    pub fn index(&self) -> u64 {
        self.entry.index
    }

    /// Replaces `content` only. The stored `content_fingerprint` stays stale.
    pub fn set_content(&mut self, content: &str) -> &mut Self {
        self.entry.content = content.to_string();
        self
    }

    pub fn set_content_fingerprint(&mut self, fingerprint: Fingerprint) -> &mut Self {
        self.entry.content_fingerprint = fingerprint;
        self
    }

    /// Replaces `content` and rewrites `content_fingerprint` to match it.
    pub fn rewrite_content(&mut self, content: &str) -> &mut Self {
        self.entry.content = content.to_string();
        self.entry.content_fingerprint = content_digest(content);
        self
    }

    pub fn set_author(&mut self, author: &str) -> &mut Self {
        self.entry.author = author.to_string();
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.entry.content_type = content_type.to_string();
        self
    }

    pub fn set_classification_score(&mut self, score: f64) -> &mut Self {
        self.entry.classification_score = score;
        self
    }

    pub fn set_previous_fingerprint(&mut self, fingerprint: Fingerprint) -> &mut Self {
        self.entry.previous_fingerprint = fingerprint;
        self
    }

    pub fn set_entry_fingerprint(&mut self, fingerprint: Fingerprint) -> &mut Self {
        self.entry.entry_fingerprint = fingerprint;
        self
    }

    pub fn set_attested_by(&mut self, attested_by: Option<&str>) -> &mut Self {
        self.entry.attested_by = attested_by.map(str::to_string);
        self
    }

    /// Recomputes `entry_fingerprint` from the current fields, making the
    /// entry self-consistent again.
    pub fn reseal(&mut self) -> &mut Self {
        self.entry.entry_fingerprint = self.entry.recompute_fingerprint();
        self
    }
}

impl Ledger {
    /// Runs `f` against the stored entry at `index` under the write lock.
    pub fn raw_entry_mut<R>(&self, index: u64, f: impl FnOnce(&mut RawEntry<'_>) -> R) -> Result<R> {
        let position = usize::try_from(index).map_err(|_| LedgerError::NotFound(index))?;
        let mut entries = self.entries_mut();
        let entry = entries.get_mut(position).ok_or(LedgerError::NotFound(index))?;
        warn!(index, "Raw entry mutation");
        let mut raw = RawEntry { entry };
        Ok(f(&mut raw))
    }
}
