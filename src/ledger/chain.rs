use super::entry::{content_type, Entry, EntryView, Fingerprint, ZERO_FINGERPRINT};
use super::validation::{audit_entries, validate_entries, Validation, Violation};
use crate::clock::{Clock, SystemClock};
use crate::error::{LedgerError, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const DEFAULT_SYSTEM_IDENTITY: &str = "system";
pub const DEFAULT_GENESIS_AUTHOR: &str = "TruthChain System";
pub const DEFAULT_GENESIS_CONTENT: &str = "Genesis Block - TruthChain Initialized";

/// Fields of the genesis entry and the identity that pre-attests it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisSpec {
    pub author: String,
    pub content: String,
    pub system_identity: String,
}

impl Default for GenesisSpec {
    fn default() -> Self {
        Self {
            author: DEFAULT_GENESIS_AUTHOR.to_string(),
            content: DEFAULT_GENESIS_CONTENT.to_string(),
            system_identity: DEFAULT_SYSTEM_IDENTITY.to_string(),
        }
    }
}

/// What an end user sees when asking where a piece of content came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvenanceRecord {
    pub index: u64,
    pub author: String,
    pub timestamp: String,
    pub content_type: String,
    pub classification_score: f64,
    pub attested_by: Option<String>,
    pub tamper_proof: bool,
    pub content_fingerprint: String,
}

/// Append-only, hash-chained ledger of provenance entries.
///
/// `append` and `attest` hold the write lock for their whole check-and-modify
/// sequence; every other operation reads under the shared lock. Entries are
/// fully built before they are pushed, so readers never see a partial one.
pub struct Ledger {
    entries: RwLock<Vec<Entry>>,
    clock: Arc<dyn Clock>,
    system_identity: String,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("len", &self.len())
            .field("system_identity", &self.system_identity)
            .finish_non_exhaustive()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create a new `Ledger` stamped by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a new `Ledger` whose timestamps come from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let spec = GenesisSpec::default();
        let genesis = Self::create_genesis_entry(&spec, clock.as_ref());
        Self::from_genesis(genesis, spec.system_identity, clock)
    }

    /// Create a new `Ledger` with a custom genesis entry.
    pub fn with_genesis(spec: GenesisSpec, clock: Arc<dyn Clock>) -> Result<Self> {
        if spec.system_identity.trim().is_empty() {
            return Err(LedgerError::InvalidInput("system identity must not be empty".to_string()));
        }
        // Run the regular input checks before sealing.
        Entry::new(0, &spec.author, &spec.content, content_type::SYSTEM, 0.0, ZERO_FINGERPRINT, clock.now())?;
        let genesis = Self::create_genesis_entry(&spec, clock.as_ref());
        Ok(Self::from_genesis(genesis, spec.system_identity, clock))
    }

    fn create_genesis_entry(spec: &GenesisSpec, clock: &dyn Clock) -> Entry {
        let mut genesis = Entry::seal(
            0,
            &spec.author,
            &spec.content,
            content_type::SYSTEM,
            0.0,
            ZERO_FINGERPRINT,
            clock.now(),
        );
        genesis.attested_by = Some(spec.system_identity.clone());
        genesis
    }

    fn from_genesis(genesis: Entry, system_identity: String, clock: Arc<dyn Clock>) -> Self {
        info!(
            fingerprint = %hex::encode(genesis.entry_fingerprint),
            "TruthChain ledger initialized"
        );
        Ledger {
            entries: RwLock::new(vec![genesis]),
            clock,
            system_identity,
        }
    }

    /// Rebuild a ledger from an export without recomputing any digest, so
    /// that [`Ledger::validate`] reports what was actually exported.
    pub fn from_export(views: Vec<EntryView>, clock: Arc<dyn Clock>) -> Result<Self> {
        if views.is_empty() {
            return Err(LedgerError::Serialization("Export contains no entries".to_string()));
        }
        let entries = views.into_iter().map(Entry::try_from).collect::<Result<Vec<_>>>()?;
        let system_identity = entries[0]
            .attested_by
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_IDENTITY.to_string());
        debug!(entries = entries.len(), "Ledger restored from export");
        Ok(Ledger {
            entries: RwLock::new(entries),
            clock,
            system_identity,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let views: Vec<EntryView> = serde_json::from_str(json)?;
        Self::from_export(views, Arc::new(SystemClock))
    }

    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| LedgerError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    pub fn system_identity(&self) -> &str {
        &self.system_identity
    }

    /// Number of entries, genesis included. Never zero.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Copy of the most recent entry.
    pub fn latest(&self) -> Entry {
        let entries = self.entries.read();
        entries[entries.len() - 1].clone()
    }

    pub fn append(&self, author: &str, content: &str, content_type: &str, classification_score: f64) -> Result<Entry> {
        let mut entries = self.entries.write();
        let previous_fingerprint: Fingerprint = entries[entries.len() - 1].entry_fingerprint;
        let entry = Entry::new(
            entries.len() as u64,
            author,
            content,
            content_type,
            classification_score,
            previous_fingerprint,
            self.clock.now(),
        )?;
        entries.push(entry.clone());

        info!(
            index = entry.index,
            author = %entry.author,
            content_type = %entry.content_type,
            score = entry.classification_score,
            "Entry appended"
        );
        debug!(canonical = %entry.canonical_encoding(), "Entry sealed");
        Ok(entry)
    }

    /// Copy of the entry at `index`.
    pub fn get(&self, index: u64) -> Result<Entry> {
        let position = usize::try_from(index).map_err(|_| LedgerError::NotFound(index))?;
        self.entries.read().get(position).cloned().ok_or(LedgerError::NotFound(index))
    }

    /// Records `attester` as the verifier of entry `index`. The first failing
    /// check wins: genesis, missing entry, empty attester, already attested,
    /// then entries that fail their own digest check.
    pub fn attest(&self, index: u64, attester: &str) -> Result<()> {
        if index == 0 {
            warn!(attester, "Attestation of genesis refused");
            return Err(LedgerError::GenesisImmutable);
        }

        let mut entries = self.entries.write();
        let position = usize::try_from(index).map_err(|_| LedgerError::NotFound(index))?;
        let entry = entries.get_mut(position).ok_or(LedgerError::NotFound(index))?;

        if attester.trim().is_empty() {
            return Err(LedgerError::InvalidInput("attester must not be empty".to_string()));
        }

        if let Some(existing) = &entry.attested_by {
            warn!(index, attester, existing = %existing, "Entry already attested");
            return Err(LedgerError::AlreadyAttested {
                index,
                attested_by: existing.clone(),
            });
        }
        if entry.is_tampered() {
            warn!(index, attester, "Attestation refused: entry fails digest check");
            return Err(LedgerError::TamperedEntry(index));
        }

        entry.attested_by = Some(attester.to_string());
        info!(index, attester, "Entry attested");
        Ok(())
    }

    /// Fail-fast integrity check over the whole chain.
    pub fn validate(&self) -> Validation {
        let result = validate_entries(&self.entries.read());
        if let Validation::Corrupted(violation) = result {
            warn!(index = violation.index, kind = %violation.kind, "Chain validation failed");
        }
        result
    }

    /// Every violation in the chain, at most one per entry. Unlike
    /// [`Ledger::validate`] this also flags content edits the digest misses.
    pub fn audit(&self) -> Vec<Violation> {
        audit_entries(&self.entries.read())
    }

    pub fn provenance(&self, index: u64) -> Result<ProvenanceRecord> {
        let entry = self.get(index)?;
        let view = entry.to_view();
        Ok(ProvenanceRecord {
            index: view.index,
            author: view.author,
            timestamp: view.timestamp,
            content_type: view.content_type,
            classification_score: view.classification_score,
            attested_by: view.attested_by,
            tamper_proof: !entry.is_tampered() && entry.content_matches_fingerprint(),
            content_fingerprint: view.content_fingerprint,
        })
    }

    /// Snapshot of every entry in index order.
    pub fn export(&self) -> Vec<EntryView> {
        self.entries.read().iter().map(EntryView::from).collect()
    }

    /// Owned copies of every entry in index order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.read().clone()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.export())?)
    }

    /// Writes the export to a sibling temp file and renames it over `path`,
    /// so an interrupted write never leaves a truncated ledger behind.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| LedgerError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

        let json = self.to_json()?;
        let mut staged = NamedTempFile::new_in(dir)
            .map_err(|e| LedgerError::Io(format!("Failed to stage {}: {}", path.display(), e)))?;
        staged
            .write_all(json.as_bytes())
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| LedgerError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        staged
            .persist(path)
            .map_err(|e| LedgerError::Io(format!("Failed to replace {}: {}", path.display(), e.error)))?;
        info!(path = %path.display(), entries = self.len(), "Ledger exported");
        Ok(())
    }

    #[cfg(any(test, feature = "tamper"))]
    pub(crate) fn entries_mut(&self) -> parking_lot::RwLockWriteGuard<'_, Vec<Entry>> {
        self.entries.write()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{FixedClock, SteppingClock};
    use crate::ledger::validation::ViolationKind;
    use chrono::{Duration, TimeZone, Utc};

    fn test_ledger() -> Ledger {
        let start = Utc.timestamp_opt(1_672_531_200, 0).unwrap();
        Ledger::with_clock(Arc::new(SteppingClock::new(start, Duration::seconds(1))))
    }

    #[test]
    fn test_genesis_invariants() {
        let ledger = test_ledger();
        assert_eq!(ledger.len(), 1);
        let genesis = ledger.get(0).unwrap();
        assert_eq!(genesis.index(), 0);
        assert_eq!(genesis.previous_fingerprint(), &ZERO_FINGERPRINT);
        assert_eq!(genesis.attested_by(), Some(DEFAULT_SYSTEM_IDENTITY));
        assert_eq!(genesis.content_type(), content_type::SYSTEM);
        assert_eq!(genesis.classification_score(), 0.0);
        assert_eq!(genesis.author(), DEFAULT_GENESIS_AUTHOR);
        assert_eq!(ledger.validate(), Validation::Valid);
    }

    #[test]
    fn test_deterministic_genesis() {
        let clock = Arc::new(FixedClock::at_millis(1_672_531_200_000));
        let a = Ledger::with_clock(clock.clone());
        let b = Ledger::with_clock(clock);
        assert_eq!(a.latest().entry_fingerprint(), b.latest().entry_fingerprint());
    }

    #[test]
    fn test_append_links_to_latest() {
        let ledger = test_ledger();
        for n in 1..=5u64 {
            let previous = ledger.latest();
            let entry = ledger.append("Alice", &format!("claim {}", n), "human-written", 0.25).unwrap();
            assert_eq!(entry.index(), n);
            assert_eq!(entry.previous_fingerprint(), previous.entry_fingerprint());
            assert_eq!(ledger.len() as u64, n + 1);
        }
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn test_append_rejects_invalid_input_without_growing() {
        let ledger = test_ledger();
        assert!(matches!(ledger.append("", "text", "unknown", 0.5), Err(LedgerError::InvalidInput(_))));
        assert!(matches!(ledger.append("Alice", "text", "unknown", 1.5), Err(LedgerError::InvalidInput(_))));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_get_out_of_range() {
        let ledger = test_ledger();
        assert!(matches!(ledger.get(1), Err(LedgerError::NotFound(1))));
        assert!(matches!(ledger.get(u64::MAX), Err(LedgerError::NotFound(u64::MAX))));
    }

    #[test]
    fn test_attestation_is_single_use() {
        let ledger = test_ledger();
        ledger.append("Bob", "In conclusion, overall...", "ai-generated", 0.9).unwrap();
        let before = *ledger.get(1).unwrap().entry_fingerprint();

        assert!(ledger.attest(1, "X").is_ok());
        assert_eq!(
            ledger.attest(1, "Y"),
            Err(LedgerError::AlreadyAttested { index: 1, attested_by: "X".to_string() })
        );
        let entry = ledger.get(1).unwrap();
        assert_eq!(entry.attested_by(), Some("X"));
        assert_eq!(entry.entry_fingerprint(), &before);
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn test_attest_precondition_order() {
        let ledger = test_ledger();
        assert_eq!(ledger.attest(0, "anyone"), Err(LedgerError::GenesisImmutable));
        assert_eq!(ledger.attest(0, ""), Err(LedgerError::GenesisImmutable));
        assert_eq!(ledger.attest(3, "anyone"), Err(LedgerError::NotFound(3)));
        assert_eq!(ledger.attest(1, " "), Err(LedgerError::NotFound(1)));

        ledger.append("Alice", "text", "human-written", 0.1).unwrap();
        assert!(matches!(ledger.attest(1, " "), Err(LedgerError::InvalidInput(_))));
        ledger.attest(1, "X").unwrap();
        // Already attested wins over tampering.
        ledger.entries_mut()[1].author = "Mallory".to_string();
        assert!(matches!(ledger.attest(1, "Y"), Err(LedgerError::AlreadyAttested { .. })));
    }

    #[test]
    fn test_tampered_entry_cannot_be_attested() {
        let ledger = test_ledger();
        ledger.append("Alice", "text", "human-written", 0.1).unwrap();
        ledger.entries_mut()[1].content_type = "ai-generated".to_string();
        assert_eq!(ledger.attest(1, "X"), Err(LedgerError::TamperedEntry(1)));
        assert!(ledger.get(1).unwrap().attested_by().is_none());
    }

    #[test]
    fn test_export_is_a_snapshot() {
        let ledger = test_ledger();
        ledger.append("Alice", "text", "human-written", 0.1).unwrap();
        let mut views = ledger.export();
        views[1].content = "changed".to_string();
        views.push(views[0].clone());
        assert_eq!(ledger.get(1).unwrap().content(), "text");
        assert_eq!(ledger.len(), 2);
        assert!(ledger.validate().is_valid());
    }

    #[test]
    fn test_json_round_trip() {
        let ledger = test_ledger();
        ledger.append("Alice", "Flood report", "human-written", 0.1).unwrap();
        ledger.append("Bob", "In conclusion", "ai-generated", 0.9).unwrap();
        ledger.attest(1, "Dr.V").unwrap();

        let restored = Ledger::from_json(&ledger.to_json().unwrap()).unwrap();
        assert_eq!(restored.export(), ledger.export());
        assert!(restored.validate().is_valid());
        assert_eq!(restored.system_identity(), DEFAULT_SYSTEM_IDENTITY);
    }

    #[test]
    fn test_write_json_replaces_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = test_ledger();
        ledger.write_json(&path).unwrap();
        ledger.append("Alice", "Flood report", "human-written", 0.1).unwrap();
        ledger.write_json(&path).unwrap();

        let restored = Ledger::read_json(&path).unwrap();
        assert_eq!(restored.export(), ledger.export());
        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_import_keeps_tampering_visible() {
        let ledger = test_ledger();
        ledger.append("Alice", "Flood report", "human-written", 0.1).unwrap();
        let mut views = ledger.export();
        views[1].author = "Mallory".to_string();
        let restored = Ledger::from_export(views, Arc::new(SystemClock)).unwrap();
        assert_eq!(
            restored.validate().violation(),
            Some(Violation { index: 1, kind: ViolationKind::HashMismatch })
        );
    }

    #[test]
    fn test_import_rejects_empty_export() {
        assert!(matches!(Ledger::from_json("[]"), Err(LedgerError::Serialization(_))));
        assert!(matches!(Ledger::from_json("{"), Err(LedgerError::Serialization(_))));
    }

    #[test]
    fn test_provenance_record() {
        let ledger = test_ledger();
        ledger.append("Alice", "Flood report", "human-written", 0.1).unwrap();
        let record = ledger.provenance(1).unwrap();
        assert_eq!(record.author, "Alice");
        assert!(record.tamper_proof);
        assert!(record.attested_by.is_none());
        assert!(matches!(ledger.provenance(9), Err(LedgerError::NotFound(9))));
    }

    #[test]
    fn test_custom_genesis() {
        let spec = GenesisSpec {
            author: "Newsroom".to_string(),
            content: "Root of trust".to_string(),
            system_identity: "newsroom-system".to_string(),
        };
        let ledger = Ledger::with_genesis(spec, Arc::new(FixedClock::at_millis(0))).unwrap();
        assert_eq!(ledger.get(0).unwrap().attested_by(), Some("newsroom-system"));
        assert!(ledger.validate().is_valid());

        let bad = GenesisSpec { author: String::new(), ..GenesisSpec::default() };
        assert!(Ledger::with_genesis(bad, Arc::new(SystemClock)).is_err());
    }
}
