//! Terminal rendering of ledger entries. Read-only.

use crate::classifier::{ClassificationResult, ConfidenceTier};
use crate::ledger::{fingerprint_to_hex, format_timestamp, Entry, Ledger, ProvenanceRecord, Validation};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};

const HASH_DISPLAY_LEN: usize = 24;
const BAR_CELLS: usize = 10;

pub fn short(value: &str, size: usize) -> String {
    if value.chars().count() <= size {
        value.to_string()
    } else {
        format!("{}...", value.chars().take(size).collect::<String>())
    }
}

/// Ten-cell bar, one filled cell per 0.1 of score.
pub fn score_bar(score: f64) -> String {
    let filled = ((score.clamp(0.0, 1.0) * BAR_CELLS as f64) as usize).min(BAR_CELLS);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_CELLS - filled))
}

/// "tampered" when the entry digest fails, "content altered" when only the
/// content digest does, otherwise "intact".
pub fn integrity_status(entry: &Entry) -> &'static str {
    if entry.is_tampered() {
        "tampered"
    } else if !entry.content_matches_fingerprint() {
        "content altered"
    } else {
        "intact"
    }
}

fn integrity_label(entry: &Entry) -> ColoredString {
    match integrity_status(entry) {
        "intact" => "intact".green(),
        status => status.red().bold(),
    }
}

pub fn render_entry(entry: &Entry) -> String {
    let attested = entry.attested_by().unwrap_or("pending");
    format!(
        "{}\n  author: {}\n  timestamp: {}\n  type: {}\n  score: {:.2} {}\n  attested_by: {}\n  content_fingerprint: {}\n  previous_fingerprint: {}\n  entry_fingerprint: {}\n  integrity: {}\n",
        if entry.is_genesis() {
            format!("Entry #{} (genesis)", entry.index()).bold()
        } else {
            format!("Entry #{}", entry.index()).bold()
        },
        entry.author(),
        format_timestamp(&entry.timestamp()),
        entry.content_type(),
        entry.classification_score(),
        score_bar(entry.classification_score()),
        attested,
        short(&fingerprint_to_hex(entry.content_fingerprint()), HASH_DISPLAY_LEN).magenta(),
        short(&fingerprint_to_hex(entry.previous_fingerprint()), HASH_DISPLAY_LEN).magenta(),
        short(&fingerprint_to_hex(entry.entry_fingerprint()), HASH_DISPLAY_LEN).cyan(),
        integrity_label(entry),
    )
}

pub fn render_validation(validation: &Validation) -> String {
    let message = validation.message();
    let status = if validation.is_valid() { message.green() } else { message.red() };
    format!("{} {}", "Integrity Check:".bold(), status)
}

pub fn render_chain(ledger: &Ledger) -> String {
    let header = format!(
        "{}\nChain length: {}\n",
        "TruthChain Dashboard".bold().cyan(),
        ledger.len()
    );
    let body = ledger
        .entries()
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n{}\n{}", header, body, render_validation(&ledger.validate()))
}

pub fn chain_table(ledger: &Ledger) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("Author").add_attribute(Attribute::Bold),
            Cell::new("Type").add_attribute(Attribute::Bold),
            Cell::new("Score").add_attribute(Attribute::Bold),
            Cell::new("Attested by").add_attribute(Attribute::Bold),
            Cell::new("Fingerprint").add_attribute(Attribute::Bold),
            Cell::new("Integrity").add_attribute(Attribute::Bold),
        ]);

    for entry in ledger.entries() {
        let integrity = integrity_status(&entry);
        let color = if integrity == "intact" { TableColor::Green } else { TableColor::Red };
        let attested_color = if entry.is_attested() { TableColor::Green } else { TableColor::Yellow };
        table.add_row(vec![
            Cell::new(entry.index()),
            Cell::new(entry.author()),
            Cell::new(entry.content_type()),
            Cell::new(format!("{:.2}", entry.classification_score())),
            Cell::new(entry.attested_by().unwrap_or("pending")).fg(attested_color),
            Cell::new(short(&fingerprint_to_hex(entry.entry_fingerprint()), 16)),
            Cell::new(integrity).fg(color),
        ]);
    }
    table
}

pub fn render_classification(result: &ClassificationResult) -> String {
    let tier = match result.tier {
        ConfidenceTier::VeryHigh => result.tier.to_string().red(),
        ConfidenceTier::High => result.tier.to_string().yellow(),
        ConfidenceTier::Medium => result.tier.to_string().cyan(),
        ConfidenceTier::Low | ConfidenceTier::VeryLow => result.tier.to_string().green(),
    };
    format!(
        "  AI score:    {:>6.2}% {}\n  Human score: {:>6.2}% {}\n  Confidence:  {}\n  Verdict:     {}\n  Label:       {}\n  Why:         {}\n",
        result.score * 100.0,
        score_bar(result.score),
        result.human_score() * 100.0,
        score_bar(result.human_score()),
        tier,
        result.tier.verdict(),
        result.label,
        result.explanation,
    )
}

pub fn render_provenance(record: &ProvenanceRecord) -> String {
    let integrity = if record.tamper_proof { "intact".green() } else { "tampered".red() };
    format!(
        "{}\n  author: {}\n  timestamp: {}\n  type: {}\n  score: {:.2}\n  attested_by: {}\n  content_fingerprint: {}\n  integrity: {}\n",
        format!("Provenance of entry #{}", record.index).bold(),
        record.author,
        record.timestamp,
        record.content_type,
        record.classification_score,
        record.attested_by.as_deref().unwrap_or("pending"),
        short(&record.content_fingerprint, HASH_DISPLAY_LEN),
        integrity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::DEFAULT_AI_THRESHOLD;

    #[test]
    fn test_short() {
        assert_eq!(short("abcdef", 10), "abcdef");
        assert_eq!(short("abcdefghijkl", 4), "abcd...");
    }

    #[test]
    fn test_score_bar() {
        assert_eq!(score_bar(0.0), "░░░░░░░░░░");
        assert_eq!(score_bar(0.55), "█████░░░░░");
        assert_eq!(score_bar(1.0), "██████████");
        assert_eq!(score_bar(3.0), "██████████");
    }

    #[test]
    fn test_render_chain_mentions_every_entry() {
        let ledger = Ledger::new();
        ledger.append("Alice", "Flood report", "human-written", 0.1).unwrap();
        let rendered = render_chain(&ledger);
        assert!(rendered.contains("Entry #0"));
        assert!(rendered.contains("Entry #1"));
        assert!(rendered.contains("Alice"));
        assert!(rendered.contains("Chain integrity verified"));

        let table = chain_table(&ledger).to_string();
        assert!(table.contains("Alice"));
        assert!(table.contains("pending"));
    }

    #[test]
    fn test_content_edit_is_flagged() {
        let ledger = Ledger::new();
        ledger.append("Alice", "Flood report", "human-written", 0.1).unwrap();
        ledger.append("Bob", "In conclusion, overall", "ai-generated", 0.9).unwrap();
        ledger
            .raw_entry_mut(2, |raw| {
                raw.set_content("Deepfake payload");
            })
            .unwrap();

        let entries = ledger.entries();
        assert_eq!(integrity_status(&entries[1]), "intact");
        assert_eq!(integrity_status(&entries[2]), "content altered");
        assert!(render_entry(&entries[2]).contains("content altered"));
        assert!(render_entry(&entries[0]).contains("(genesis)"));
        let table = chain_table(&ledger);
        let row = table.row(2).unwrap();
        assert!(row.cell_iter().any(|cell| cell.content() == "content altered"));
        assert!(render_provenance(&ledger.provenance(2).unwrap()).contains("tampered"));
    }

    #[test]
    fn test_render_classification() {
        let result = ClassificationResult::from_score(0.9, DEFAULT_AI_THRESHOLD);
        let rendered = render_classification(&result);
        assert!(rendered.contains("Almost Certainly AI-Generated"));
        assert!(rendered.contains("ai-generated"));
    }
}
