use std::fs;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wikigit_core::ArticleRecord;
use wikigit_engine::{Ledger, LEDGER_FILENAME};

fn record(name: &str, stored: usize) -> ArticleRecord {
    ArticleRecord {
        stored_revisions: stored,
        last_import: Some(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()),
        ..ArticleRecord::new(name, "de", format!("https://de.wikipedia.org/wiki/{name}"))
    }
}

#[test]
fn missing_file_is_an_empty_ledger() {
    let temp = TempDir::new().unwrap();
    let ledger = Ledger::load(temp.path());
    assert!(ledger.records().is_empty());
}

#[test]
fn saved_records_load_back() {
    let temp = TempDir::new().unwrap();
    let mut ledger = Ledger::load(temp.path());
    ledger.upsert(record("Wissen", 42));
    ledger.upsert(record("Berlin", 7));
    let path = ledger.save().unwrap();
    assert_eq!(path, temp.path().join(LEDGER_FILENAME));

    let loaded = Ledger::load(temp.path());
    assert_eq!(loaded.records(), &[record("Wissen", 42), record("Berlin", 7)]);
}

#[test]
fn upsert_replaces_by_url() {
    let temp = TempDir::new().unwrap();
    let mut ledger = Ledger::load(temp.path());
    ledger.upsert(record("Wissen", 42));
    ledger.upsert(record("Wissen", 50));

    assert_eq!(ledger.records().len(), 1);
    let stored = ledger
        .get("https://de.wikipedia.org/wiki/Wissen")
        .map(|r| r.stored_revisions);
    assert_eq!(stored, Some(50));
}

#[test]
fn unreadable_ledger_starts_over() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(LEDGER_FILENAME), "(articles: [garbage").unwrap();

    let mut ledger = Ledger::load(temp.path());
    assert!(ledger.records().is_empty());
    ledger.upsert(record("Wissen", 1));
    ledger.save().unwrap();
    assert_eq!(Ledger::load(temp.path()).records().len(), 1);
}
