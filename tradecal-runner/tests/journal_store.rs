use chrono::NaiveDate;
use tradecal_core::domain::{OptionType, Side};
use tradecal_core::journal::{JournalEntry, NoteSink, NoteSource, PLACEHOLDER, SEPARATOR};
use tradecal_runner::JournalFile;

fn entry(symbol: &str, day: u32, notes: &str) -> JournalEntry {
    JournalEntry {
        date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
        symbol: symbol.to_string(),
        action: Side::Buy,
        avg_buy_price: 150.0,
        avg_sell_price: 200.0,
        quantity: 1.0,
        pnl: 50.0,
        strike: "150".to_string(),
        option_type: OptionType::Call,
        notes: notes.to_string(),
    }
}

#[test]
fn test_missing_journal_reads_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let journal = JournalFile::new(dir.path().join("trade_journal.txt"));

    assert!(!journal.exists());
    assert_eq!(journal.read_all().unwrap(), PLACEHOLDER);
    assert!(journal.entries().unwrap().is_empty());
}

#[test]
fn test_append_creates_parent_and_accumulates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes").join("trade_journal.txt");
    let mut journal = JournalFile::new(&path);

    journal.append(&entry("AAPL", 1, "first")).unwrap();
    journal.append(&entry("SPY", 1, "second")).unwrap();
    journal.append(&entry("AAPL", 4, "third")).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.matches(SEPARATOR).count(), 3);
    assert!(text.starts_with("Date: 2024-03-01\nSymbol: AAPL\nAction: Buy\n"));
    assert_eq!(journal.read_all().unwrap(), text);

    let entries = journal.entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[2].notes, "third");

    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    let aapl = journal.entries_for(date, "AAPL").unwrap();
    assert_eq!(aapl.len(), 1);
    assert_eq!(aapl[0].notes, "first");
}

#[test]
fn test_append_after_reopen_keeps_existing_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trade_journal.txt");

    JournalFile::new(&path).append(&entry("AAPL", 1, "one")).unwrap();
    JournalFile::new(&path).append(&entry("AAPL", 1, "two")).unwrap();

    let notes: Vec<String> = JournalFile::new(&path)
        .entries()
        .unwrap()
        .into_iter()
        .map(|e| e.notes)
        .collect();
    assert_eq!(notes, vec!["one", "two"]);
}

#[test]
fn test_import_replaces_and_export_copies() {
    let dir = tempfile::tempdir().unwrap();
    let mut journal = JournalFile::new(dir.path().join("trade_journal.txt"));
    journal.append(&entry("AAPL", 1, "old")).unwrap();

    let upload = dir.path().join("upload.txt");
    let mut other = JournalFile::new(&upload);
    other.append(&entry("TSLA", 5, "imported")).unwrap();

    journal.replace_with(&upload).unwrap();
    let entries = journal.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].symbol, "TSLA");

    let download = dir.path().join("out").join("journal.txt");
    journal.export_to(&download).unwrap();
    assert_eq!(
        std::fs::read_to_string(&download).unwrap(),
        journal.read_all().unwrap()
    );
}

#[test]
fn test_export_of_missing_journal_writes_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let journal = JournalFile::new(dir.path().join("absent.txt"));
    let download = dir.path().join("journal.txt");

    journal.export_to(&download).unwrap();
    assert_eq!(std::fs::read_to_string(&download).unwrap(), PLACEHOLDER);
}
