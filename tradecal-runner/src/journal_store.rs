//! File-backed trade journal.
//!
//! Entries are appended as plain text, one record per save. Each append is
//! a scoped open/write/flush; the handle is dropped before returning on
//! every path. Single-user, single-process: no locking.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;
use tradecal_core::journal::{
    format_entry, parse_journal, JournalEntry, JournalError, NoteSink, NoteSource, PLACEHOLDER,
};

#[derive(Debug, Clone)]
pub struct JournalFile {
    path: PathBuf,
}

impl JournalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Raw journal text, `None` when nothing has been written yet.
    fn read_text(&self) -> Result<Option<String>, JournalError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every parseable entry, in file order.
    pub fn entries(&self) -> Result<Vec<JournalEntry>, JournalError> {
        Ok(self
            .read_text()?
            .map(|t| parse_journal(&t))
            .unwrap_or_default())
    }

    /// Entries saved for one trade.
    pub fn entries_for(
        &self,
        date: NaiveDate,
        symbol: &str,
    ) -> Result<Vec<JournalEntry>, JournalError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.date == date && e.symbol == symbol)
            .collect())
    }

    /// Replace the journal with the contents of `source`.
    pub fn replace_with(&self, source: &Path) -> Result<u64, JournalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = fs::copy(source, &self.path)?;
        info!(
            from = %source.display(),
            to = %self.path.display(),
            bytes,
            "journal imported"
        );
        Ok(bytes)
    }

    /// Write the journal text (or the placeholder) to `dest`.
    pub fn export_to(&self, dest: &Path) -> Result<(), JournalError> {
        let text = self.read_all()?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, text)?;
        Ok(())
    }
}

impl NoteSink for JournalFile {
    fn append(&mut self, entry: &JournalEntry) -> Result<(), JournalError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.write_all(format_entry(entry).as_bytes())?;
        file.flush()?;

        info!(
            path = %self.path.display(),
            date = %entry.date,
            symbol = %entry.symbol,
            "journal entry saved"
        );
        Ok(())
    }
}

impl NoteSource for JournalFile {
    fn read_all(&self) -> Result<String, JournalError> {
        Ok(self
            .read_text()?
            .unwrap_or_else(|| PLACEHOLDER.to_string()))
    }
}
