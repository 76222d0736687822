//! Batch loading: broker export files on disk to one ingested batch.
//!
//! Files are read in argument order and concatenated without dedup. Any
//! unreadable file or schema failure aborts the whole batch.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use tradecal_core::data::{ingest_csv, IngestedBatch, NormalizeOptions, Normalizer, SchemaError};
use tradecal_core::domain::{Diagnostic, Fill};
use tradecal_core::fingerprint::fingerprint_fills;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {source}")]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("no input files given")]
    NoInput,
}

/// Every accepted fill from the input files plus what was dropped on the way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadedBatch {
    pub fills: Vec<Fill>,
    pub diagnostics: Vec<Diagnostic>,
    pub rows_read: usize,
    /// BLAKE3 over the accepted fills (see [`fingerprint_fills`]).
    pub fingerprint: String,
}

impl LoadedBatch {
    pub fn excluded_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_excluded()).count()
    }

    /// Split into the engine's ingest shape and the fingerprint already
    /// computed for it.
    pub fn into_parts(self) -> (IngestedBatch, String) {
        let batch = IngestedBatch {
            fills: self.fills,
            diagnostics: self.diagnostics,
            rows_read: self.rows_read,
        };
        (batch, self.fingerprint)
    }
}

/// Label used for a file's rows in diagnostics: its file name, or the
/// full path when it has none.
fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Load every export in `paths`.
pub fn load_batch<P: AsRef<Path>>(
    paths: &[P],
    options: &NormalizeOptions,
) -> Result<LoadedBatch, LoadError> {
    if paths.is_empty() {
        return Err(LoadError::NoInput);
    }

    let normalizer = Normalizer::new(options.clone());
    let mut batch = IngestedBatch::default();

    for path in paths {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ingested = ingest_csv(BufReader::new(file), &source_label(path), &normalizer)
            .map_err(|source| LoadError::Schema {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            rows = ingested.rows_read,
            fills = ingested.fills.len(),
            excluded = ingested.excluded_count(),
            "loaded export"
        );
        batch.extend(ingested);
    }

    let fingerprint = fingerprint_fills(&batch.fills);
    Ok(LoadedBatch {
        fills: batch.fills,
        diagnostics: batch.diagnostics,
        rows_read: batch.rows_read,
        fingerprint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_label_uses_file_name() {
        assert_eq!(source_label(Path::new("/tmp/exports/orders.csv")), "orders.csv");
    }

    #[test]
    fn test_empty_path_list_is_rejected() {
        let paths: [&Path; 0] = [];
        let err = load_batch(&paths, &NormalizeOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::NoInput));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load_batch(&["/nonexistent/orders.csv"], &NormalizeOptions::default())
            .unwrap_err();
        match err {
            LoadError::Io { path, .. } => assert_eq!(path, PathBuf::from("/nonexistent/orders.csv")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
