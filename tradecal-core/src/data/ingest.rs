//! CSV ingestion: one or more export sources to one canonical fill sequence.

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::normalize::Normalizer;
use super::schema::{FillSchema, SchemaError};
use crate::domain::{Diagnostic, Fill, SourceRef};

/// Canonical fills from one or more sources, in source-then-row order,
/// plus every diagnostic raised while reading them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestedBatch {
    pub fills: Vec<Fill>,
    pub diagnostics: Vec<Diagnostic>,
    /// Data rows read, excluded rows included.
    pub rows_read: usize,
}

impl IngestedBatch {
    /// Concatenate another batch after this one. No dedup.
    pub fn extend(&mut self, other: IngestedBatch) {
        self.fills.extend(other.fills);
        self.diagnostics.extend(other.diagnostics);
        self.rows_read += other.rows_read;
    }

    pub fn excluded_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_excluded()).count()
    }
}

/// Read one CSV export.
///
/// A missing required column, a data row too short to hold the required
/// columns, or malformed CSV fails the whole source. Row-level coercion
/// failures are collected as diagnostics and the row is skipped.
pub fn ingest_csv<R: Read>(
    reader: R,
    source: &str,
    normalizer: &Normalizer,
) -> Result<IngestedBatch, SchemaError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = FillSchema::resolve(rdr.headers()?)?;
    let required = columns.required_width();

    let mut batch = IngestedBatch::default();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Blank trailing lines in hand-edited exports.
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }

        if record.len() < required {
            return Err(SchemaError::ShortRow {
                line,
                found: record.len(),
                required,
            });
        }

        batch.rows_read += 1;
        match normalizer.normalize(&record, &columns, SourceRef::new(source, line)) {
            Ok(row) => {
                for w in &row.warnings {
                    warn!(target: "tradecal::ingest", "{w}");
                }
                batch.diagnostics.extend(row.warnings);
                batch.fills.push(row.fill);
            }
            Err(diag) => {
                warn!(target: "tradecal::ingest", "{diag}");
                batch.diagnostics.push(diag);
            }
        }
    }

    debug!(
        source,
        rows = batch.rows_read,
        fills = batch.fills.len(),
        "ingested export"
    );
    Ok(batch)
}

/// Read several sources and concatenate them in the given order.
///
/// The first schema error aborts everything; no partial batch is returned.
pub fn ingest_sources<'a, R, I>(
    sources: I,
    normalizer: &Normalizer,
) -> Result<IngestedBatch, SchemaError>
where
    R: Read,
    I: IntoIterator<Item = (&'a str, R)>,
{
    let mut batch = IngestedBatch::default();
    for (label, reader) in sources {
        batch.extend(ingest_csv(reader, label, normalizer)?);
    }
    Ok(batch)
}
