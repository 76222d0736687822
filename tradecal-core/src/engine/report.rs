//! BatchReport: what the aggregation boundary hands back to callers.

use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate_with_diagnostics, AggregateOptions, Aggregation};
use crate::data::IngestedBatch;
use crate::domain::Diagnostic;
use crate::fingerprint::fingerprint_fills;

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Best-effort results for one upload batch plus the rows that were
/// excluded or flagged on the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub aggregation: Aggregation,
    pub diagnostics: Vec<Diagnostic>,
    pub rows_read: usize,
    pub fill_count: usize,
    pub fingerprint: String,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BatchReport {
    /// Aggregate an ingested batch. Ingest diagnostics come first, followed
    /// by the ones raised while grouping.
    pub fn from_batch(batch: IngestedBatch, options: &AggregateOptions) -> Self {
        let fingerprint = fingerprint_fills(&batch.fills);
        Self::with_fingerprint(batch, fingerprint, options)
    }

    /// Like [`BatchReport::from_batch`], for callers that already hashed
    /// the batch's fills.
    pub fn with_fingerprint(
        batch: IngestedBatch,
        fingerprint: String,
        options: &AggregateOptions,
    ) -> Self {
        let (aggregation, grouping) = aggregate_with_diagnostics(&batch.fills, options);
        let mut diagnostics = batch.diagnostics;
        diagnostics.extend(grouping);

        Self {
            schema_version: SCHEMA_VERSION,
            aggregation,
            diagnostics,
            rows_read: batch.rows_read,
            fill_count: batch.fills.len(),
            fingerprint,
        }
    }

    pub fn excluded(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_excluded())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_excluded())
    }

    pub fn excluded_count(&self) -> usize {
        self.excluded().count()
    }
}
