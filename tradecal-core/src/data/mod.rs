//! Export ingestion: header schema, row normalization, CSV reading

pub mod ingest;
pub mod normalize;
pub mod schema;

pub use ingest::{ingest_csv, ingest_sources, IngestedBatch};
pub use normalize::{NormalizeOptions, NormalizedRow, Normalizer};
pub use schema::{ColumnIndex, FillSchema, SchemaError};
