//! Aggregation engine and batch report

pub mod aggregate;
pub mod report;

pub use aggregate::{aggregate, aggregate_with_diagnostics, AggregateOptions, Aggregation, GroupBy};
pub use report::{BatchReport, SCHEMA_VERSION};
