//! TradeCal Core: fill normalization, daily P&L aggregation, calendar model, journal format.
//!
//! This crate is the pure engine behind the tool:
//! - Domain types (fills, trade summaries, diagnostics)
//! - CSV ingest with schema checks and per-row normalization
//! - Aggregation of fills into daily P&L and per-symbol summaries
//! - Batch fingerprinting
//! - Month calendar model and the plain-text journal format
//!
//! Nothing here touches the filesystem; file-backed stores live in the runner.

pub mod calendar;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod journal;
