//! Row-level diagnostics: rows that were excluded, or kept but flagged.

use super::fill::SourceRef;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Why a single export row could not become a canonical fill.
///
/// Row errors never abort a batch. The row is dropped from every total and
/// reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum RowError {
    #[error("cannot parse {column} value {value:?}")]
    FieldParse { column: String, value: String },

    #[error("instrument name {name:?} has fewer than 3 tokens, no strike to extract")]
    InstrumentFormat { name: String },
}

impl RowError {
    pub fn field(column: &str, value: &str) -> Self {
        RowError::FieldParse {
            column: column.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Row was kept; something about it deserves a look.
    Warning,
    /// Row was excluded from all sums.
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    Excluded(RowError),
    /// Neither `Call` nor `Put` appears in the name; classified as `Put`.
    UnclassifiedOptionType { name: String },
    /// A later row for an already-seen symbol carries another contract.
    /// Its numbers were accumulated under the first row's strike/type.
    ContractMismatch {
        symbol: String,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub origin: SourceRef,
    pub symbol: Option<String>,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    pub fn excluded(origin: SourceRef, symbol: Option<String>, error: RowError) -> Self {
        Self {
            origin,
            symbol,
            kind: DiagnosticKind::Excluded(error),
        }
    }

    pub fn severity(&self) -> Severity {
        match self.kind {
            DiagnosticKind::Excluded(_) => Severity::Error,
            DiagnosticKind::UnclassifiedOptionType { .. }
            | DiagnosticKind::ContractMismatch { .. } => Severity::Warning,
        }
    }

    pub fn is_excluded(&self) -> bool {
        self.severity() == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.origin)?;
        if let Some(symbol) = &self.symbol {
            write!(f, " [{symbol}]")?;
        }
        match &self.kind {
            DiagnosticKind::Excluded(err) => write!(f, " excluded: {err}"),
            DiagnosticKind::UnclassifiedOptionType { name } => {
                write!(f, " no Call/Put in {name:?}, classified as Put")
            }
            DiagnosticKind::ContractMismatch {
                symbol,
                expected,
                found,
            } => write!(
                f,
                " {symbol} traded as {found} but summarized as {expected}"
            ),
        }
    }
}
