//! Batch fingerprinting: a deterministic BLAKE3 digest over accepted fills.
//!
//! Two uploads with the same accepted rows in the same order produce the
//! same fingerprint. The source label and line number are left out, so
//! renaming an export file does not change it.

use crate::domain::Fill;

/// Hex-encoded BLAKE3 hash of the fills, in order.
pub fn fingerprint_fills(fills: &[Fill]) -> String {
    let mut hasher = blake3::Hasher::new();

    for fill in fills {
        hasher.update(fill.symbol.as_bytes());
        hasher.update(&[0]);
        hasher.update(fill.side.to_string().as_bytes());
        hasher.update(fill.filled_time.to_string().as_bytes());
        hasher.update(&fill.filled.to_le_bytes());
        hasher.update(&fill.avg_price.to_le_bytes());
        hasher.update(&fill.total_qty.to_le_bytes());
        hasher.update(fill.name.as_bytes());
        hasher.update(&[0xff]);
    }

    hasher.finalize().to_hex().to_string()
}
