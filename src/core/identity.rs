//! Record identifiers
//!
//! Ledger records carry time-based ids with a short type prefix (`COL-`,
//! `PB-`, `LT-`, `PROD-`). Collection events additionally get a
//! human-readable batch code derived from the herb name and harvest day.

use chrono::{DateTime, Utc};

/// Record type prefixes used across the four ledgers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordPrefix {
    Collection,
    Batch,
    LabTest,
    Product,
    Qr,
    Certificate,
}

impl RecordPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordPrefix::Collection => "COL",
            RecordPrefix::Batch => "PB",
            RecordPrefix::LabTest => "LT",
            RecordPrefix::Product => "PROD",
            RecordPrefix::Qr => "QR",
            RecordPrefix::Certificate => "CERT",
        }
    }
}

impl std::fmt::Display for RecordPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generate a time-based record id, bumping the millisecond suffix until it
/// is distinct from every id the `taken` predicate knows about.
pub fn next_id<F>(prefix: RecordPrefix, now: DateTime<Utc>, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("{}-{}", prefix.as_str(), millis);
        if !taken(&candidate) {
            return candidate;
        }
        millis += 1;
    }
}

/// Derive the batch code for a collection event: the first three letters of
/// the herb name uppercased, the harvest day, and a four-digit time suffix
/// (e.g. `ASH-20260830-4821`).
pub fn batch_code(herb_name: &str, now: DateTime<Utc>) -> String {
    let code: String = herb_name
        .trim()
        .chars()
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!(
        "{}-{}-{:04}",
        code,
        now.format("%Y%m%d"),
        now.timestamp_millis().rem_euclid(10_000)
    )
}
