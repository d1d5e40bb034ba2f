//! Threshold checks for lab measurements
//!
//! A test passes if and only if all four measurements fall within fixed
//! inclusive acceptance ranges. There is no weighting and no partial credit;
//! the ranges are constants.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Acceptable moisture content (%)
pub const MOISTURE_RANGE: RangeInclusive<f64> = 8.0..=12.0;

/// Minimum acceptable DNA barcode match (%)
pub const DNA_MATCH_MIN: f64 = 85.0;

/// Maximum acceptable pesticide residue (ppm)
pub const PESTICIDE_MAX: f64 = 0.50;

/// Acceptable sample temperature (deg C)
pub const TEMPERATURE_RANGE: RangeInclusive<f64> = 18.0..=25.0;

/// The four measurements recorded for a lab test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    /// Moisture content (%)
    pub moisture: f64,

    /// DNA barcode match (%)
    pub dna_match: f64,

    /// Pesticide residue (ppm)
    pub pesticide: f64,

    /// Sample temperature (deg C)
    pub temperature: f64,
}

/// A single out-of-range measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    Moisture(f64),
    DnaMatch(f64),
    Pesticide(f64),
    Temperature(f64),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Moisture(v) => write!(
                f,
                "moisture {v}% outside {}-{}%",
                MOISTURE_RANGE.start(),
                MOISTURE_RANGE.end()
            ),
            Failure::DnaMatch(v) => write!(f, "DNA match {v}% below {DNA_MATCH_MIN}%"),
            Failure::Pesticide(v) => write!(f, "pesticide {v} ppm above {PESTICIDE_MAX} ppm"),
            Failure::Temperature(v) => write!(
                f,
                "temperature {v} C outside {}-{} C",
                TEMPERATURE_RANGE.start(),
                TEMPERATURE_RANGE.end()
            ),
        }
    }
}

/// Result of evaluating measurements against the acceptance ranges
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub failures: Vec<Failure>,
}

impl Evaluation {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn verdict(&self) -> &'static str {
        if self.passed() {
            "pass"
        } else {
            "fail"
        }
    }

    /// One-line reason text, suitable for a rejection note
    pub fn summary(&self) -> String {
        if self.passed() {
            "all measurements within acceptance ranges".to_string()
        } else {
            self.failures
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        }
    }
}

/// Evaluate measurements against the fixed inclusive ranges. Any single
/// out-of-range measurement fails the whole test.
pub fn evaluate(m: &Measurements) -> Evaluation {
    let mut failures = Vec::new();

    if !MOISTURE_RANGE.contains(&m.moisture) {
        failures.push(Failure::Moisture(m.moisture));
    }
    if m.dna_match < DNA_MATCH_MIN {
        failures.push(Failure::DnaMatch(m.dna_match));
    }
    if m.pesticide > PESTICIDE_MAX {
        failures.push(Failure::Pesticide(m.pesticide));
    }
    if !TEMPERATURE_RANGE.contains(&m.temperature) {
        failures.push(Failure::Temperature(m.temperature));
    }

    Evaluation { failures }
}
