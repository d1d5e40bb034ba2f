//! Lab test - quality measurements recorded against a processing batch

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::quality::Measurements;
use crate::entities::ValidationError;

/// Status of a lab test
///
/// A test is `pending` until its measurements are evaluated, `tested` once
/// the threshold verdict is recorded, and finally `approved` or `rejected`
/// by the analyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Pending,
    Tested,
    Approved,
    Rejected,
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestStatus::Pending => write!(f, "pending"),
            TestStatus::Tested => write!(f, "tested"),
            TestStatus::Approved => write!(f, "approved"),
            TestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Validated input for a new lab test
#[derive(Debug, Clone)]
pub struct NewLabTest {
    /// Id of the processing batch the sample came from
    pub batch_id: String,
    pub herb_name: String,
    pub measurements: Measurements,
    pub test_date: NaiveDate,
}

impl NewLabTest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("batch id"));
        }
        if self.herb_name.trim().is_empty() {
            return Err(ValidationError::EmptyHerbName);
        }
        Ok(())
    }
}

/// Field-wise patch merged into an existing lab test
#[derive(Debug, Clone, Default)]
pub struct LabTestPatch {
    pub status: Option<TestStatus>,
    pub certificate_id: Option<String>,
    pub rejection_reason: Option<String>,
}

/// A quality measurement run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabTest {
    /// Unique record id (LT- prefix)
    pub id: String,

    /// Id of the processing batch the sample came from
    pub batch_id: String,

    pub herb_name: String,

    /// The four recorded measurements (moisture %, DNA match %,
    /// pesticide ppm, temperature deg C)
    #[serde(flatten)]
    pub measurements: Measurements,

    pub test_date: NaiveDate,

    #[serde(default)]
    pub status: TestStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl LabTest {
    pub fn create(id: String, new: NewLabTest) -> Self {
        Self {
            id,
            batch_id: new.batch_id,
            herb_name: new.herb_name,
            measurements: new.measurements,
            test_date: new.test_date,
            status: TestStatus::Pending,
            certificate_id: None,
            rejection_reason: None,
        }
    }

    pub fn apply(&mut self, patch: LabTestPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(certificate_id) = patch.certificate_id {
            self.certificate_id = Some(certificate_id);
        }
        if let Some(reason) = patch.rejection_reason {
            self.rejection_reason = Some(reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_test() -> LabTest {
        LabTest::create(
            "LT-1756500000000".to_string(),
            NewLabTest {
                batch_id: "PB-1756400000000".to_string(),
                herb_name: "Ashwagandha".to_string(),
                measurements: Measurements {
                    moisture: 10.2,
                    dna_match: 96.8,
                    pesticide: 0.08,
                    temperature: 21.5,
                },
                test_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
            },
        )
    }

    #[test]
    fn test_new_lab_test_is_pending() {
        let test = sample_test();
        assert_eq!(test.status, TestStatus::Pending);
        assert!(test.certificate_id.is_none());
        assert!(test.rejection_reason.is_none());
    }

    #[test]
    fn test_patch_merges_fields() {
        let mut test = sample_test();
        test.apply(LabTestPatch {
            status: Some(TestStatus::Approved),
            certificate_id: Some("CERT-1756500000001".to_string()),
            rejection_reason: None,
        });

        assert_eq!(test.status, TestStatus::Approved);
        assert_eq!(test.certificate_id.as_deref(), Some("CERT-1756500000001"));
    }

    #[test]
    fn test_measurements_flatten_in_json() {
        let test = sample_test();
        let json = serde_json::to_string(&test).unwrap();

        // Measurements sit at the top level of the record, not nested
        assert!(json.contains("\"moisture\":10.2"));
        assert!(json.contains("\"dna_match\":96.8"));

        let parsed: LabTest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.measurements, test.measurements);
    }
}
