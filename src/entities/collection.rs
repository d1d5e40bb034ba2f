//! Collection event - a harvest record submitted by a farmer

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity;
use crate::entities::ValidationError;

/// Lifecycle status of a collection event
///
/// Movement is forward-only by convention, with the tested state branching
/// into approved or rejected. The store does not guard transitions; callers
/// apply whatever status the triggering event maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    #[default]
    Collected,
    Processing,
    Processed,
    Tested,
    Approved,
    Rejected,
    Manufactured,
}

impl std::fmt::Display for CollectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectionStatus::Collected => write!(f, "collected"),
            CollectionStatus::Processing => write!(f, "processing"),
            CollectionStatus::Processed => write!(f, "processed"),
            CollectionStatus::Tested => write!(f, "tested"),
            CollectionStatus::Approved => write!(f, "approved"),
            CollectionStatus::Rejected => write!(f, "rejected"),
            CollectionStatus::Manufactured => write!(f, "manufactured"),
        }
    }
}

impl CollectionStatus {
    /// Parse a user-supplied status name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "collected" => Some(CollectionStatus::Collected),
            "processing" => Some(CollectionStatus::Processing),
            "processed" => Some(CollectionStatus::Processed),
            "tested" => Some(CollectionStatus::Tested),
            "approved" => Some(CollectionStatus::Approved),
            "rejected" => Some(CollectionStatus::Rejected),
            "manufactured" => Some(CollectionStatus::Manufactured),
            _ => None,
        }
    }
}

/// Geolocation of a harvest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Free-text address or plot description
    #[serde(default)]
    pub address: String,
}

/// Validated input for a new collection event
#[derive(Debug, Clone)]
pub struct NewCollection {
    pub farmer_id: String,
    pub farmer_name: String,
    pub herb_name: String,
    pub location: Location,
    pub quantity_kg: f64,
    pub harvest_date: NaiveDate,
}

impl NewCollection {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.herb_name.trim().is_empty() {
            return Err(ValidationError::EmptyHerbName);
        }
        if self.quantity_kg <= 0.0 {
            return Err(ValidationError::NonPositiveQuantity(self.quantity_kg));
        }
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(ValidationError::LatitudeOutOfRange(self.location.latitude));
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(ValidationError::LongitudeOutOfRange(self.location.longitude));
        }
        Ok(())
    }
}

/// A harvest record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionEvent {
    /// Unique record id (COL- prefix)
    pub id: String,

    pub farmer_id: String,
    pub farmer_name: String,

    pub herb_name: String,

    /// Human-readable batch code derived from the herb name and harvest day
    /// (e.g. `ASH-20260830-4821`)
    pub batch_code: String,

    pub location: Location,

    /// Harvested quantity in kilograms
    pub quantity_kg: f64,

    pub harvest_date: NaiveDate,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub status: CollectionStatus,
}

impl CollectionEvent {
    /// Build a record from validated input. Status always starts `collected`.
    pub fn create(id: String, new: NewCollection, now: DateTime<Utc>) -> Self {
        let batch_code = identity::batch_code(&new.herb_name, now);
        Self {
            id,
            farmer_id: new.farmer_id,
            farmer_name: new.farmer_name,
            herb_name: new.herb_name,
            batch_code,
            location: new.location,
            quantity_kg: new.quantity_kg,
            harvest_date: new.harvest_date,
            created_at: now,
            status: CollectionStatus::Collected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> NewCollection {
        NewCollection {
            farmer_id: "farmer-1".to_string(),
            farmer_name: "Ravi Kumar".to_string(),
            herb_name: "Ashwagandha".to_string(),
            location: Location {
                latitude: 12.97,
                longitude: 77.59,
                address: "Plot 4, Hosur Road".to_string(),
            },
            quantity_kg: 120.0,
            harvest_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        }
    }

    #[test]
    fn test_new_collection_starts_collected() {
        let now = Utc::now();
        let event = CollectionEvent::create("COL-1".to_string(), sample_input(), now);

        assert_eq!(event.status, CollectionStatus::Collected);
        assert_eq!(event.herb_name, "Ashwagandha");
        assert!(event.batch_code.starts_with("ASH-"));
        assert_eq!(event.created_at, now);
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        let mut input = sample_input();
        input.quantity_kg = 0.0;
        assert!(input.validate().is_err());

        let mut input = sample_input();
        input.herb_name = "  ".to_string();
        assert!(input.validate().is_err());

        let mut input = sample_input();
        input.location.latitude = 95.0;
        assert!(input.validate().is_err());

        assert!(sample_input().validate().is_ok());
    }

    #[test]
    fn test_collection_roundtrip() {
        let event = CollectionEvent::create("COL-1756500000000".to_string(), sample_input(), Utc::now());

        let json = serde_json::to_string(&event).unwrap();
        let parsed: CollectionEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.id, event.id);
        assert_eq!(parsed.batch_code, event.batch_code);
        assert_eq!(parsed.status, CollectionStatus::Collected);
        assert_eq!(parsed.location, event.location);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&CollectionStatus::Manufactured).unwrap();
        assert_eq!(json, "\"manufactured\"");
        assert_eq!(CollectionStatus::parse("REJECTED"), Some(CollectionStatus::Rejected));
        assert_eq!(CollectionStatus::parse("shipped"), None);
    }
}
