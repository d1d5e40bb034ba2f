//! Product - a finished good assembled from one or more processing batches

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ValidationError;

/// Validated input for a new product
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub product_type: String,
    pub formulation: String,
    pub manufacturer_id: String,
    pub manufacturer_name: String,
    /// Processing batches consumed by this manufacturing run
    pub batch_ids: Vec<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("product name"));
        }
        if self.batch_ids.is_empty() {
            return Err(ValidationError::NoBatches);
        }
        Ok(())
    }
}

/// A finished good, exposed to consumers via its QR identifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique record id (PROD- prefix)
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub product_type: String,

    #[serde(default)]
    pub formulation: String,

    pub manufacturer_id: String,
    pub manufacturer_name: String,

    /// Processing batches consumed by this manufacturing run
    pub batch_ids: Vec<String>,

    /// Consumer-facing QR identifier
    pub qr_code: String,

    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn create(id: String, qr_code: String, new: NewProduct, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: new.name,
            product_type: new.product_type,
            formulation: new.formulation,
            manufacturer_id: new.manufacturer_id,
            manufacturer_name: new.manufacturer_name,
            batch_ids: new.batch_ids,
            qr_code,
            created_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> NewProduct {
        NewProduct {
            name: "Ashwagandha Capsules".to_string(),
            product_type: "capsule".to_string(),
            formulation: "500mg root extract".to_string(),
            manufacturer_id: "mfg-1".to_string(),
            manufacturer_name: "Veda Naturals".to_string(),
            batch_ids: vec!["PB-1756400000000".to_string()],
        }
    }

    #[test]
    fn test_product_requires_batches() {
        let mut input = sample_input();
        input.batch_ids.clear();
        assert!(input.validate().is_err());
        assert!(sample_input().validate().is_ok());
    }

    #[test]
    fn test_product_roundtrip() {
        let now = Utc::now();
        let product = Product::create(
            "PROD-1756500000000".to_string(),
            "QR-1756500000000".to_string(),
            sample_input(),
            now,
        );

        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"type\":\"capsule\""));

        let parsed: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, product.id);
        assert_eq!(parsed.qr_code, "QR-1756500000000");
        assert_eq!(parsed.batch_ids.len(), 1);
    }
}
