//! Record type definitions

pub mod collection;
pub mod labtest;
pub mod processing;
pub mod product;

pub use collection::CollectionEvent;
pub use labtest::LabTest;
pub use processing::ProcessingBatch;
pub use product::Product;

use thiserror::Error;

/// Validation failures raised by record constructors
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("herb name must not be empty")]
    EmptyHerbName,

    #[error("quantity must be positive (got {0} kg)")]
    NonPositiveQuantity(f64),

    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("a product must reference at least one processing batch")]
    NoBatches,
}
