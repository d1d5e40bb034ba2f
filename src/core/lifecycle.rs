//! Status transition rules for collection events
//!
//! Four independent rules map events elsewhere in the chain to a status on
//! the originating collection event. This is not a guarded state machine:
//! callers apply the mapped status regardless of the current value, and no
//! transition is rolled back on downstream failure.

use crate::entities::collection::CollectionStatus;
use crate::entities::labtest::TestStatus;

/// Rule 1: a new processing batch was created from the collection
pub fn on_batch_created() -> CollectionStatus {
    CollectionStatus::Processing
}

/// Rule 2: the collection's processing batch was marked completed
pub fn on_batch_completed() -> CollectionStatus {
    CollectionStatus::Processed
}

/// Rule 3: a lab test over the collection's batch reached a reportable
/// status. `pending` maps to no transition.
pub fn on_lab_test_status(status: TestStatus) -> Option<CollectionStatus> {
    match status {
        TestStatus::Tested => Some(CollectionStatus::Tested),
        TestStatus::Approved => Some(CollectionStatus::Approved),
        TestStatus::Rejected => Some(CollectionStatus::Rejected),
        TestStatus::Pending => None,
    }
}

/// Rule 4: a product consumed the collection's batch
pub fn on_product_created() -> CollectionStatus {
    CollectionStatus::Manufactured
}
