//! List filtering options shared across commands

use clap::ValueEnum;

use crate::entities::collection::CollectionStatus;

/// Collection status filter for list commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum StatusFilter {
    Collected,
    Processing,
    Processed,
    Tested,
    Approved,
    Rejected,
    Manufactured,
    /// Anything not yet manufactured
    Active,
    #[default]
    All,
}

impl StatusFilter {
    pub fn matches(&self, status: CollectionStatus) -> bool {
        match self {
            StatusFilter::Collected => status == CollectionStatus::Collected,
            StatusFilter::Processing => status == CollectionStatus::Processing,
            StatusFilter::Processed => status == CollectionStatus::Processed,
            StatusFilter::Tested => status == CollectionStatus::Tested,
            StatusFilter::Approved => status == CollectionStatus::Approved,
            StatusFilter::Rejected => status == CollectionStatus::Rejected,
            StatusFilter::Manufactured => status == CollectionStatus::Manufactured,
            StatusFilter::Active => status != CollectionStatus::Manufactured,
            StatusFilter::All => true,
        }
    }
}
