//! Processing batch - a processing run derived from one collection event

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::ValidationError;

/// Status of a processing batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    #[default]
    Processing,
    Completed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchStatus::Processing => write!(f, "processing"),
            BatchStatus::Completed => write!(f, "completed"),
        }
    }
}

/// The five processing stage flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Stages {
    pub cleaning: bool,
    pub drying: bool,
    pub grinding: bool,
    pub packaging: bool,
    pub quality_check: bool,
}

impl Stages {
    pub fn completed_count(&self) -> usize {
        [
            self.cleaning,
            self.drying,
            self.grinding,
            self.packaging,
            self.quality_check,
        ]
        .iter()
        .filter(|done| **done)
        .count()
    }

    pub fn all_done(&self) -> bool {
        self.completed_count() == 5
    }

    /// Merge another set of flags in; a stage once done stays done
    pub fn merge(&mut self, other: Stages) {
        self.cleaning |= other.cleaning;
        self.drying |= other.drying;
        self.grinding |= other.grinding;
        self.packaging |= other.packaging;
        self.quality_check |= other.quality_check;
    }
}

/// Validated input for a new processing batch
#[derive(Debug, Clone)]
pub struct NewBatch {
    /// Id of the collection event this batch processes
    pub source_id: String,
    pub herb_name: String,
    pub farmer_name: String,
    pub processor_id: String,
    pub notes: String,
    pub stages: Stages,
}

impl NewBatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.source_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("source collection id"));
        }
        if self.processor_id.trim().is_empty() {
            return Err(ValidationError::EmptyField("processor id"));
        }
        Ok(())
    }
}

/// Field-wise patch merged into an existing batch
#[derive(Debug, Clone, Default)]
pub struct BatchPatch {
    pub stages: Option<Stages>,
    pub notes: Option<String>,
    pub status: Option<BatchStatus>,
}

/// A processing run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingBatch {
    /// Unique record id (PB- prefix)
    pub id: String,

    /// Id of the collection event this batch was created from
    pub source_id: String,

    /// Denormalized from the source collection at creation time
    pub herb_name: String,
    pub farmer_name: String,

    pub processor_id: String,

    #[serde(default)]
    pub stages: Stages,

    #[serde(default)]
    pub notes: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: BatchStatus,
}

impl ProcessingBatch {
    pub fn create(id: String, new: NewBatch) -> Self {
        Self {
            id,
            source_id: new.source_id,
            herb_name: new.herb_name,
            farmer_name: new.farmer_name,
            processor_id: new.processor_id,
            stages: new.stages,
            notes: new.notes,
            completed_at: None,
            status: BatchStatus::Processing,
        }
    }

    /// Merge a patch into this batch. Completing the batch stamps
    /// `completed_at` if it is not already set.
    pub fn apply(&mut self, patch: BatchPatch, now: DateTime<Utc>) {
        if let Some(stages) = patch.stages {
            self.stages = stages;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(status) = patch.status {
            self.status = status;
            if status == BatchStatus::Completed && self.completed_at.is_none() {
                self.completed_at = Some(now);
            }
        }
    }
}
