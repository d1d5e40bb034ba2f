//! Record store - the four traceability ledgers
//!
//! Owns the in-memory record collections and persists each one as a single
//! JSON array under `records/`. Every mutation rewrites the affected ledger
//! file in full; there are no partial or delta writes. Cross-entity status
//! propagation is applied in memory before any ledger is written, so one
//! operation flushes a consistent snapshot of everything it touched.
//!
//! Status propagation targeting an id with no matching collection event is a
//! silent no-op; referential integrity is checked offline by `hbt validate`,
//! not at mutation time.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::core::identity::{self, RecordPrefix};
use crate::core::lifecycle;
use crate::core::project::Project;
use crate::entities::collection::{CollectionEvent, CollectionStatus, NewCollection};
use crate::entities::labtest::{LabTest, LabTestPatch, NewLabTest};
use crate::entities::processing::{BatchPatch, NewBatch, ProcessingBatch};
use crate::entities::product::{NewProduct, Product};
use crate::entities::ValidationError;

/// Ledger file names, one JSON array per entity collection
pub const COLLECTIONS_FILE: &str = "collections.json";
pub const BATCHES_FILE: &str = "processing_batches.json";
pub const LAB_TESTS_FILE: &str = "lab_tests.json";
pub const PRODUCTS_FILE: &str = "products.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to write ledger {ledger}: {source}")]
    Write {
        ledger: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode ledger {ledger}: {source}")]
    Encode {
        ledger: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The record store. Explicitly constructed and passed to command handlers;
/// never a module-level singleton.
pub struct Store {
    records_dir: PathBuf,
    collections: Vec<CollectionEvent>,
    batches: Vec<ProcessingBatch>,
    lab_tests: Vec<LabTest>,
    products: Vec<Product>,
    warnings: Vec<String>,
}

impl Store {
    /// Open the store for a project, loading all four ledgers. A missing
    /// ledger file starts empty; an unreadable one also starts empty but
    /// records a warning for the CLI to surface.
    pub fn open(project: &Project) -> Result<Self, StoreError> {
        let records_dir = project.records_dir();
        fs::create_dir_all(&records_dir)?;

        let mut warnings = Vec::new();
        let collections = load_ledger(&records_dir, COLLECTIONS_FILE, &mut warnings);
        let batches = load_ledger(&records_dir, BATCHES_FILE, &mut warnings);
        let lab_tests = load_ledger(&records_dir, LAB_TESTS_FILE, &mut warnings);
        let products = load_ledger(&records_dir, PRODUCTS_FILE, &mut warnings);

        Ok(Self {
            records_dir,
            collections,
            batches,
            lab_tests,
            products,
            warnings,
        })
    }

    /// Warnings collected while loading (corrupt ledgers degrade to empty)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn collections(&self) -> &[CollectionEvent] {
        &self.collections
    }

    pub fn batches(&self) -> &[ProcessingBatch] {
        &self.batches
    }

    pub fn lab_tests(&self) -> &[LabTest] {
        &self.lab_tests
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn collection(&self, id: &str) -> Option<&CollectionEvent> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn batch(&self, id: &str) -> Option<&ProcessingBatch> {
        self.batches.iter().find(|b| b.id == id)
    }

    pub fn lab_test(&self, id: &str) -> Option<&LabTest> {
        self.lab_tests.iter().find(|t| t.id == id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Find a collection event by exact id, id prefix, or batch code prefix
    pub fn find_collection(&self, query: &str) -> Option<&CollectionEvent> {
        self.collections
            .iter()
            .find(|c| c.id == query || c.batch_code == query)
            .or_else(|| {
                self.collections
                    .iter()
                    .find(|c| c.id.starts_with(query) || c.batch_code.starts_with(query))
            })
    }

    /// Find a processing batch by exact id or id prefix
    pub fn find_batch(&self, query: &str) -> Option<&ProcessingBatch> {
        self.batches
            .iter()
            .find(|b| b.id == query)
            .or_else(|| self.batches.iter().find(|b| b.id.starts_with(query)))
    }

    /// Find a lab test by exact id or id prefix
    pub fn find_lab_test(&self, query: &str) -> Option<&LabTest> {
        self.lab_tests
            .iter()
            .find(|t| t.id == query)
            .or_else(|| self.lab_tests.iter().find(|t| t.id.starts_with(query)))
    }

    /// Find a product by exact id, QR id, or prefix of either
    pub fn find_product(&self, query: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.id == query || p.qr_code == query)
            .or_else(|| {
                self.products
                    .iter()
                    .find(|p| p.id.starts_with(query) || p.qr_code.starts_with(query))
            })
    }

    /// Register a harvest. Generates the record id, creation timestamp and
    /// batch code; status starts `collected`.
    pub fn add_collection(&mut self, new: NewCollection) -> Result<CollectionEvent, StoreError> {
        new.validate()?;
        let now = Utc::now();
        let id = identity::next_id(RecordPrefix::Collection, now, |candidate| {
            self.collections.iter().any(|c| c.id == candidate)
        });

        let event = CollectionEvent::create(id, new, now);
        self.collections.push(event.clone());
        self.persist_collections()?;
        Ok(event)
    }

    /// Create a processing batch and mark its source collection event
    /// `processing` in the same operation.
    pub fn add_batch(&mut self, new: NewBatch) -> Result<ProcessingBatch, StoreError> {
        new.validate()?;
        let now = Utc::now();
        let id = identity::next_id(RecordPrefix::Batch, now, |candidate| {
            self.batches.iter().any(|b| b.id == candidate)
        });

        let batch = ProcessingBatch::create(id, new);
        let source_id = batch.source_id.clone();
        self.batches.push(batch.clone());
        self.apply_status(&source_id, lifecycle::on_batch_created());

        self.persist_batches()?;
        self.persist_collections()?;
        Ok(batch)
    }

    /// Merge a patch into a batch. Completing the batch marks the source
    /// collection event `processed`. Returns `None` if no batch matches.
    pub fn update_batch(
        &mut self,
        id: &str,
        patch: BatchPatch,
    ) -> Result<Option<ProcessingBatch>, StoreError> {
        let completing = patch.status == Some(crate::entities::processing::BatchStatus::Completed);

        let Some(batch) = self.batches.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        batch.apply(patch, Utc::now());
        let updated = batch.clone();

        if completing {
            let source_id = updated.source_id.clone();
            self.apply_status(&source_id, lifecycle::on_batch_completed());
        }

        self.persist_batches()?;
        if completing {
            self.persist_collections()?;
        }
        Ok(Some(updated))
    }

    /// Record a lab test. No status propagation happens here; transitions
    /// fire when the test is updated to a reportable status.
    pub fn add_lab_test(&mut self, new: NewLabTest) -> Result<LabTest, StoreError> {
        new.validate()?;
        let now = Utc::now();
        let id = identity::next_id(RecordPrefix::LabTest, now, |candidate| {
            self.lab_tests.iter().any(|t| t.id == candidate)
        });

        let test = LabTest::create(id, new);
        self.lab_tests.push(test.clone());
        self.persist_lab_tests()?;
        Ok(test)
    }

    /// Merge a patch into a lab test. A patch that sets a reportable status
    /// (`tested`, `approved`, `rejected`) propagates the same status to the
    /// collection event underlying the referenced processing batch. Returns
    /// `None` if no test matches.
    pub fn update_lab_test(
        &mut self,
        id: &str,
        patch: LabTestPatch,
    ) -> Result<Option<LabTest>, StoreError> {
        let transition = patch.status.and_then(lifecycle::on_lab_test_status);

        let Some(test) = self.lab_tests.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        test.apply(patch);
        let updated = test.clone();

        if let Some(status) = transition {
            if let Some(source_id) = self.source_collection_id(&updated.batch_id) {
                self.apply_status(&source_id, status);
            }
        }

        self.persist_lab_tests()?;
        if transition.is_some() {
            self.persist_collections()?;
        }
        Ok(Some(updated))
    }

    /// Create a product. Generates the record id, QR identifier and creation
    /// timestamp, then marks the collection event underlying every referenced
    /// batch as `manufactured`.
    pub fn add_product(&mut self, new: NewProduct) -> Result<Product, StoreError> {
        new.validate()?;
        let now = Utc::now();
        let id = identity::next_id(RecordPrefix::Product, now, |candidate| {
            self.products.iter().any(|p| p.id == candidate)
        });
        let qr_code = identity::next_id(RecordPrefix::Qr, now, |candidate| {
            self.products.iter().any(|p| p.qr_code == candidate)
        });

        let product = Product::create(id, qr_code, new, now);
        self.products.push(product.clone());

        let source_ids: Vec<String> = product
            .batch_ids
            .iter()
            .filter_map(|batch_id| self.source_collection_id(batch_id))
            .collect();
        for source_id in source_ids {
            self.apply_status(&source_id, lifecycle::on_product_created());
        }

        self.persist_products()?;
        self.persist_collections()?;
        Ok(product)
    }

    /// Directly set a collection event's status. Returns whether a record
    /// matched; the ledger is rewritten either way.
    pub fn set_collection_status(
        &mut self,
        id: &str,
        status: CollectionStatus,
    ) -> Result<bool, StoreError> {
        let found = self.apply_status(id, status);
        self.persist_collections()?;
        Ok(found)
    }

    /// Resolve a processing batch id to the id of its source collection
    pub fn source_collection_id(&self, batch_id: &str) -> Option<String> {
        self.batches
            .iter()
            .find(|b| b.id == batch_id)
            .map(|b| b.source_id.clone())
    }

    // Nonexistent targets are accepted without error; the update is a no-op.
    fn apply_status(&mut self, id: &str, status: CollectionStatus) -> bool {
        match self.collections.iter_mut().find(|c| c.id == id) {
            Some(collection) => {
                collection.status = status;
                true
            }
            None => false,
        }
    }

    fn persist_collections(&self) -> Result<(), StoreError> {
        write_ledger(&self.records_dir, COLLECTIONS_FILE, &self.collections)
    }

    fn persist_batches(&self) -> Result<(), StoreError> {
        write_ledger(&self.records_dir, BATCHES_FILE, &self.batches)
    }

    fn persist_lab_tests(&self) -> Result<(), StoreError> {
        write_ledger(&self.records_dir, LAB_TESTS_FILE, &self.lab_tests)
    }

    fn persist_products(&self) -> Result<(), StoreError> {
        write_ledger(&self.records_dir, PRODUCTS_FILE, &self.products)
    }
}

fn load_ledger<T: DeserializeOwned>(
    dir: &Path,
    file: &'static str,
    warnings: &mut Vec<String>,
) -> Vec<T> {
    let path = dir.join(file);
    if !path.exists() {
        return Vec::new();
    }
    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(records) => records,
            Err(e) => {
                warnings.push(format!("{file}: unreadable ledger, starting empty ({e})"));
                Vec::new()
            }
        },
        Err(e) => {
            warnings.push(format!("{file}: {e}"));
            Vec::new()
        }
    }
}

fn write_ledger<T: Serialize>(
    dir: &Path,
    file: &'static str,
    records: &[T],
) -> Result<(), StoreError> {
    let content = serde_json::to_string_pretty(records).map_err(|e| StoreError::Encode {
        ledger: file,
        source: e,
    })?;
    fs::write(dir.join(file), content).map_err(|e| StoreError::Write {
        ledger: file,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::quality::Measurements;
    use crate::entities::collection::Location;
    use crate::entities::labtest::TestStatus;
    use crate::entities::processing::{BatchStatus, Stages};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn new_collection(herb: &str) -> NewCollection {
        NewCollection {
            farmer_id: "farmer-1".to_string(),
            farmer_name: "Ravi Kumar".to_string(),
            herb_name: herb.to_string(),
            location: Location {
                latitude: 12.97,
                longitude: 77.59,
                address: "Plot 4".to_string(),
            },
            quantity_kg: 50.0,
            harvest_date: NaiveDate::from_ymd_opt(2026, 8, 20).unwrap(),
        }
    }

    fn new_batch(source_id: &str) -> NewBatch {
        NewBatch {
            source_id: source_id.to_string(),
            herb_name: "Ashwagandha".to_string(),
            farmer_name: "Ravi Kumar".to_string(),
            processor_id: "proc-1".to_string(),
            notes: String::new(),
            stages: Stages::default(),
        }
    }

    fn new_test(batch_id: &str) -> NewLabTest {
        NewLabTest {
            batch_id: batch_id.to_string(),
            herb_name: "Ashwagandha".to_string(),
            measurements: Measurements {
                moisture: 10.2,
                dna_match: 96.8,
                pesticide: 0.08,
                temperature: 21.5,
            },
            test_date: NaiveDate::from_ymd_opt(2026, 8, 25).unwrap(),
        }
    }

    fn open_store(tmp: &TempDir) -> Store {
        let project = Project::discover_from(tmp.path())
            .or_else(|_| Project::init(tmp.path()))
            .unwrap();
        Store::open(&project).unwrap()
    }

    #[test]
    fn test_add_collection_generates_distinct_ids() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let first = store.add_collection(new_collection("Ashwagandha")).unwrap();
        let second = store.add_collection(new_collection("Tulsi")).unwrap();

        assert_eq!(first.status, CollectionStatus::Collected);
        assert_ne!(first.id, second.id);
        assert!(first.id.starts_with("COL-"));
    }

    #[test]
    fn test_batch_creation_marks_source_processing() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let collection = store.add_collection(new_collection("Ashwagandha")).unwrap();
        let batch = store.add_batch(new_batch(&collection.id)).unwrap();

        assert!(batch.id.starts_with("PB-"));
        assert_eq!(
            store.collection(&collection.id).unwrap().status,
            CollectionStatus::Processing
        );
    }

    #[test]
    fn test_batch_completion_marks_source_processed() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let collection = store.add_collection(new_collection("Ashwagandha")).unwrap();
        let batch = store.add_batch(new_batch(&collection.id)).unwrap();

        let updated = store
            .update_batch(
                &batch.id,
                BatchPatch {
                    status: Some(BatchStatus::Completed),
                    ..BatchPatch::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, BatchStatus::Completed);
        assert!(updated.completed_at.is_some());
        assert_eq!(
            store.collection(&collection.id).unwrap().status,
            CollectionStatus::Processed
        );
    }

    #[test]
    fn test_lab_test_status_propagates_to_underlying_collection() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let collection = store.add_collection(new_collection("Ashwagandha")).unwrap();
        let batch = store.add_batch(new_batch(&collection.id)).unwrap();
        let test = store.add_lab_test(new_test(&batch.id)).unwrap();

        assert_eq!(test.status, TestStatus::Pending);
        // Recording a pending test does not move the collection
        assert_eq!(
            store.collection(&collection.id).unwrap().status,
            CollectionStatus::Processing
        );

        store
            .update_lab_test(
                &test.id,
                LabTestPatch {
                    status: Some(TestStatus::Approved),
                    ..LabTestPatch::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(
            store.collection(&collection.id).unwrap().status,
            CollectionStatus::Approved
        );
    }

    #[test]
    fn test_lab_test_rejection_propagates() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let collection = store.add_collection(new_collection("Tulsi")).unwrap();
        let batch = store.add_batch(new_batch(&collection.id)).unwrap();
        let test = store.add_lab_test(new_test(&batch.id)).unwrap();

        store
            .update_lab_test(
                &test.id,
                LabTestPatch {
                    status: Some(TestStatus::Rejected),
                    rejection_reason: Some("pesticide above limit".to_string()),
                    ..LabTestPatch::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(
            store.collection(&collection.id).unwrap().status,
            CollectionStatus::Rejected
        );
    }

    #[test]
    fn test_product_marks_all_underlying_collections_manufactured() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let c1 = store.add_collection(new_collection("Ashwagandha")).unwrap();
        let c2 = store.add_collection(new_collection("Tulsi")).unwrap();
        let b1 = store.add_batch(new_batch(&c1.id)).unwrap();
        let b2 = store.add_batch(new_batch(&c2.id)).unwrap();

        let product = store
            .add_product(NewProduct {
                name: "Calm Blend".to_string(),
                product_type: "powder".to_string(),
                formulation: "60/40 blend".to_string(),
                manufacturer_id: "mfg-1".to_string(),
                manufacturer_name: "Veda Naturals".to_string(),
                batch_ids: vec![b1.id.clone(), b2.id.clone()],
            })
            .unwrap();

        assert!(product.id.starts_with("PROD-"));
        assert!(product.qr_code.starts_with("QR-"));
        assert_eq!(
            store.collection(&c1.id).unwrap().status,
            CollectionStatus::Manufactured
        );
        assert_eq!(
            store.collection(&c2.id).unwrap().status,
            CollectionStatus::Manufactured
        );
    }

    #[test]
    fn test_propagation_to_missing_target_is_silent_noop() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        // Batch referencing a collection that does not exist
        let batch = store.add_batch(new_batch("COL-999")).unwrap();
        assert_eq!(store.collections().len(), 0);

        // Lab test over a batch whose source is missing still updates the test
        let test = store.add_lab_test(new_test(&batch.id)).unwrap();
        let updated = store
            .update_lab_test(
                &test.id,
                LabTestPatch {
                    status: Some(TestStatus::Approved),
                    ..LabTestPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, TestStatus::Approved);
    }

    #[test]
    fn test_update_of_unknown_record_reports_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        assert!(store
            .update_batch("PB-999", BatchPatch::default())
            .unwrap()
            .is_none());
        assert!(store
            .update_lab_test("LT-999", LabTestPatch::default())
            .unwrap()
            .is_none());
        assert!(!store
            .set_collection_status("COL-999", CollectionStatus::Approved)
            .unwrap());
    }

    #[test]
    fn test_store_persists_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let collection_id = {
            let mut store = Store::open(&project).unwrap();
            let collection = store.add_collection(new_collection("Ashwagandha")).unwrap();
            let batch = store.add_batch(new_batch(&collection.id)).unwrap();
            store
                .update_batch(
                    &batch.id,
                    BatchPatch {
                        status: Some(BatchStatus::Completed),
                        ..BatchPatch::default()
                    },
                )
                .unwrap();
            collection.id
        };

        let store = Store::open(&project).unwrap();
        assert!(store.warnings().is_empty());
        assert_eq!(store.collections().len(), 1);
        assert_eq!(store.batches().len(), 1);
        assert_eq!(
            store.collection(&collection_id).unwrap().status,
            CollectionStatus::Processed
        );
    }

    #[test]
    fn test_corrupt_ledger_degrades_to_empty_with_warning() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        fs::write(
            project.records_dir().join(COLLECTIONS_FILE),
            "not valid json",
        )
        .unwrap();

        let store = Store::open(&project).unwrap();
        assert!(store.collections().is_empty());
        assert_eq!(store.warnings().len(), 1);
        assert!(store.warnings()[0].contains(COLLECTIONS_FILE));
    }

    #[test]
    fn test_find_collection_by_batch_code() {
        let tmp = TempDir::new().unwrap();
        let mut store = open_store(&tmp);

        let collection = store.add_collection(new_collection("Ashwagandha")).unwrap();
        let found = store.find_collection(&collection.batch_code).unwrap();
        assert_eq!(found.id, collection.id);

        let by_prefix = store.find_collection("ASH-").unwrap();
        assert_eq!(by_prefix.id, collection.id);
    }
}
