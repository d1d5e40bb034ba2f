//! `hbt validate` command - offline referential-integrity report
//!
//! Mutations never enforce referential integrity (dangling references are
//! accepted and propagation to a missing target is a no-op), so this command
//! is the one place inconsistencies get surfaced.

use clap::Args;
use console::style;
use miette::Result;
use std::collections::HashSet;

use crate::cli::helpers::open_store;
use crate::core::lifecycle;

#[derive(Args, Debug)]
pub struct ValidateArgs {}

pub fn run(_args: ValidateArgs) -> Result<()> {
    let (_, store) = open_store()?;

    let mut issues: Vec<String> = Vec::new();

    let collection_ids: HashSet<&str> = store.collections().iter().map(|c| c.id.as_str()).collect();
    let batch_ids: HashSet<&str> = store.batches().iter().map(|b| b.id.as_str()).collect();

    for ledger in [
        store.collections().iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        store.batches().iter().map(|b| b.id.as_str()).collect(),
        store.lab_tests().iter().map(|t| t.id.as_str()).collect(),
        store.products().iter().map(|p| p.id.as_str()).collect(),
    ] {
        let mut seen = HashSet::new();
        for id in ledger {
            if !seen.insert(id) {
                issues.push(format!("duplicate record id {id}"));
            }
        }
    }

    for batch in store.batches() {
        if !collection_ids.contains(batch.source_id.as_str()) {
            issues.push(format!(
                "{}: source collection {} not found",
                batch.id, batch.source_id
            ));
        }
    }

    for test in store.lab_tests() {
        if !batch_ids.contains(test.batch_id.as_str()) {
            issues.push(format!(
                "{}: processing batch {} not found",
                test.id, test.batch_id
            ));
            continue;
        }

        // A terminal test whose underlying collection never received the
        // propagated status points at a propagation that hit a missing
        // record at the time it ran.
        if let Some(expected) = lifecycle::on_lab_test_status(test.status) {
            if let Some(collection) = store
                .source_collection_id(&test.batch_id)
                .and_then(|id| store.collection(&id).cloned())
            {
                use crate::entities::collection::CollectionStatus;
                // Manufacturing legitimately supersedes `approved` only; a
                // rejected or merely tested collection that went on to be
                // manufactured is exactly the inconsistency to report.
                let superseded = expected == CollectionStatus::Approved
                    && collection.status == CollectionStatus::Manufactured;
                if collection.status != expected && !superseded {
                    issues.push(format!(
                        "{}: test is {} but collection {} is {}",
                        test.id, test.status, collection.id, collection.status
                    ));
                }
            }
        }
    }

    for product in store.products() {
        for batch_id in &product.batch_ids {
            if !batch_ids.contains(batch_id.as_str()) {
                issues.push(format!(
                    "{}: processing batch {} not found",
                    product.id, batch_id
                ));
            }
        }
    }

    if issues.is_empty() {
        println!(
            "{} {} collection(s), {} batch(es), {} test(s), {} product(s) - no issues",
            style("✓").green(),
            store.collections().len(),
            store.batches().len(),
            store.lab_tests().len(),
            store.products().len()
        );
        Ok(())
    } else {
        for issue in &issues {
            println!("{} {}", style("!").yellow(), issue);
        }
        println!();
        Err(miette::miette!("{} issue(s) found", issues.len()))
    }
}
