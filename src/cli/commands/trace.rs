//! `hbt trace` command - follow a record through the whole chain

use clap::Args;
use console::style;
use miette::Result;

use crate::cli::helpers::open_store;
use crate::core::store::Store;
use crate::entities::collection::CollectionEvent;

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Collection id, batch code, processing batch id, product id, or QR id
    pub query: String,
}

pub fn run(args: TraceArgs) -> Result<()> {
    let (_, store) = open_store()?;

    // Products first: their QR ids are what consumers hold
    if let Some(product) = store.find_product(&args.query) {
        println!(
            "{} {} ({}) - QR {}",
            style("Product").bold(),
            style(&product.id).cyan(),
            style(&product.name).yellow(),
            product.qr_code
        );
        println!(
            "  manufactured by {} on {}",
            product.manufacturer_name,
            product.created_at.format("%Y-%m-%d")
        );
        for batch_id in &product.batch_ids {
            println!();
            match store
                .source_collection_id(batch_id)
                .and_then(|id| store.collection(&id).cloned())
            {
                Some(collection) => print_chain(&store, &collection),
                None => println!(
                    "  {} batch {} has no traceable source collection",
                    style("!").yellow(),
                    batch_id
                ),
            }
        }
        return Ok(());
    }

    if let Some(batch) = store.find_batch(&args.query) {
        match store.collection(&batch.source_id).cloned() {
            Some(collection) => print_chain(&store, &collection),
            None => {
                println!(
                    "{} batch {} references missing collection {}",
                    style("!").yellow(),
                    batch.id,
                    batch.source_id
                );
            }
        }
        return Ok(());
    }

    if let Some(collection) = store.find_collection(&args.query).cloned() {
        print_chain(&store, &collection);
        return Ok(());
    }

    Err(miette::miette!(
        "Nothing in the ledgers matches '{}'",
        args.query
    ))
}

/// Print a collection event and everything downstream of it
fn print_chain(store: &Store, collection: &CollectionEvent) {
    println!(
        "{} {} ({}) - {} {} kg, {}",
        style("Collection").bold(),
        style(&collection.id).cyan(),
        style(&collection.batch_code).yellow(),
        collection.herb_name,
        collection.quantity_kg,
        style(collection.status).magenta()
    );
    println!(
        "  harvested {} by {}{}",
        collection.harvest_date,
        collection.farmer_name,
        if collection.location.address.is_empty() {
            String::new()
        } else {
            format!(" at {}", collection.location.address)
        }
    );

    for batch in store.batches().iter().filter(|b| b.source_id == collection.id) {
        println!(
            "  {} {} {} - {} ({}/5 stages)",
            style("→").dim(),
            style("Processing").bold(),
            style(&batch.id).cyan(),
            batch.status,
            batch.stages.completed_count()
        );

        for test in store.lab_tests().iter().filter(|t| t.batch_id == batch.id) {
            let detail = match (&test.certificate_id, &test.rejection_reason) {
                (Some(certificate), _) => format!(" (certificate {certificate})"),
                (None, Some(reason)) => format!(" ({reason})"),
                (None, None) => String::new(),
            };
            println!(
                "    {} {} {} - {}{}",
                style("→").dim(),
                style("Lab test").bold(),
                style(&test.id).cyan(),
                test.status,
                detail
            );
        }

        for product in store
            .products()
            .iter()
            .filter(|p| p.batch_ids.iter().any(|id| id == &batch.id))
        {
            println!(
                "    {} {} {} ({}) - QR {}",
                style("→").dim(),
                style("Product").bold(),
                style(&product.id).cyan(),
                product.name,
                product.qr_code
            );
        }
    }
}
