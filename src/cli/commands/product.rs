//! `hbt product` command - finished products (the manufacturer's portal)

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::entities::product::{NewProduct, Product};

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Assemble a product from processing batches
    New(NewArgs),

    /// List products
    List(ListArgs),

    /// Show one product
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Product name
    #[arg(long)]
    pub name: String,

    /// Product type (e.g. capsule, powder, oil)
    #[arg(long = "type")]
    pub product_type: String,

    /// Formulation description
    #[arg(long, default_value = "")]
    pub formulation: String,

    /// Processing batch consumed by this run (repeatable)
    #[arg(long = "batch", required = true)]
    pub batches: Vec<String>,

    /// Manufacturer name (defaults to the configured operator)
    #[arg(long)]
    pub manufacturer: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Product id or QR id (prefix match)
    pub id: String,
}

pub fn run(cmd: ProductCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ProductCommands::New(args) => run_new(args, global),
        ProductCommands::List(args) => run_list(args, global),
        ProductCommands::Show(args) => run_show(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store()?;
    let config = Config::load(Some(&project));

    // Resolve batch queries where possible; an unmatched reference is kept
    // as given and will show up in `hbt validate`.
    let batch_ids: Vec<String> = args
        .batches
        .iter()
        .map(|query| {
            store
                .find_batch(query)
                .map(|b| b.id.clone())
                .unwrap_or_else(|| query.clone())
        })
        .collect();

    let new = NewProduct {
        name: args.name,
        product_type: args.product_type,
        formulation: args.formulation,
        manufacturer_id: config.operator_id(),
        manufacturer_name: args.manufacturer.unwrap_or_else(|| config.operator()),
        batch_ids,
    };

    let product = store.add_product(new).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", product.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&product).into_diagnostic()?)
        }
        _ => {
            println!(
                "{} Created product {}",
                style("✓").green(),
                style(&product.id).cyan()
            );
            println!("   {}", style(&product.name).yellow());
            println!(
                "   QR {} - {} batch(es) consumed, underlying collections marked manufactured",
                style(&product.qr_code).cyan(),
                product.batch_ids.len()
            );
        }
    }

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let products: Vec<&Product> = store.products().iter().collect();

    if args.count {
        println!("{}", products.len());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&products).into_diagnostic()?
            );
            return Ok(());
        }
        OutputFormat::Id => {
            for product in &products {
                println!("{}", product.id);
            }
            return Ok(());
        }
        OutputFormat::Tsv => {
            for product in &products {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    product.id,
                    product.name,
                    product.product_type,
                    product.batch_ids.len(),
                    product.qr_code
                );
            }
            return Ok(());
        }
        _ => {}
    }

    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    println!(
        "{:<22} {:<26} {:<10} {:<8} {:<20}",
        style("ID").bold(),
        style("NAME").bold(),
        style("TYPE").bold(),
        style("BATCHES").bold(),
        style("QR").bold()
    );
    println!("{}", "-".repeat(88));

    for product in &products {
        println!(
            "{:<22} {:<26} {:<10} {:<8} {:<20}",
            truncate_str(&product.id, 20),
            truncate_str(&product.name, 24),
            truncate_str(&product.product_type, 8),
            product.batch_ids.len(),
            truncate_str(&product.qr_code, 18)
        );
    }

    println!();
    println!("{} product(s) found", style(products.len()).cyan());

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let product = store
        .find_product(&args.id)
        .ok_or_else(|| miette::miette!("No product matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(product).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", product.id);
            return Ok(());
        }
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&product.id).cyan());
    println!("{}: {}", style("Name").bold(), style(&product.name).yellow());
    println!("{}: {}", style("Type").bold(), product.product_type);
    if !product.formulation.is_empty() {
        println!("{}: {}", style("Formulation").bold(), product.formulation);
    }
    println!(
        "{}: {}",
        style("Manufacturer").bold(),
        product.manufacturer_name
    );
    println!("{}: {}", style("QR").bold(), style(&product.qr_code).cyan());
    println!("{}", style("Batches:").bold());
    for batch_id in &product.batch_ids {
        println!("  {} {}", style("→").dim(), batch_id);
    }
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("Created").dim(),
        product.created_at.format("%Y-%m-%d %H:%M")
    );

    Ok(())
}
