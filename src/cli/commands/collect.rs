//! `hbt collect` command - harvest collection events (the farmer's portal)

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::filters::StatusFilter;
use crate::cli::helpers::{open_store, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::entities::collection::{CollectionEvent, CollectionStatus, Location, NewCollection};

#[derive(Subcommand, Debug)]
pub enum CollectCommands {
    /// Register a new harvest
    New(NewArgs),

    /// List collection events
    List(ListArgs),

    /// Show one collection event
    Show(ShowArgs),

    /// Directly set a collection event's status
    SetStatus(SetStatusArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Herb name (e.g. Ashwagandha)
    #[arg(long)]
    pub herb: Option<String>,

    /// Harvested quantity in kilograms
    #[arg(long)]
    pub quantity: Option<f64>,

    /// Harvest date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub harvest_date: Option<NaiveDate>,

    #[arg(long, default_value_t = 0.0)]
    pub latitude: f64,

    #[arg(long, default_value_t = 0.0)]
    pub longitude: f64,

    /// Free-text harvest location
    #[arg(long, default_value = "")]
    pub address: String,

    /// Farmer name (defaults to the configured operator)
    #[arg(long)]
    pub farmer: Option<String>,

    /// Use interactive wizard to fill in fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by herb name (case-insensitive substring)
    #[arg(long)]
    pub herb: Option<String>,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Collection id or batch code (prefix match)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetStatusArgs {
    /// Collection id or batch code (prefix match)
    pub id: String,

    /// New status (collected/processing/processed/tested/approved/rejected/manufactured)
    pub status: String,
}

pub fn run(cmd: CollectCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CollectCommands::New(args) => run_new(args, global),
        CollectCommands::List(args) => run_list(args, global),
        CollectCommands::Show(args) => run_show(args, global),
        CollectCommands::SetStatus(args) => run_set_status(args),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store()?;
    let config = Config::load(Some(&project));
    let theme = ColorfulTheme::default();

    let (herb_name, quantity_kg, address) = if args.interactive {
        let herb: String = Input::with_theme(&theme)
            .with_prompt("Herb name")
            .interact_text()
            .into_diagnostic()?;

        let quantity: f64 = Input::with_theme(&theme)
            .with_prompt("Quantity (kg)")
            .interact_text()
            .into_diagnostic()?;

        let address: String = Input::with_theme(&theme)
            .with_prompt("Harvest location (free text)")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;

        (herb, quantity, address)
    } else {
        let herb = args
            .herb
            .ok_or_else(|| miette::miette!("--herb is required (or use -i)"))?;
        let quantity = args
            .quantity
            .ok_or_else(|| miette::miette!("--quantity is required (or use -i)"))?;
        (herb, quantity, args.address)
    };

    let farmer_name = args.farmer.unwrap_or_else(|| config.operator());
    let new = NewCollection {
        farmer_id: config.operator_id(),
        farmer_name,
        herb_name,
        location: Location {
            latitude: args.latitude,
            longitude: args.longitude,
            address,
        },
        quantity_kg,
        harvest_date: args.harvest_date.unwrap_or_else(|| Utc::now().date_naive()),
    };

    let event = store.add_collection(new).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", event.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&event).into_diagnostic()?)
        }
        _ => {
            println!(
                "{} Registered collection {}",
                style("✓").green(),
                style(&event.id).cyan()
            );
            println!(
                "   Batch {} - {} {} kg",
                style(&event.batch_code).yellow(),
                event.herb_name,
                event.quantity_kg
            );
        }
    }

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let mut events: Vec<&CollectionEvent> = store
        .collections()
        .iter()
        .filter(|c| args.status.matches(c.status))
        .filter(|c| match &args.herb {
            Some(herb) => c.herb_name.to_lowercase().contains(&herb.to_lowercase()),
            None => true,
        })
        .collect();
    events.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    if let Some(limit) = args.limit {
        events.truncate(limit);
    }

    if args.count {
        println!("{}", events.len());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&events).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            for event in &events {
                println!("{}", event.id);
            }
            return Ok(());
        }
        OutputFormat::Tsv => {
            for event in &events {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    event.id,
                    event.batch_code,
                    event.herb_name,
                    event.quantity_kg,
                    event.harvest_date,
                    event.status
                );
            }
            return Ok(());
        }
        _ => {}
    }

    if events.is_empty() {
        println!("No collection events found.");
        println!();
        println!("Register one with: {}", style("hbt collect new").yellow());
        return Ok(());
    }

    println!(
        "{:<20} {:<18} {:<20} {:>8} {:<12} {:<12}",
        style("ID").bold(),
        style("BATCH").bold(),
        style("HERB").bold(),
        style("KG").bold(),
        style("HARVEST").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(94));

    for event in &events {
        println!(
            "{:<20} {:<18} {:<20} {:>8.1} {:<12} {:<12}",
            truncate_str(&event.id, 18),
            event.batch_code,
            truncate_str(&event.herb_name, 18),
            event.quantity_kg,
            event.harvest_date.to_string(),
            event.status.to_string()
        );
    }

    println!();
    println!("{} collection event(s) found", style(events.len()).cyan());

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let event = store
        .find_collection(&args.id)
        .ok_or_else(|| miette::miette!("No collection event matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(event).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", event.id);
            return Ok(());
        }
        _ => {}
    }

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&event.id).cyan());
    println!(
        "{}: {}",
        style("Batch").bold(),
        style(&event.batch_code).yellow()
    );
    println!("{}: {}", style("Herb").bold(), event.herb_name);
    println!("{}: {} kg", style("Quantity").bold(), event.quantity_kg);
    println!("{}: {}", style("Harvested").bold(), event.harvest_date);
    println!("{}: {}", style("Status").bold(), event.status);
    println!(
        "{}: {} ({}, {})",
        style("Location").bold(),
        if event.location.address.is_empty() {
            "-"
        } else {
            &event.location.address
        },
        event.location.latitude,
        event.location.longitude
    );
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} | {}: {}",
        style("Farmer").dim(),
        event.farmer_name,
        style("Created").dim(),
        event.created_at.format("%Y-%m-%d %H:%M")
    );

    Ok(())
}

fn run_set_status(args: SetStatusArgs) -> Result<()> {
    let (_, mut store) = open_store()?;

    let status = CollectionStatus::parse(&args.status).ok_or_else(|| {
        miette::miette!(
            "Invalid status: '{}'. Use collected/processing/processed/tested/approved/rejected/manufactured",
            args.status
        )
    })?;

    let id = store
        .find_collection(&args.id)
        .map(|c| c.id.clone())
        .ok_or_else(|| miette::miette!("No collection event matching '{}'", args.id))?;

    store
        .set_collection_status(&id, status)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {} is now {}",
        style("✓").green(),
        style(&id).cyan(),
        style(status).yellow()
    );

    Ok(())
}
