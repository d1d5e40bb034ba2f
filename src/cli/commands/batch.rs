//! `hbt batch` command - processing batches (the processor's portal)

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{open_store, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::entities::processing::{BatchPatch, BatchStatus, NewBatch, ProcessingBatch, Stages};

#[derive(Subcommand, Debug)]
pub enum BatchCommands {
    /// Start processing a collection event
    New(NewArgs),

    /// Mark processing stages as done
    Stage(StageArgs),

    /// Mark a batch completed
    Complete(CompleteArgs),

    /// List processing batches
    List(ListArgs),

    /// Show one processing batch
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Collection event to process (id or batch code, prefix match)
    pub source: String,

    /// Free-text processing notes
    #[arg(long, default_value = "")]
    pub notes: String,

    /// Processor id (defaults to the configured operator id)
    #[arg(long)]
    pub processor: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct StageArgs {
    /// Batch id (prefix match)
    pub id: String,

    #[arg(long)]
    pub cleaning: bool,

    #[arg(long)]
    pub drying: bool,

    #[arg(long)]
    pub grinding: bool,

    #[arg(long)]
    pub packaging: bool,

    #[arg(long)]
    pub quality_check: bool,

    /// Replace the batch notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CompleteArgs {
    /// Batch id (prefix match)
    pub id: String,

    /// Replace the batch notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only batches still in processing
    #[arg(long)]
    pub open: bool,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Batch id (prefix match)
    pub id: String,
}

pub fn run(cmd: BatchCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        BatchCommands::New(args) => run_new(args, global),
        BatchCommands::Stage(args) => run_stage(args),
        BatchCommands::Complete(args) => run_complete(args),
        BatchCommands::List(args) => run_list(args, global),
        BatchCommands::Show(args) => run_show(args, global),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let (project, mut store) = open_store()?;
    let config = Config::load(Some(&project));

    let source = store
        .find_collection(&args.source)
        .ok_or_else(|| miette::miette!("No collection event matching '{}'", args.source))?;

    let new = NewBatch {
        source_id: source.id.clone(),
        herb_name: source.herb_name.clone(),
        farmer_name: source.farmer_name.clone(),
        processor_id: args.processor.unwrap_or_else(|| config.operator_id()),
        notes: args.notes,
        stages: Stages::default(),
    };

    let batch = store.add_batch(new).map_err(|e| miette::miette!("{}", e))?;

    match global.format {
        OutputFormat::Id => println!("{}", batch.id),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&batch).into_diagnostic()?)
        }
        _ => {
            println!(
                "{} Created batch {} from {}",
                style("✓").green(),
                style(&batch.id).cyan(),
                style(&batch.source_id).yellow()
            );
            println!("   Source collection marked processing");
        }
    }

    Ok(())
}

fn run_stage(args: StageArgs) -> Result<()> {
    let (_, mut store) = open_store()?;

    let current = store
        .find_batch(&args.id)
        .ok_or_else(|| miette::miette!("No processing batch matching '{}'", args.id))?;
    let id = current.id.clone();

    let mut stages = current.stages;
    stages.merge(Stages {
        cleaning: args.cleaning,
        drying: args.drying,
        grinding: args.grinding,
        packaging: args.packaging,
        quality_check: args.quality_check,
    });

    let updated = store
        .update_batch(
            &id,
            BatchPatch {
                stages: Some(stages),
                notes: args.notes,
                status: None,
            },
        )
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No processing batch matching '{}'", args.id))?;

    println!(
        "{} {} - {}/5 stages done",
        style("✓").green(),
        style(&updated.id).cyan(),
        updated.stages.completed_count()
    );
    if updated.stages.all_done() {
        println!(
            "   All stages done. Finish with: {}",
            style(format!("hbt batch complete {}", updated.id)).yellow()
        );
    }

    Ok(())
}

fn run_complete(args: CompleteArgs) -> Result<()> {
    let (_, mut store) = open_store()?;

    let id = store
        .find_batch(&args.id)
        .map(|b| b.id.clone())
        .ok_or_else(|| miette::miette!("No processing batch matching '{}'", args.id))?;

    let updated = store
        .update_batch(
            &id,
            BatchPatch {
                stages: None,
                notes: args.notes,
                status: Some(BatchStatus::Completed),
            },
        )
        .map_err(|e| miette::miette!("{}", e))?
        .ok_or_else(|| miette::miette!("No processing batch matching '{}'", args.id))?;

    println!(
        "{} Batch {} completed",
        style("✓").green(),
        style(&updated.id).cyan()
    );
    println!("   Source collection marked processed");

    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let batches: Vec<&ProcessingBatch> = store
        .batches()
        .iter()
        .filter(|b| !args.open || b.status == BatchStatus::Processing)
        .collect();

    if args.count {
        println!("{}", batches.len());
        return Ok(());
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&batches).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            for batch in &batches {
                println!("{}", batch.id);
            }
            return Ok(());
        }
        OutputFormat::Tsv => {
            for batch in &batches {
                println!(
                    "{}\t{}\t{}\t{}/5\t{}",
                    batch.id,
                    batch.source_id,
                    batch.herb_name,
                    batch.stages.completed_count(),
                    batch.status
                );
            }
            return Ok(());
        }
        _ => {}
    }

    if batches.is_empty() {
        println!("No processing batches found.");
        return Ok(());
    }

    println!(
        "{:<20} {:<20} {:<20} {:<8} {:<12}",
        style("ID").bold(),
        style("SOURCE").bold(),
        style("HERB").bold(),
        style("STAGES").bold(),
        style("STATUS").bold()
    );
    println!("{}", "-".repeat(82));

    for batch in &batches {
        println!(
            "{:<20} {:<20} {:<20} {:<8} {:<12}",
            truncate_str(&batch.id, 18),
            truncate_str(&batch.source_id, 18),
            truncate_str(&batch.herb_name, 18),
            format!("{}/5", batch.stages.completed_count()),
            batch.status.to_string()
        );
    }

    println!();
    println!("{} batch(es) found", style(batches.len()).cyan());

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (_, store) = open_store()?;

    let batch = store
        .find_batch(&args.id)
        .ok_or_else(|| miette::miette!("No processing batch matching '{}'", args.id))?;

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(batch).into_diagnostic()?);
            return Ok(());
        }
        OutputFormat::Id => {
            println!("{}", batch.id);
            return Ok(());
        }
        _ => {}
    }

    let stage_mark = |done: bool| if done { style("✓").green() } else { style("·").dim() };

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&batch.id).cyan());
    println!(
        "{}: {}",
        style("Source").bold(),
        style(&batch.source_id).yellow()
    );
    println!("{}: {}", style("Herb").bold(), batch.herb_name);
    println!("{}: {}", style("Farmer").bold(), batch.farmer_name);
    println!("{}: {}", style("Processor").bold(), batch.processor_id);
    println!("{}: {}", style("Status").bold(), batch.status);
    println!("{}", style("Stages:").bold());
    println!("  {} cleaning", stage_mark(batch.stages.cleaning));
    println!("  {} drying", stage_mark(batch.stages.drying));
    println!("  {} grinding", stage_mark(batch.stages.grinding));
    println!("  {} packaging", stage_mark(batch.stages.packaging));
    println!("  {} quality check", stage_mark(batch.stages.quality_check));
    if !batch.notes.is_empty() {
        println!("{}: {}", style("Notes").bold(), batch.notes);
    }
    if let Some(completed_at) = batch.completed_at {
        println!(
            "{}: {}",
            style("Completed").bold(),
            completed_at.format("%Y-%m-%d %H:%M")
        );
    }
    println!("{}", style("─".repeat(60)).dim());

    Ok(())
}
