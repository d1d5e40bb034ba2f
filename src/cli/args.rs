//! Top-level argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::batch::BatchCommands;
use crate::cli::commands::collect::CollectCommands;
use crate::cli::commands::init::InitArgs;
use crate::cli::commands::lab::LabCommands;
use crate::cli::commands::product::ProductCommands;
use crate::cli::commands::trace::TraceArgs;
use crate::cli::commands::validate::ValidateArgs;

#[derive(Parser, Debug)]
#[command(
    name = "hbt",
    version,
    about = "Plain-text herbal supply-chain traceability toolkit"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone, Copy)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, global = true, default_value = "auto")]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty output for humans, TSV for lists when piped contexts need it
    Auto,
    /// Full record as JSON
    Json,
    /// Record id only
    Id,
    /// Tab-separated values
    Tsv,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new traceability project
    Init(InitArgs),

    /// Record and inspect harvest collection events (farmer)
    #[command(subcommand)]
    Collect(CollectCommands),

    /// Manage processing batches (processor)
    #[command(subcommand)]
    Batch(BatchCommands),

    /// Record lab tests and verdicts (lab analyst)
    #[command(subcommand)]
    Lab(LabCommands),

    /// Assemble finished products (manufacturer)
    #[command(subcommand)]
    Product(ProductCommands),

    /// Follow a record through the whole chain
    Trace(TraceArgs),

    /// Check ledgers for dangling references and status mismatches
    Validate(ValidateArgs),
}
