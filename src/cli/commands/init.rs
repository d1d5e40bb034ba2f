//! `hbt init` command - project initialization

use clap::Args;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::config::{Config, Role};
use crate::core::project::Project;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (defaults to the current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Operator name recorded on new entries
    #[arg(long)]
    pub operator: Option<String>,

    /// Operator role (farmer/processor/lab/manufacturer/admin)
    #[arg(long)]
    pub role: Option<String>,
}

pub fn run(args: InitArgs) -> Result<()> {
    let role = match args.role.as_deref() {
        Some(r) => Some(Role::parse(r).ok_or_else(|| {
            miette::miette!(
                "Invalid role: '{}'. Use farmer/processor/lab/manufacturer/admin",
                r
            )
        })?),
        None => None,
    };

    let project = Project::init(&args.path).map_err(|e| miette::miette!("{}", e))?;

    let config = Config {
        operator: args.operator.or_else(|| std::env::var("USER").ok()),
        operator_id: None,
        role,
    };
    config.save(&project.config_path()).into_diagnostic()?;

    println!(
        "{} Initialized hbt project in {}",
        style("✓").green(),
        style(project.root().display()).cyan()
    );
    println!(
        "   Ledgers will be written to {}",
        style(project.records_dir().display()).dim()
    );
    println!(
        "   Operator: {} ({})",
        style(config.operator()).yellow(),
        config.role.map(|r| r.to_string()).unwrap_or_else(|| "no role".to_string())
    );

    Ok(())
}
