use clap::Parser;
use miette::Result;

use hbt::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for readable diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => hbt::cli::commands::init::run(args),
        Commands::Collect(cmd) => hbt::cli::commands::collect::run(cmd, &cli.global),
        Commands::Batch(cmd) => hbt::cli::commands::batch::run(cmd, &cli.global),
        Commands::Lab(cmd) => hbt::cli::commands::lab::run(cmd, &cli.global),
        Commands::Product(cmd) => hbt::cli::commands::product::run(cmd, &cli.global),
        Commands::Trace(args) => hbt::cli::commands::trace::run(args),
        Commands::Validate(args) => hbt::cli::commands::validate::run(args),
    }
}
