mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;

use cli::{CacheCommand, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rip(args) => {
            commands::rip::handle(args)?;
        }

        Commands::Convert(args) => {
            commands::convert::handle(args)?;
        }

        Commands::Cache { command } => match command {
            CacheCommand::Clear => commands::cache::clear()?,
            CacheCommand::Show => commands::cache::show()?,
        },

        Commands::Configure { rom, show } => {
            commands::configure::handle(rom, show)?;
        }
    }

    Ok(())
}
