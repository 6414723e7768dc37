mod commands;
mod config;
mod context;
mod convert;
mod error;
mod iac;
mod output;
mod remote;
#[cfg(test)]
mod test_helpers;
mod traits;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{ConvertArgs, ConvertCommand};
use context::Context;

#[derive(Parser)]
#[command(name = "appconv")]
#[command(about = "Convert identity-provider apps between resource types through Terraform/OpenTofu", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import apps of the source type and declare them as the destination type
    Convert(ConvertArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new();

    match cli.command {
        Commands::Convert(args) => {
            ConvertCommand::execute(&ctx, args)?;
        }
    }

    Ok(())
}
