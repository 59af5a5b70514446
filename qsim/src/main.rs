//! qsim - run and inspect bounded-queue simulations from the command line

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    qsim_core::init_logging_with_level(&cli.log_level);

    match cli.command {
        cli::Commands::Run(args) => cli::run::execute(args),
        cli::Commands::Validate { config } => cli::validate(&config),
    }
}
