//! slicekit CLI - Sliced Sample-Kit Assembler
//!
//! Command-line interface for merging WAV files into sliced kits.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use slicekit::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("slicekit v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Merge(args)) => {
            commands::merge(&args).context("failed to assemble kit")?;
        }
        None => {
            println!("slicekit v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
        }
    }

    Ok(())
}
