//! Packwalk CLI - fetches dependencies and renders build files

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use packwalk::ops::ResolveError;
use packwalk::util::diagnostic::emit;

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color && std::io::stderr().is_terminal();

    if let Err(e) = run(cli, color) {
        match e.downcast_ref::<ResolveError>() {
            Some(resolve_error) => emit(&resolve_error.to_diagnostic(), color),
            None => eprintln!("error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, color: bool) -> Result<()> {
    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("packwalk=debug")
    } else {
        EnvFilter::new("packwalk=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        None => commands::generate::execute(cli.submodules, color),
        Some(Commands::Freeze(args)) => commands::freeze::execute(args, color),
    }
}
