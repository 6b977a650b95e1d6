//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Download package dependencies and create build files.
///
/// Without a subcommand, reads package.yml in the current directory, fetches
/// missing dependencies and renders the declared templates.
#[derive(Parser)]
#[command(name = "packwalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Register dependencies as git submodules instead of cloning them
    #[arg(long)]
    pub submodules: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pin or restore the commits of fetched dependencies
    Freeze(FreezeArgs),
}

#[derive(Args)]
pub struct FreezeArgs {
    #[command(subcommand)]
    pub command: FreezeCommands,
}

#[derive(Subcommand)]
pub enum FreezeCommands {
    /// Print the current commit of every dependency as JSON
    Dump(DumpArgs),

    /// Check out the commits recorded in a versions file
    Restore(RestoreArgs),
}

#[derive(Args)]
pub struct DumpArgs {
    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// Versions file produced by `packwalk freeze dump`
    pub file: PathBuf,
}
