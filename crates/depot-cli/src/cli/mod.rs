//! CLI for the depot artifact engine.

mod commands;
mod host;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_fetch, run_load, run_resolve, FetchArgs};

/// Top-level CLI for the depot artifact engine.
#[derive(Debug, Parser)]
#[command(name = "depot")]
#[command(about = "depot: fetch, verify, relocate and load Maven artifacts", long_about = None)]
pub struct Cli {
    /// Cache directory (overrides `save_dir` from config.toml).
    #[arg(long, global = true, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download an artifact (and optionally its dependencies) and print what would be loaded.
    Fetch(FetchArgs),

    /// Print the candidate download URLs for an artifact without downloading it.
    Resolve {
        /// Coordinates as group:artifact:version[:classifier].
        coordinates: String,

        /// Extra repository for this artifact (repeatable).
        #[arg(long = "repo", value_name = "URL")]
        repositories: Vec<String>,
    },

    /// Load every library listed in a JSON or TOML manifest.
    Load {
        /// Path to the manifest.
        manifest: PathBuf,
    },

    /// Compute SHA-256 of a file, in the base64 form artifact checksums use and in hex.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let save_dir = cli.save_dir;

        match cli.command {
            CliCommand::Fetch(args) => run_fetch(save_dir, &args)?,
            CliCommand::Resolve {
                coordinates,
                repositories,
            } => run_resolve(save_dir, &coordinates, &repositories)?,
            CliCommand::Load { manifest } => run_load(save_dir, &manifest)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
