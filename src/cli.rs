//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "astroalert", version, about = "Planetary aspect trading alerts")]
pub struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the evaluation loop (the default).
    Run,
    /// Evaluate one tick and print the reports instead of delivering them.
    Once {
        /// Deliver the reports as well.
        #[arg(long)]
        send: bool,
    },
    /// Send a connectivity probe to the messaging endpoint.
    Check,
}
