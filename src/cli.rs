//! Command-line interface for the waiterbot control core, based on clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Delivery robot control core.
#[derive(Debug, Parser)]
#[command(name = "waiterbot", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the configuration file (defaults to ./waiterbot.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enables verbose output (gateway progress feedback on screen).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Runs a scripted delivery round trip against simulated services.
    Demo {
        /// Destination waypoint for the demo order.
        #[arg(long, default_value = "table-3")]
        table: String,

        /// Makes the first navigation goal fail, demonstrating recovery
        /// from the error state via the green button.
        #[arg(long)]
        fail_navigation: bool,
    },

    /// Prints the effective configuration and the initial state.
    Status,
}
