//! Command-line interface

pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "so3-cli",
    version,
    about = "A command-line interface for the SO3 layout service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage SO3 environments
    Auth {
        #[command(subcommand)]
        command: commands::auth::AuthCommands,
    },
    /// Inspect and create layout pages
    Layout {
        #[command(subcommand)]
        command: commands::layout::LayoutCommands,
    },
    /// Import placements from an exported element list
    Import(commands::import::ImportArgs),
}
