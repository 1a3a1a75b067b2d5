mod api;
mod cli;
mod config;
mod import;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Auth { command } => cli::commands::auth::handle_auth_command(command),
        Commands::Layout { command } => cli::commands::layout::handle_layout_command(command).await,
        Commands::Import(args) => cli::commands::import::handler::handle_import_command(args).await,
    }
}
