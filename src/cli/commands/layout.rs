//! Layout page commands

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use super::connect;
use crate::api::PlacementsSelector;
use crate::config::Config;

#[derive(Subcommand)]
pub enum LayoutCommands {
    /// Show a layout page by its full path
    Show {
        path: String,
        #[arg(long)]
        env: Option<String>,
    },
    /// Create a layout page under a facility path
    Create {
        /// Facility path the page is created under
        path: String,
        /// Page name
        name: String,
        #[arg(long)]
        env: Option<String>,
    },
    /// List placements on a layout page
    Placements {
        /// Full path of the layout page
        path: String,
        #[arg(long)]
        env: Option<String>,
        /// Only placements whose identification starts with this prefix
        #[arg(long)]
        identification_prefix: Option<String>,
        /// Only placements of this symbol/macro path
        #[arg(long)]
        type_path: Option<String>,
    },
    /// Mark placements for deletion (or clear the mark)
    MarkForDeletion {
        /// Full path of the layout page
        path: String,
        #[arg(long)]
        env: Option<String>,
        /// Only placements whose identification starts with this prefix;
        /// without it, all placements on the page are selected
        #[arg(long)]
        identification_prefix: Option<String>,
        /// Clear the mark instead of setting it
        #[arg(long)]
        clear: bool,
    },
}

pub async fn handle_layout_command(command: LayoutCommands) -> Result<()> {
    let config = Config::load()?;

    match command {
        LayoutCommands::Show { path, env } => {
            let (_, environment) = config.environment(env.as_deref())?;
            let client = connect(environment).await?;
            match client.get_layout_page(&path).await? {
                Some(page) => println!(
                    "{} - {} ({})",
                    page.layout_guid,
                    page.path.as_deref().unwrap_or(&path),
                    page.name.as_deref().unwrap_or_default()
                ),
                None => println!("Layout page '{}' not found", path),
            }
        }
        LayoutCommands::Create { path, name, env } => {
            let (_, environment) = config.environment(env.as_deref())?;
            let client = connect(environment).await?;
            let page = client.create_layout_page(&path, &name).await?;
            println!(
                "Created layout page {} - {}/{}",
                page.layout_guid,
                path,
                name.bright_green()
            );
        }
        LayoutCommands::Placements {
            path,
            env,
            identification_prefix,
            type_path,
        } => {
            let (_, environment) = config.environment(env.as_deref())?;
            let client = connect(environment).await?;
            let page = match client.get_layout_page(&path).await? {
                Some(page) => page,
                None => {
                    println!("Layout page '{}' not found", path);
                    return Ok(());
                }
            };

            let placements = client
                .get_placements(
                    page.layout_guid,
                    &environment.data_language,
                    None,
                    identification_prefix.as_deref(),
                    type_path.as_deref(),
                )
                .await?;

            println!("{} placements:", placements.len());
            for placement in placements {
                println!(
                    "  {} - {} at ({}, {}) rot {:.2}, {} attribute values",
                    placement.header.guid,
                    placement
                        .header
                        .identification
                        .as_deref()
                        .unwrap_or_default()
                        .green(),
                    placement.location.x,
                    placement.location.y,
                    placement.rotation_z,
                    placement.attribute_value_parts.len()
                );
            }
        }
        LayoutCommands::MarkForDeletion {
            path,
            env,
            identification_prefix,
            clear,
        } => {
            let (_, environment) = config.environment(env.as_deref())?;
            let client = connect(environment).await?;
            let page = match client.get_layout_page(&path).await? {
                Some(page) => page,
                None => bail!("Layout page '{}' not found", path),
            };

            let selector = match identification_prefix {
                Some(prefix) => PlacementsSelector::identification_prefix(prefix),
                None => PlacementsSelector::all(),
            };
            client
                .update_marked_for_deletion(page.layout_guid, selector, !clear)
                .await?;
            println!(
                "{} deletion mark on '{}'",
                if clear { "Cleared" } else { "Set" },
                path
            );
        }
    }

    Ok(())
}
