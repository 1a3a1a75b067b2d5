//! Environment management commands

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use crate::config::{Config, Environment};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// List configured environments
    List,
    /// Select the environment used by default
    Select { name: String },
    /// Add or update an environment
    Add {
        name: String,
        /// Base URL of the SO3 Web API
        #[arg(long)]
        url: String,
        #[arg(long)]
        username: String,
        /// Locale used for descriptions and queries
        #[arg(long, default_value = "en-US")]
        data_language: String,
    },
    /// Remove an environment
    Remove { name: String },
}

pub fn handle_auth_command(command: AuthCommands) -> Result<()> {
    let mut config = Config::load()?;

    match command {
        AuthCommands::List => {
            if config.environments.is_empty() {
                println!("No environments configured. Use 'so3-cli auth add' to create one.");
                return Ok(());
            }
            for (name, environment) in &config.environments {
                let marker = if config.current_environment.as_deref() == Some(name) {
                    "*".bright_green()
                } else {
                    " ".normal()
                };
                println!(
                    "{} {} - {} ({})",
                    marker,
                    name.bold(),
                    environment.url,
                    environment.username
                );
            }
        }
        AuthCommands::Select { name } => {
            if !config.environments.contains_key(&name) {
                bail!("Unknown environment '{}'", name);
            }
            config.current_environment = Some(name.clone());
            config.save()?;
            println!("Selected environment {}", name.bright_green());
        }
        AuthCommands::Add {
            name,
            url,
            username,
            data_language,
        } => {
            config.environments.insert(
                name.clone(),
                Environment {
                    url,
                    username,
                    data_language,
                    identification_strategy: Default::default(),
                },
            );
            if config.current_environment.is_none() {
                config.current_environment = Some(name.clone());
            }
            config.save()?;
            println!("Saved environment {}", name.bright_green());
        }
        AuthCommands::Remove { name } => {
            if config.environments.remove(&name).is_none() {
                bail!("Unknown environment '{}'", name);
            }
            if config.current_environment.as_deref() == Some(name.as_str()) {
                config.current_environment = None;
            }
            config.save()?;
            println!("Removed environment {}", name);
        }
    }

    Ok(())
}
