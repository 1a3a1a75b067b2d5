//! Command handlers

pub mod auth;
pub mod import;
pub mod layout;

use anyhow::{Context, Result};

use crate::api::So3Client;
use crate::config::Environment;

/// Build a logged-in client for the given environment.
///
/// The password comes from `SO3_PASSWORD` (a `.env` file works) or an
/// interactive prompt; it is never read from the config file.
pub async fn connect(environment: &Environment) -> Result<So3Client> {
    let password = match std::env::var("SO3_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => rpassword::prompt_password(format!("Password for {}: ", environment.username))
            .context("Failed to read password")?,
    };

    let mut client = So3Client::new(&environment.url)?;
    client
        .login(&environment.username, &password)
        .await
        .with_context(|| format!("Login to '{}' failed", environment.url))?;
    Ok(client)
}
