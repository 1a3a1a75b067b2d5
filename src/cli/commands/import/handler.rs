//! Import command handler

use anyhow::{bail, Context, Result};
use colored::Colorize;

use super::ImportArgs;
use crate::cli::commands::connect;
use crate::config::Config;
use crate::import::{ConsoleEvents, Importer};

pub async fn handle_import_command(args: ImportArgs) -> Result<()> {
    if !args.file.exists() {
        bail!("Import file does not exist: {}", args.file.display());
    }

    let config = Config::load()?;
    let (env_name, environment) = config.environment(args.env.as_deref())?;
    println!("Using environment: {}", env_name.bright_green().bold());

    let client = connect(environment).await?;

    let (facility_path, page_name) = split_layout_path(&args.layout)?;
    let page = client
        .ensure_layout_page(facility_path, page_name)
        .await
        .with_context(|| format!("Failed to open layout page '{}'", args.layout))?;

    println!(
        "Importing {} into layout page {}",
        args.file.display().to_string().cyan(),
        args.layout.cyan()
    );

    let data_language = args
        .language
        .as_deref()
        .unwrap_or(&environment.data_language);
    let importer = Importer::new(&client, data_language)
        .with_strategy(environment.identification_strategy);

    let summary = importer
        .import_from_file(&args.file, page.layout_guid, &mut ConsoleEvents)
        .await?;

    println!(
        "Done: {} created, {} failed",
        summary.created.to_string().bright_green(),
        summary.failed.to_string().bright_red()
    );
    if summary.failed > 0 {
        bail!("{} placements failed to import", summary.failed);
    }
    Ok(())
}

/// Split a full layout page path into its facility path and page name
fn split_layout_path(layout: &str) -> Result<(&str, &str)> {
    match layout.trim_end_matches('/').rsplit_once('/') {
        Some((facility, page)) if !facility.is_empty() && !page.is_empty() => Ok((facility, page)),
        _ => bail!(
            "Layout path '{}' must contain a facility path and a page name, \
             e.g. 'SO3/Projects/Demo/F1/page01'",
            layout
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_path_splits_into_facility_and_page() {
        let (facility, page) = split_layout_path("SO3/Projects/Demo/F1/page01").unwrap();
        assert_eq!(facility, "SO3/Projects/Demo/F1");
        assert_eq!(page, "page01");
    }

    #[test]
    fn layout_path_without_a_page_is_rejected() {
        assert!(split_layout_path("page01").is_err());
        assert!(split_layout_path("/page01").is_err());
        assert!(split_layout_path("").is_err());
    }
}
