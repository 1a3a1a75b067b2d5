//! Import command

pub mod handler;

use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct ImportArgs {
    /// Exported element list (.xlsx, .xls or .csv)
    pub file: PathBuf,

    /// Full path of the target layout page, e.g.
    /// 'SO3/Projects/Demo/F1/page01'; created if it does not exist
    #[arg(long)]
    pub layout: String,

    /// Environment to import into (defaults to the selected one)
    #[arg(long)]
    pub env: Option<String>,

    /// Override the environment's data language for this run
    #[arg(long)]
    pub language: Option<String>,
}
