//! Seed command implementation

use crate::cli::config::OpenedStore;
use crate::cli::error::{CliError, CliResult};
use clap::Args;
use std::path::PathBuf;

/// Load a seed file into the configured store
#[derive(Debug, Args)]
pub struct SeedArgs {
    /// JSON seed file with organizations and records
    #[arg(help = "Path to JSON seed file")]
    pub file: PathBuf,
}

pub async fn execute_seed(store: OpenedStore, args: SeedArgs) -> CliResult<()> {
    if matches!(store, OpenedStore::Memory(_)) {
        return Err(CliError::Validation(
            "Seeding the memory backend has no lasting effect; use `serve --seed` instead"
                .to_string(),
        ));
    }
    if !args.file.exists() {
        return Err(CliError::Validation(format!(
            "Seed file not found: {}",
            args.file.display()
        )));
    }

    let summary = store.seed_from(&args.file).await?;
    println!(
        "Seeded {} organizations, {} new records, {} updated records, {} attributes",
        summary.organizations, summary.records, summary.updated, summary.attributes
    );
    Ok(())
}
