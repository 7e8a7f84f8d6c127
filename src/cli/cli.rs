//! Main CLI application structure

use clap::Parser;
use std::path::PathBuf;

use crate::cli::commands::{check, seed, serve, version, Commands};
use crate::cli::config::{load_config, OpenedStore};
use crate::cli::error::CliResult;

/// dupcheck CLI - detect duplicate and similar coded records
#[derive(Debug, Parser)]
#[command(name = "dupcheck")]
#[command(version = dupcheck::VERSION)]
#[command(about = "dupcheck - detect duplicate and similar coded records")]
#[command(long_about = "dupcheck checks candidate codes and names against a tenant's \
                         existing records.\n\n\
                         Configuration is read from dupcheck.toml (or --config) and \
                         DUPCHECK__* environment variables.\n\n\
                         Examples:\n\
                           dupcheck seed ./seed.json\n\
                           dupcheck check --tenant org-1 --code 4000000 --name \"Petty Cash\"\n\
                           dupcheck serve --port 9090")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to a TOML configuration file
    #[arg(long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        if self.verbose {
            dupcheck::init_logging_with_default("dupcheck=debug");
        } else {
            dupcheck::init_logging();
        }

        // Version needs no configuration or store
        if let Commands::Version(args) = self.command {
            return version::execute_version(args).await;
        }

        let service_config = load_config(self.config.as_deref())?.into_service_config()?;
        if self.verbose {
            eprintln!("Using {} store", service_config.store.backend_name());
        }
        let store = OpenedStore::open(&service_config.store).await?;

        match self.command {
            Commands::Serve(args) => serve::execute_serve(service_config, store, args).await,
            Commands::Check(args) => check::execute_check(service_config, store, args).await,
            Commands::Seed(args) => seed::execute_seed(store, args).await,
            Commands::Version(_) => Ok(()),
        }
    }
}
