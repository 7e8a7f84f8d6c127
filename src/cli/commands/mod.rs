//! Command modules for CLI

pub mod check;
pub mod seed;
pub mod serve;
pub mod version;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
#[command(about = "dupcheck commands")]
pub enum Commands {
    /// Check candidate codes and names against existing records
    #[command(about = "Check candidate codes and names for duplicates")]
    Check(check::CheckArgs),

    /// Load organizations and records from a JSON seed file
    #[command(about = "Load organizations and records from a JSON seed file")]
    Seed(seed::SeedArgs),

    /// Serve the duplicate check HTTP API
    #[command(about = "Serve the duplicate check HTTP API")]
    Serve(serve::ServeArgs),

    /// Show version information
    #[command(about = "Show version information")]
    Version(version::VersionArgs),
}
