//! Serve command implementation

use crate::cli::config::OpenedStore;
use crate::cli::error::{CliError, CliResult};
use clap::Args;
use dupcheck::http::DupCheckServer;
use dupcheck::{DupCheckService, ServiceConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Serve the duplicate check service via HTTP API
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Host to bind the server to
    #[arg(long, help = "Host to bind the server to (default from config)")]
    pub host: Option<String>,

    /// Port to bind the server to
    #[arg(long, help = "Port to bind the server to (default from config)")]
    pub port: Option<u16>,

    /// Seed file applied to the store before serving
    #[arg(long, help = "JSON seed file to load before serving")]
    pub seed: Option<PathBuf>,
}

pub async fn execute_serve(
    mut config: ServiceConfig,
    store: OpenedStore,
    args: ServeArgs,
) -> CliResult<()> {
    if let Some(host) = args.host {
        config.http_server.host = host;
    }
    if let Some(port) = args.port {
        config.http_server.port = port;
    }

    if let Some(seed) = &args.seed {
        let summary = store.seed_from(seed).await?;
        info!(
            "Loaded seed {}: {} organizations, {} new records, {} updated records",
            seed.display(),
            summary.organizations,
            summary.records,
            summary.updated
        );
    }

    let host = config.http_server.host.clone();
    let port = config.http_server.port;
    info!("Starting dupcheck HTTP server on {}:{}", host, port);

    println!("dupcheck HTTP server starting...");
    println!("  Listening on: http://{}:{}", host, port);
    println!("  Store backend: {}", config.store.backend_name());

    let service = Arc::new(DupCheckService::with_store(config, store.record_store()));
    let server = DupCheckServer::new(service, &host, port).map_err(CliError::Server)?;

    // Blocks until shutdown
    server
        .serve()
        .await
        .map_err(|e| CliError::Server(e.to_string()))?;

    Ok(())
}
