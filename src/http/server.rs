//! Axum HTTP server implementation

use crate::core::service::{DupCheckService, HttpServerConfig};
use crate::http::handlers::{duplicate_check, status, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Build the CORS layer from configured origins. No origins means no cross-origin access.
pub fn build_cors_layer(config: &HttpServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        warn!("No CORS origins configured; cross-origin requests will be rejected");
    }

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(origins)
}

/// Create the Axum router with all routes
pub fn build_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.service.config().http_server);

    Router::new()
        .route(
            "/api/duplicate-check",
            get(duplicate_check::check_single_code).post(duplicate_check::check_duplicates),
        )
        .route("/api/status", get(status::status))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(cors),
        )
        .with_state(state)
}

/// Duplicate-check HTTP server
pub struct DupCheckServer {
    service: Arc<DupCheckService>,
    addr: SocketAddr,
}

impl DupCheckServer {
    /// Create a new server instance
    pub fn new(service: Arc<DupCheckService>, host: &str, port: u16) -> Result<Self, String> {
        let addr = Self::parse_address(host, port)?;
        Ok(Self { service, addr })
    }

    /// Parse and normalize host:port into a SocketAddr
    fn parse_address(host: &str, port: u16) -> Result<SocketAddr, String> {
        let normalized_host = Self::normalize_host(host);

        // IPv6 addresses need brackets
        let addr_str = if normalized_host.contains(':') {
            format!("[{}]:{}", normalized_host, port)
        } else {
            format!("{}:{}", normalized_host, port)
        };

        addr_str.parse().map_err(|_| {
            format!(
                "Unable to parse address '{}'. Use IP addresses like '127.0.0.1', '0.0.0.0' or '::1'",
                addr_str
            )
        })
    }

    /// Normalize hostnames for SocketAddr compatibility
    fn normalize_host(host: &str) -> String {
        match host {
            "localhost" => "127.0.0.1".to_string(),
            "::1" | "[::1]" => "::1".to_string(),
            "::" | "[::]" => "::".to_string(),
            _ => host.to_string(),
        }
    }

    /// Start the server and run until Ctrl-C
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = build_router(AppState::new(self.service.clone()));

        info!("Starting dupcheck HTTP server on {}", self.addr);

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        let actual_addr = listener.local_addr()?;
        info!("Server bound to {}", actual_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    /// Get server address
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
