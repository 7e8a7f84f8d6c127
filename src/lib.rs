//! # dupcheck
//!
//! Duplicate and similarity detection for coded records (e.g. chart-of-accounts
//! entries) held in a multi-tenant generic entity store.
//!
//! ## Architecture
//!
//! The service layer provides:
//! - A normalized Levenshtein similarity metric
//! - Loading of a tenant's active records of one kind
//! - Alternative code suggestions for structured numeric codes
//! - Batch duplicate checks over codes and names
//! - SQLite and in-memory store backends, plus an HTTP API
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dupcheck::{CheckOptions, DupCheckService, DuplicateCheckRequest, RecordKind, ServiceConfig, TenantId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DupCheckService::new(ServiceConfig::default()).await?;
//!
//!     let request = DuplicateCheckRequest {
//!         tenant_id: TenantId::new("org-1")?,
//!         kind: RecordKind::new("ledger-account")?,
//!         candidate_codes: vec!["4000001".to_string()],
//!         candidate_names: vec!["Petty Cash".to_string()],
//!         options: CheckOptions {
//!             check_similar: true,
//!             suggest_alternatives: true,
//!         },
//!     };
//!
//!     let report = service.checker().check_duplicates(&request).await?;
//!     println!("{} duplicates", report.summary.duplicates);
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod http;
pub mod storage;

pub use core::duplicate_check::{
    CheckOptions, CheckStatus, CheckSummary, DuplicateCheckReport, DuplicateCheckRequest,
    DuplicateChecker, SingleCodeResult,
};
pub use core::loader::ExistingRecord;
pub use core::service::{
    DupCheckService, HttpServerConfig, RecordKind, ServiceConfig, ServiceError, StoreConfig,
    TenantId,
};
pub use core::similarity::similarity;
pub use storage::{InMemoryStore, RecordStore, SqliteStore};

/// Version of the service layer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging for the service layer (safe for testing)
pub fn init_logging() {
    init_logging_with_default("dupcheck=warn");
}

/// Initialize logging with a fallback filter used when `RUST_LOG` is unset
pub fn init_logging_with_default(default_filter: &str) {
    // Only initialize logging once
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

        // This will fail silently if already initialized
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
