//! Main duplicate-check service implementation

use crate::core::duplicate_check::DuplicateChecker;
use crate::storage::{InMemoryStore, RecordStore, SqliteStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Default record kind when a request does not name one
pub const DEFAULT_RECORD_KIND: &str = "ledger-account";

/// Default dynamic field carrying the auxiliary classification of a record
pub const DEFAULT_ATTRIBUTE_FIELD: &str = "account_type";

/// Backing store selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Volatile in-process store (tests, demos)
    Memory,

    /// SQLite database holding the generic entity tables
    Sqlite { path: PathBuf },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Sqlite {
            path: PathBuf::from("./data/dupcheck.db"),
        }
    }
}

impl StoreConfig {
    /// Short backend name for status output
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::Sqlite { .. } => "sqlite",
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// List of origins allowed for CORS. Empty denies cross-origin requests.
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            allowed_origins: Vec::new(),
        }
    }
}

/// Main service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Record kind used when a request omits one
    pub default_kind: String,

    /// Dynamic field loaded alongside each record (cosmetic, never compared)
    pub attribute_field: String,

    /// Store backend
    pub store: StoreConfig,

    /// HTTP server configuration
    pub http_server: HttpServerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_kind: DEFAULT_RECORD_KIND.to_string(),
            attribute_field: DEFAULT_ATTRIBUTE_FIELD.to_string(),
            store: StoreConfig::default(),
            http_server: HttpServerConfig::default(),
        }
    }
}

/// Tenant (organization) identifier. Every record belongs to exactly one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new TenantId with validation
    pub fn new(id: impl Into<String>) -> Result<Self, ServiceError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Tenant ID cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > 255 {
            return Err(ServiceError::InvalidRequest(
                "Tenant ID too long (max 255 characters)".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Get the string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TenantId {
    type Error = ServiceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        TenantId::new(s)
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for TenantId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for TenantId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        TenantId::new(s).map_err(serde::de::Error::custom)
    }
}

/// Record kind tag, e.g. `ledger-account`. Only records of the same kind are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKind(String);

impl RecordKind {
    /// Create a new RecordKind with validation
    pub fn new(kind: impl Into<String>) -> Result<Self, ServiceError> {
        let kind = kind.into();
        let trimmed = kind.trim();
        if trimmed.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Record kind cannot be empty".to_string(),
            ));
        }
        if trimmed.len() > 100 {
            return Err(ServiceError::InvalidRequest(
                "Record kind too long (max 100 characters)".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RecordKind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for RecordKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for RecordKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordKind::new(s).map_err(serde::de::Error::custom)
    }
}

/// Main service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to load existing records: {0}")]
    LoadFailure(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Whether the caller may safely repeat the call unchanged
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::LoadFailure(_))
    }
}

/// Main duplicate-check service: owns the store and hands out the checker
pub struct DupCheckService {
    config: ServiceConfig,
    store: Arc<dyn RecordStore>,
    checker: Arc<DuplicateChecker>,
}

impl DupCheckService {
    /// Create a service, opening the store named in the configuration
    pub async fn new(config: ServiceConfig) -> Result<Self, ServiceError> {
        crate::init_logging();

        info!("Initializing dupcheck service v{}", crate::VERSION);

        let store: Arc<dyn RecordStore> = match &config.store {
            StoreConfig::Memory => Arc::new(InMemoryStore::new()),
            StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path.clone()).await?),
        };

        Ok(Self::with_store(config, store))
    }

    /// Create a service over an already constructed store
    pub fn with_store(config: ServiceConfig, store: Arc<dyn RecordStore>) -> Self {
        let checker = Arc::new(DuplicateChecker::new(
            store.clone(),
            config.attribute_field.clone(),
        ));
        Self {
            config,
            store,
            checker,
        }
    }

    /// Get the duplicate checker
    pub fn checker(&self) -> Arc<DuplicateChecker> {
        self.checker.clone()
    }

    /// Get the record store
    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Get service configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Resolve an optional request kind against the configured default
    pub fn resolve_kind(&self, kind: Option<&str>) -> Result<RecordKind, ServiceError> {
        match kind {
            Some(k) if !k.trim().is_empty() => RecordKind::new(k),
            _ => RecordKind::new(self.config.default_kind.clone()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_new_validates_input() {
        assert!(TenantId::new("org-1").is_ok());
        assert_eq!(TenantId::new("  org-1 ").unwrap().as_str(), "org-1");
        assert!(TenantId::new("").is_err());
        assert!(TenantId::new("   ").is_err());
        assert!(TenantId::new("x".repeat(256)).is_err());
    }

    #[test]
    fn test_record_kind_deserialize_rejects_blank() {
        let ok: Result<RecordKind, _> = serde_json::from_str("\"ledger-account\"");
        assert!(ok.is_ok());
        let blank: Result<RecordKind, _> = serde_json::from_str("\"\"");
        assert!(blank.is_err());
    }

    #[test]
    fn test_only_load_failure_is_retryable() {
        assert!(ServiceError::LoadFailure("down".into()).is_retryable());
        assert!(!ServiceError::InvalidRequest("bad".into()).is_retryable());
    }

    #[tokio::test]
    async fn test_memory_service_resolves_default_kind() {
        let config = ServiceConfig {
            store: StoreConfig::Memory,
            ..Default::default()
        };
        let service = DupCheckService::new(config).await.unwrap();
        assert_eq!(service.resolve_kind(None).unwrap().as_str(), "ledger-account");
        assert_eq!(service.resolve_kind(Some(" ")).unwrap().as_str(), "ledger-account");
        assert_eq!(service.resolve_kind(Some("vendor")).unwrap().as_str(), "vendor");
    }
}
