//! Layered configuration for the CLI
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file
//! (`dupcheck.toml` in the working directory, or `--config`), then
//! environment variables such as `DUPCHECK__SERVER__PORT=9090`.

use crate::cli::error::{CliError, CliResult};
use dupcheck::core::service::{DEFAULT_ATTRIBUTE_FIELD, DEFAULT_RECORD_KIND};
use dupcheck::storage::seed::{apply_seed, SeedSummary};
use dupcheck::storage::SeedFile;
use dupcheck::{
    HttpServerConfig, InMemoryStore, RecordStore, ServiceConfig, SqliteStore, StoreConfig,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "dupcheck.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    pub default_kind: String,
    pub attribute_field: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            default_kind: DEFAULT_RECORD_KIND.to_string(),
            attribute_field: DEFAULT_ATTRIBUTE_FIELD.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// `sqlite` or `memory`
    pub backend: String,
    pub path: PathBuf,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            path: PathBuf::from("./data/dupcheck.db"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        let defaults = HttpServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            allowed_origins: defaults.allowed_origins,
        }
    }
}

/// Configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSection,
    pub store: StoreSection,
    pub server: ServerSection,
}

impl AppConfig {
    /// Convert into the library's service configuration
    pub fn into_service_config(self) -> CliResult<ServiceConfig> {
        let store = match self.store.backend.as_str() {
            "sqlite" => StoreConfig::Sqlite {
                path: self.store.path,
            },
            "memory" => StoreConfig::Memory,
            other => {
                return Err(CliError::Config(format!(
                    "Unknown store backend '{}' (expected 'sqlite' or 'memory')",
                    other
                )))
            }
        };

        Ok(ServiceConfig {
            default_kind: self.service.default_kind,
            attribute_field: self.service.attribute_field,
            store,
            http_server: HttpServerConfig {
                host: self.server.host,
                port: self.server.port,
                allowed_origins: self.server.allowed_origins,
            },
        })
    }
}

/// Load configuration. An explicit `config_path` must exist; the default file is optional.
pub fn load_config(config_path: Option<&Path>) -> CliResult<AppConfig> {
    let (path, required) = match config_path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    if required && !path.exists() {
        return Err(CliError::Config(format!(
            "Config file not found: {}",
            path.display()
        )));
    }

    debug!("Loading configuration from {}", path.display());

    let settings = config::Config::builder()
        .add_source(
            config::File::new(&path.to_string_lossy(), config::FileFormat::Toml)
                .required(required),
        )
        .add_source(
            config::Environment::with_prefix("DUPCHECK")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize::<AppConfig>()?)
}

/// A store opened from configuration, keeping its concrete type for seeding
#[derive(Clone)]
pub enum OpenedStore {
    Memory(Arc<InMemoryStore>),
    Sqlite(Arc<SqliteStore>),
}

impl OpenedStore {
    pub async fn open(config: &StoreConfig) -> CliResult<Self> {
        Ok(match config {
            StoreConfig::Memory => OpenedStore::Memory(Arc::new(InMemoryStore::new())),
            StoreConfig::Sqlite { path } => {
                OpenedStore::Sqlite(Arc::new(SqliteStore::open(path.clone()).await?))
            }
        })
    }

    pub fn record_store(&self) -> Arc<dyn RecordStore> {
        match self {
            OpenedStore::Memory(store) => store.clone(),
            OpenedStore::Sqlite(store) => store.clone(),
        }
    }

    pub async fn seed_from(&self, path: &Path) -> CliResult<SeedSummary> {
        let seed = SeedFile::load(path)?;
        let summary = match self {
            OpenedStore::Memory(store) => apply_seed(store.as_ref(), &seed).await?,
            OpenedStore::Sqlite(store) => apply_seed(store.as_ref(), &seed).await?,
        };
        Ok(summary)
    }
}
