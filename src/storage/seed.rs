//! Seed files for populating a store with tenants and records

use crate::core::service::{RecordKind, ServiceError, TenantId};
use crate::storage::{InMemoryStore, SqliteStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Seed file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedFile {
    #[serde(default)]
    pub organizations: Vec<SeedOrganization>,
    #[serde(default)]
    pub records: Vec<SeedRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOrganization {
    pub id: TenantId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRecord {
    pub organization_id: TenantId,
    pub kind: RecordKind,
    pub name: String,
    pub code: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn default_active() -> bool {
    true
}

/// Counts of rows written by [`apply_seed`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSummary {
    pub organizations: usize,
    /// Records inserted
    pub records: usize,
    /// Records whose tenant, kind and code already existed
    pub updated: usize,
    pub attributes: usize,
}

/// A store that can apply a whole seed file.
///
/// A seed is all-or-nothing: on error nothing it names is written. Records are
/// keyed by tenant, kind and code, so applying the same file again updates the
/// existing records instead of inserting new ones.
#[async_trait]
pub trait SeedTarget: Send + Sync {
    async fn apply(&self, seed: &SeedFile) -> Result<SeedSummary, ServiceError>;
}

#[async_trait]
impl SeedTarget for SqliteStore {
    async fn apply(&self, seed: &SeedFile) -> Result<SeedSummary, ServiceError> {
        self.apply_seed_file(seed.clone()).await
    }
}

#[async_trait]
impl SeedTarget for InMemoryStore {
    async fn apply(&self, seed: &SeedFile) -> Result<SeedSummary, ServiceError> {
        self.apply_seed_file(seed).await
    }
}

impl SeedFile {
    /// Parse a seed file from JSON text
    pub fn from_json(content: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(content)
            .map_err(|e| ServiceError::Config(format!("Invalid seed file: {}", e)))
    }

    /// Read and parse a seed file from disk
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Apply every organization, record and attribute in `seed` to `target`
pub async fn apply_seed<T: SeedTarget + ?Sized>(
    target: &T,
    seed: &SeedFile,
) -> Result<SeedSummary, ServiceError> {
    let summary = target.apply(seed).await?;
    info!(
        "Seeded {} organizations, {} new records, {} updated records, {} attributes",
        summary.organizations, summary.records, summary.updated, summary.attributes
    );
    Ok(summary)
}
