//! Storage backend implementations for the generic entity store

use crate::core::service::{RecordKind, ServiceError, TenantId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod memory;
pub mod seed;
pub mod sqlite;

// Re-export main types
pub use memory::InMemoryStore;
pub use seed::{SeedFile, SeedTarget};
pub use sqlite::SqliteStore;

/// Primary row returned by a record listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// One dynamic attribute value keyed by record id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeValue {
    pub id: String,
    pub value: String,
}

/// A record to be written by seeding or tests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub tenant_id: TenantId,
    pub kind: RecordKind,
    pub name: String,
    pub code: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl NewRecord {
    pub fn new(
        tenant_id: TenantId,
        kind: RecordKind,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            kind,
            name: name.into(),
            code: code.into(),
            active: true,
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Read access to the generic entity store consumed by the duplicate check.
///
/// Every method is scoped to a single tenant; implementations must never
/// return rows that belong to another tenant.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Whether the tenant is known to the store
    async fn tenant_exists(&self, tenant_id: &TenantId) -> Result<bool, ServiceError>;

    /// All active records of `kind` for the tenant, in a stable order
    async fn list_active_records(
        &self,
        tenant_id: &TenantId,
        kind: &RecordKind,
    ) -> Result<Vec<StoredRecord>, ServiceError>;

    /// Values of one dynamic field for the given record ids.
    /// Ids without a value are simply absent from the result.
    async fn get_attribute_values(
        &self,
        tenant_id: &TenantId,
        ids: &[String],
        attribute_name: &str,
    ) -> Result<Vec<AttributeValue>, ServiceError>;
}
