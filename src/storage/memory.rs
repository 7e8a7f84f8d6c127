//! In-memory record store

use crate::core::service::{RecordKind, ServiceError, TenantId};
use crate::storage::seed::{SeedFile, SeedSummary};
use crate::storage::{AttributeValue, NewRecord, RecordStore, StoredRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct MemoryRecord {
    id: String,
    kind: RecordKind,
    name: String,
    code: String,
    active: bool,
    attributes: HashMap<String, String>,
}

#[derive(Debug, Default)]
struct TenantData {
    // Insertion order is the listing order
    records: Vec<MemoryRecord>,
}

/// Volatile `RecordStore` keeping every tenant in process memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tenants: Arc<RwLock<HashMap<TenantId, TenantData>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tenant. Re-adding an existing tenant keeps its records.
    pub async fn add_tenant(&self, tenant_id: &TenantId) {
        let mut tenants = self.tenants.write().await;
        tenants.entry(tenant_id.clone()).or_default();
    }

    /// Insert a record and return its generated id
    pub async fn insert_record(&self, record: NewRecord) -> Result<String, ServiceError> {
        let mut tenants = self.tenants.write().await;
        let tenant = tenants.get_mut(&record.tenant_id).ok_or_else(|| {
            ServiceError::Storage(format!("Unknown tenant: {}", record.tenant_id))
        })?;

        let id = uuid::Uuid::new_v4().to_string();
        tenant.records.push(MemoryRecord {
            id: id.clone(),
            kind: record.kind,
            name: record.name,
            code: record.code,
            active: record.active,
            attributes: HashMap::new(),
        });
        Ok(id)
    }

    pub async fn set_active(
        &self,
        tenant_id: &TenantId,
        record_id: &str,
        active: bool,
    ) -> Result<(), ServiceError> {
        let mut tenants = self.tenants.write().await;
        let record = Self::find_mut(&mut tenants, tenant_id, record_id)?;
        record.active = active;
        Ok(())
    }

    pub async fn set_attribute(
        &self,
        tenant_id: &TenantId,
        record_id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        let mut tenants = self.tenants.write().await;
        let record = Self::find_mut(&mut tenants, tenant_id, record_id)?;
        record
            .attributes
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    /// Apply a seed file under one write lock. Nothing is written when any
    /// record names a tenant that neither exists nor is created by the file.
    pub async fn apply_seed_file(&self, seed: &SeedFile) -> Result<SeedSummary, ServiceError> {
        let mut tenants = self.tenants.write().await;

        let unknown = seed.records.iter().find(|r| {
            !tenants.contains_key(&r.organization_id)
                && !seed.organizations.iter().any(|o| o.id == r.organization_id)
        });
        if let Some(record) = unknown {
            return Err(ServiceError::Storage(format!(
                "Unknown tenant: {}",
                record.organization_id
            )));
        }

        let mut summary = SeedSummary::default();
        for org in &seed.organizations {
            tenants.entry(org.id.clone()).or_default();
            summary.organizations += 1;
        }

        for record in &seed.records {
            let tenant = tenants.entry(record.organization_id.clone()).or_default();
            let position = tenant
                .records
                .iter()
                .position(|r| r.kind == record.kind && r.code == record.code);
            let index = match position {
                Some(i) => {
                    summary.updated += 1;
                    i
                }
                None => {
                    tenant.records.push(MemoryRecord {
                        id: uuid::Uuid::new_v4().to_string(),
                        kind: record.kind.clone(),
                        name: record.name.clone(),
                        code: record.code.clone(),
                        active: record.active,
                        attributes: HashMap::new(),
                    });
                    summary.records += 1;
                    tenant.records.len() - 1
                }
            };

            let entry = &mut tenant.records[index];
            entry.name = record.name.clone();
            entry.active = record.active;
            for (field, value) in &record.attributes {
                entry.attributes.insert(field.clone(), value.clone());
                summary.attributes += 1;
            }
        }

        Ok(summary)
    }

    fn find_mut<'a>(
        tenants: &'a mut HashMap<TenantId, TenantData>,
        tenant_id: &TenantId,
        record_id: &str,
    ) -> Result<&'a mut MemoryRecord, ServiceError> {
        tenants
            .get_mut(tenant_id)
            .and_then(|t| t.records.iter_mut().find(|r| r.id == record_id))
            .ok_or_else(|| {
                ServiceError::Storage(format!(
                    "Record {} not found for tenant {}",
                    record_id, tenant_id
                ))
            })
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn tenant_exists(&self, tenant_id: &TenantId) -> Result<bool, ServiceError> {
        Ok(self.tenants.read().await.contains_key(tenant_id))
    }

    async fn list_active_records(
        &self,
        tenant_id: &TenantId,
        kind: &RecordKind,
    ) -> Result<Vec<StoredRecord>, ServiceError> {
        let tenants = self.tenants.read().await;
        let records = tenants
            .get(tenant_id)
            .map(|t| {
                t.records
                    .iter()
                    .filter(|r| r.active && &r.kind == kind)
                    .map(|r| StoredRecord {
                        id: r.id.clone(),
                        name: r.name.clone(),
                        code: r.code.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn get_attribute_values(
        &self,
        tenant_id: &TenantId,
        ids: &[String],
        attribute_name: &str,
    ) -> Result<Vec<AttributeValue>, ServiceError> {
        let tenants = self.tenants.read().await;
        let Some(tenant) = tenants.get(tenant_id) else {
            return Ok(Vec::new());
        };

        Ok(tenant
            .records
            .iter()
            .filter(|r| ids.contains(&r.id))
            .filter_map(|r| {
                r.attributes.get(attribute_name).map(|v| AttributeValue {
                    id: r.id.clone(),
                    value: v.clone(),
                })
            })
            .collect())
    }
}
