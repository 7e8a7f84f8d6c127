//! Loading of existing records for a tenant and kind

use crate::core::service::{RecordKind, ServiceError, TenantId};
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Attribute value used when the auxiliary lookup has no answer for a record
pub const UNKNOWN_ATTRIBUTE: &str = "UNKNOWN";

/// An existing record as seen by the duplicate check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingRecord {
    pub id: String,
    pub name: String,
    pub code: String,
    /// Auxiliary classification (e.g. account type). Never compared.
    pub attribute: String,
}

/// Load every active record of `kind` for the tenant with its `attribute_field` value.
///
/// A failing primary listing is fatal and surfaces as [`ServiceError::LoadFailure`].
/// A failing attribute lookup only degrades the result: every record gets
/// [`UNKNOWN_ATTRIBUTE`].
pub async fn load_existing(
    store: &dyn RecordStore,
    tenant_id: &TenantId,
    kind: &RecordKind,
    attribute_field: &str,
) -> Result<Vec<ExistingRecord>, ServiceError> {
    let records = store
        .list_active_records(tenant_id, kind)
        .await
        .map_err(|e| match e {
            ServiceError::LoadFailure(msg) => ServiceError::LoadFailure(msg),
            other => ServiceError::LoadFailure(other.to_string()),
        })?;

    if records.is_empty() {
        debug!("No existing {} records for tenant {}", kind, tenant_id);
        return Ok(Vec::new());
    }

    let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
    let mut attributes: HashMap<String, String> = match store
        .get_attribute_values(tenant_id, &ids, attribute_field)
        .await
    {
        Ok(values) => values.into_iter().map(|v| (v.id, v.value)).collect(),
        Err(e) => {
            warn!(
                "Attribute '{}' lookup failed for tenant {} ({} records), continuing with {}: {}",
                attribute_field,
                tenant_id,
                ids.len(),
                UNKNOWN_ATTRIBUTE,
                e
            );
            HashMap::new()
        }
    };

    debug!(
        "Loaded {} existing {} records for tenant {}",
        records.len(),
        kind,
        tenant_id
    );

    Ok(records
        .into_iter()
        .map(|r| {
            let attribute = attributes
                .remove(&r.id)
                .unwrap_or_else(|| UNKNOWN_ATTRIBUTE.to_string());
            ExistingRecord {
                id: r.id,
                name: r.name,
                code: r.code,
                attribute,
            }
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{AttributeValue, InMemoryStore, NewRecord, StoredRecord};
    use async_trait::async_trait;

    /// Store whose primary listing and/or attribute lookup can be made to fail
    struct FlakyStore {
        records: Vec<StoredRecord>,
        fail_listing: bool,
        fail_attributes: bool,
    }

    #[async_trait]
    impl RecordStore for FlakyStore {
        async fn tenant_exists(&self, _tenant_id: &TenantId) -> Result<bool, ServiceError> {
            Ok(true)
        }

        async fn list_active_records(
            &self,
            _tenant_id: &TenantId,
            _kind: &RecordKind,
        ) -> Result<Vec<StoredRecord>, ServiceError> {
            if self.fail_listing {
                return Err(ServiceError::Storage("connection refused".to_string()));
            }
            Ok(self.records.clone())
        }

        async fn get_attribute_values(
            &self,
            _tenant_id: &TenantId,
            _ids: &[String],
            _attribute_name: &str,
        ) -> Result<Vec<AttributeValue>, ServiceError> {
            if self.fail_attributes {
                return Err(ServiceError::Storage("timeout".to_string()));
            }
            Ok(vec![AttributeValue {
                id: "r1".to_string(),
                value: "ASSET".to_string(),
            }])
        }
    }

    fn records() -> Vec<StoredRecord> {
        vec![
            StoredRecord {
                id: "r1".to_string(),
                name: "Cash".to_string(),
                code: "1000000".to_string(),
            },
            StoredRecord {
                id: "r2".to_string(),
                name: "Bank".to_string(),
                code: "1000001".to_string(),
            },
        ]
    }

    fn scope() -> (TenantId, RecordKind) {
        (
            TenantId::new("org").unwrap(),
            RecordKind::new("ledger-account").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_merges_attributes_and_defaults_missing() {
        let store = FlakyStore {
            records: records(),
            fail_listing: false,
            fail_attributes: false,
        };
        let (t, k) = scope();
        let loaded = load_existing(&store, &t, &k, "account_type").await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].attribute, "ASSET");
        assert_eq!(loaded[1].attribute, UNKNOWN_ATTRIBUTE);
    }

    #[tokio::test]
    async fn test_listing_failure_is_load_failure() {
        let store = FlakyStore {
            records: records(),
            fail_listing: true,
            fail_attributes: false,
        };
        let (t, k) = scope();
        let err = load_existing(&store, &t, &k, "account_type")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::LoadFailure(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_attribute_failure_degrades_to_unknown() {
        let store = FlakyStore {
            records: records(),
            fail_listing: false,
            fail_attributes: true,
        };
        let (t, k) = scope();
        let loaded = load_existing(&store, &t, &k, "account_type").await.unwrap();

        assert_eq!(loaded.len(), 2);
        assert!(loaded.iter().all(|r| r.attribute == UNKNOWN_ATTRIBUTE));
        assert_eq!(loaded[0].code, "1000000");
    }

    #[tokio::test]
    async fn test_excludes_inactive_records() {
        let store = InMemoryStore::new();
        let (t, k) = scope();
        store.add_tenant(&t).await;
        store
            .insert_record(NewRecord::new(t.clone(), k.clone(), "Cash", "1000000"))
            .await
            .unwrap();
        store
            .insert_record(NewRecord::new(t.clone(), k.clone(), "Legacy", "1000009").inactive())
            .await
            .unwrap();

        let loaded = load_existing(&store, &t, &k, "account_type").await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Cash");
    }
}
