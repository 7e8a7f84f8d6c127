//! SQLite-backed generic entity store
//!
//! Records live in the generic tables shared by every module of the
//! application: `organizations` (tenants), `entities` (typed records with a
//! name, a code and an active flag) and `dynamic_data` (named attribute
//! values attached to an entity).

use crate::core::service::{RecordKind, ServiceError, TenantId};
use crate::storage::seed::{SeedFile, SeedSummary};
use crate::storage::{AttributeValue, NewRecord, RecordStore, StoredRecord};
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Transaction};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Database schema version
const SCHEMA_VERSION: i32 = 1;

/// Ids bound per attribute query; SQLite caps host parameters per statement
const ATTRIBUTE_CHUNK_SIZE: usize = 500;

/// Initialize the entity store database
pub fn initialize_database(db_path: &Path) -> rusqlite::Result<()> {
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM schema_version ORDER BY version DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version < SCHEMA_VERSION {
        apply_schema_updates(&conn, current_version)?;
        conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?)",
            [SCHEMA_VERSION],
        )?;
    }

    Ok(())
}

fn apply_schema_updates(conn: &Connection, current_version: i32) -> rusqlite::Result<()> {
    if current_version < 1 {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS organizations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                organization_id TEXT NOT NULL REFERENCES organizations(id),
                entity_type TEXT NOT NULL,
                entity_name TEXT NOT NULL,
                entity_code TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entities_org_type
             ON entities(organization_id, entity_type, is_active)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS dynamic_data (
                entity_id TEXT NOT NULL REFERENCES entities(id),
                field_name TEXT NOT NULL,
                field_value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (entity_id, field_name)
            )",
            [],
        )?;
    }

    Ok(())
}

/// `RecordStore` over a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db_path` and migrate its schema
    pub async fn open(db_path: PathBuf) -> Result<Self, ServiceError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path = db_path.clone();
        tokio::task::spawn_blocking(move || initialize_database(&path))
            .await
            .map_err(|e| ServiceError::Storage(format!("Database task failed: {}", e)))?
            .map_err(|e| ServiceError::Storage(format!("Failed to initialize schema: {}", e)))?;

        debug!("Opened entity store at {}", db_path.display());
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run a database operation on the blocking pool
    async fn run_blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T, ServiceError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path).map_err(|e| {
                ServiceError::Storage(format!("Failed to open database: {}", e))
            })?;
            f(&conn).map_err(|e| ServiceError::Storage(format!("Failed to {}: {}", operation, e)))
        })
        .await
        .map_err(|e| ServiceError::Storage(format!("Database task failed: {}", e)))?
    }

    /// Create an organization (tenant). Existing organizations are left unchanged.
    pub async fn create_organization(
        &self,
        tenant_id: &TenantId,
        name: &str,
    ) -> Result<(), ServiceError> {
        let id = tenant_id.as_str().to_string();
        let name = name.to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.run_blocking("create organization", move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO organizations (id, name, created_at) VALUES (?, ?, ?)",
                params![id, name, created_at],
            )?;
            Ok(())
        })
        .await
    }

    /// Insert a record and return its generated id
    pub async fn insert_record(&self, record: NewRecord) -> Result<String, ServiceError> {
        if !self.tenant_exists(&record.tenant_id).await? {
            return Err(ServiceError::Storage(format!(
                "Unknown tenant: {}",
                record.tenant_id
            )));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let row_id = id.clone();
        let created_at = chrono::Utc::now().to_rfc3339();
        self.run_blocking("insert record", move |conn| {
            conn.execute(
                "INSERT INTO entities
                    (id, organization_id, entity_type, entity_name, entity_code, is_active, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    row_id,
                    record.tenant_id.as_str(),
                    record.kind.as_str(),
                    record.name,
                    record.code,
                    record.active,
                    created_at
                ],
            )?;
            Ok(())
        })
        .await?;
        Ok(id)
    }

    pub async fn set_active(
        &self,
        tenant_id: &TenantId,
        record_id: &str,
        active: bool,
    ) -> Result<(), ServiceError> {
        let tenant = tenant_id.as_str().to_string();
        let id = record_id.to_string();
        let updated = self
            .run_blocking("update record", move |conn| {
                conn.execute(
                    "UPDATE entities SET is_active = ? WHERE id = ? AND organization_id = ?",
                    params![active, id, tenant],
                )
            })
            .await?;
        if updated == 0 {
            return Err(ServiceError::Storage(format!(
                "Record {} not found for tenant {}",
                record_id, tenant_id
            )));
        }
        Ok(())
    }

    /// Set one dynamic field on a record, replacing any previous value
    pub async fn set_attribute(
        &self,
        tenant_id: &TenantId,
        record_id: &str,
        field: &str,
        value: &str,
    ) -> Result<(), ServiceError> {
        let tenant = tenant_id.as_str().to_string();
        let id = record_id.to_string();
        let field = field.to_string();
        let value = value.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();
        let written = self
            .run_blocking("set attribute", move |conn| {
                conn.execute(
                    "INSERT OR REPLACE INTO dynamic_data (entity_id, field_name, field_value, updated_at)
                     SELECT id, ?, ?, ? FROM entities WHERE id = ? AND organization_id = ?",
                    params![field, value, updated_at, id, tenant],
                )
            })
            .await?;
        if written == 0 {
            return Err(ServiceError::Storage(format!(
                "Record {} not found for tenant {}",
                record_id, tenant_id
            )));
        }
        Ok(())
    }

    /// Apply a seed file in a single transaction.
    ///
    /// Records are matched on tenant, kind and code; a match is updated in
    /// place. Any failure rolls back the whole file.
    pub async fn apply_seed_file(&self, seed: SeedFile) -> Result<SeedSummary, ServiceError> {
        let db_path = self.db_path.clone();
        let summary = tokio::task::spawn_blocking(move || {
            let mut conn = Connection::open(&db_path).map_err(storage_error("open database"))?;
            let tx = conn
                .transaction()
                .map_err(storage_error("begin seed transaction"))?;
            let summary = write_seed(&tx, &seed)?;
            tx.commit().map_err(storage_error("commit seed"))?;
            Ok::<_, ServiceError>(summary)
        })
        .await
        .map_err(|e| ServiceError::Storage(format!("Database task failed: {}", e)))??;

        debug!(
            "Applied seed to {}: {} inserted, {} updated",
            self.db_path.display(),
            summary.records,
            summary.updated
        );
        Ok(summary)
    }
}

fn storage_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> ServiceError {
    move |e| ServiceError::Storage(format!("Failed to {}: {}", operation, e))
}

fn write_seed(tx: &Transaction<'_>, seed: &SeedFile) -> Result<SeedSummary, ServiceError> {
    let now = chrono::Utc::now().to_rfc3339();
    let mut summary = SeedSummary::default();

    for org in &seed.organizations {
        tx.execute(
            "INSERT OR IGNORE INTO organizations (id, name, created_at) VALUES (?, ?, ?)",
            params![org.id.as_str(), org.name, now],
        )
        .map_err(storage_error("create organization"))?;
        summary.organizations += 1;
    }

    for record in &seed.records {
        let tenant = record.organization_id.as_str();
        let known: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM organizations WHERE id = ?",
                [tenant],
                |row| row.get(0),
            )
            .map_err(storage_error("look up organization"))?;
        if known == 0 {
            return Err(ServiceError::Storage(format!("Unknown tenant: {}", tenant)));
        }

        let existing: Option<String> = tx
            .query_row(
                "SELECT id FROM entities
                 WHERE organization_id = ? AND entity_type = ? AND entity_code = ?
                 ORDER BY rowid LIMIT 1",
                params![tenant, record.kind.as_str(), record.code],
                |row| row.get(0),
            )
            .optional()
            .map_err(storage_error("look up record"))?;

        let id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE entities SET entity_name = ?, is_active = ? WHERE id = ?",
                    params![record.name, record.active, id],
                )
                .map_err(storage_error("update record"))?;
                summary.updated += 1;
                id
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                tx.execute(
                    "INSERT INTO entities
                        (id, organization_id, entity_type, entity_name, entity_code, is_active, created_at)
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                    params![
                        id,
                        tenant,
                        record.kind.as_str(),
                        record.name,
                        record.code,
                        record.active,
                        now
                    ],
                )
                .map_err(storage_error("insert record"))?;
                summary.records += 1;
                id
            }
        };

        for (field, value) in &record.attributes {
            tx.execute(
                "INSERT OR REPLACE INTO dynamic_data (entity_id, field_name, field_value, updated_at)
                 VALUES (?, ?, ?, ?)",
                params![id, field, value, now],
            )
            .map_err(storage_error("set attribute"))?;
            summary.attributes += 1;
        }
    }

    Ok(summary)
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn tenant_exists(&self, tenant_id: &TenantId) -> Result<bool, ServiceError> {
        let id = tenant_id.as_str().to_string();
        self.run_blocking("look up organization", move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM organizations WHERE id = ?",
                [id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }

    async fn list_active_records(
        &self,
        tenant_id: &TenantId,
        kind: &RecordKind,
    ) -> Result<Vec<StoredRecord>, ServiceError> {
        let tenant = tenant_id.as_str().to_string();
        let kind = kind.as_str().to_string();
        self.run_blocking("list records", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, entity_name, entity_code FROM entities
                 WHERE organization_id = ? AND entity_type = ? AND is_active = 1
                 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![tenant, kind], |row| {
                Ok(StoredRecord {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                })
            })?;
            let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(records)
        })
        .await
    }

    async fn get_attribute_values(
        &self,
        tenant_id: &TenantId,
        ids: &[String],
        attribute_name: &str,
    ) -> Result<Vec<AttributeValue>, ServiceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let tenant = tenant_id.as_str().to_string();
        let field = attribute_name.to_string();
        let ids = ids.to_vec();
        self.run_blocking("load attribute values", move |conn| {
            let mut values = Vec::new();
            for chunk in ids.chunks(ATTRIBUTE_CHUNK_SIZE) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!(
                    "SELECT d.entity_id, d.field_value FROM dynamic_data d
                     JOIN entities e ON e.id = d.entity_id
                     WHERE e.organization_id = ? AND d.field_name = ? AND d.entity_id IN ({})",
                    placeholders
                );
                let mut stmt = conn.prepare(&sql)?;
                let bound = [tenant.as_str(), field.as_str()]
                    .into_iter()
                    .chain(chunk.iter().map(String::as_str));
                let rows = stmt.query_map(params_from_iter(bound), |row| {
                    Ok(AttributeValue {
                        id: row.get(0)?,
                        value: row.get(1)?,
                    })
                })?;
                for row in rows {
                    values.push(row?);
                }
            }
            Ok(values)
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("store.db");

        initialize_database(&db_path).unwrap();
        // Second run is a no-op
        initialize_database(&db_path).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        for table in ["organizations", "entities", "dynamic_data", "schema_version"] {
            let count: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }

        let version: i32 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("dir").join("store.db");
        let store = SqliteStore::open(db_path.clone()).await.unwrap();
        assert!(db_path.exists());
        assert_eq!(store.path(), db_path.as_path());
    }

    #[tokio::test]
    async fn test_set_attribute_rejects_foreign_tenant() {
        let temp_dir = TempDir::new().unwrap();
        let store = SqliteStore::open(temp_dir.path().join("store.db")).await.unwrap();
        let a = TenantId::new("org-a").unwrap();
        let b = TenantId::new("org-b").unwrap();
        store.create_organization(&a, "A").await.unwrap();
        store.create_organization(&b, "B").await.unwrap();

        let id = store
            .insert_record(NewRecord::new(
                a.clone(),
                RecordKind::new("ledger-account").unwrap(),
                "Cash",
                "1000000",
            ))
            .await
            .unwrap();

        assert!(store.set_attribute(&b, &id, "account_type", "ASSET").await.is_err());
        assert!(store.set_active(&b, &id, false).await.is_err());
        store.set_attribute(&a, &id, "account_type", "ASSET").await.unwrap();
    }
}
