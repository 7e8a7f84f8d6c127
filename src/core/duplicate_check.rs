//! Duplicate check orchestration
//!
//! A check loads the tenant's existing records of one kind exactly once, then
//! classifies each candidate code and name against that snapshot:
//!
//! - codes are `duplicate` or `available` (optionally with alternative codes)
//! - names are `duplicate` (exact after normalization), `similar` (fuzzy
//!   score above [`SIMILARITY_THRESHOLD`]) or `unique`
//!
//! The check never writes, so repeating it against an unchanged store yields
//! the same report.

use crate::core::alternatives::{suggest_alternatives, DEFAULT_MAX_SUGGESTIONS};
use crate::core::loader::{load_existing, ExistingRecord};
use crate::core::service::{RecordKind, ServiceError, TenantId};
use crate::core::similarity::{normalize, similarity};
use crate::storage::RecordStore;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Names must score strictly above this to be reported as similar
pub const SIMILARITY_THRESHOLD: f64 = 0.70;

/// Most similar matches kept per candidate name
pub const MAX_SIMILAR_MATCHES: usize = 3;

/// Outcome for a single candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Duplicate,
    Available,
    Similar,
    Unique,
}

/// Optional behaviour of a check
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Score non-exact names against every existing name
    pub check_similar: bool,
    /// Attach alternative codes to available candidate codes
    pub suggest_alternatives: bool,
}

/// A batch of candidates to check for one tenant and kind
#[derive(Debug, Clone)]
pub struct DuplicateCheckRequest {
    pub tenant_id: TenantId,
    pub kind: RecordKind,
    pub candidate_codes: Vec<String>,
    pub candidate_names: Vec<String>,
    pub options: CheckOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCheckResult {
    pub code: String,
    pub status: CheckStatus,
    pub existing_record: Option<ExistingRecord>,
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarMatch {
    pub record: ExistingRecord,
    pub similarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCheckResult {
    pub name: String,
    pub status: CheckStatus,
    /// 1.0 for an exact match, the top score for a similar match
    pub similarity: Option<f64>,
    pub existing_record: Option<ExistingRecord>,
    pub similar_matches: Vec<SimilarMatch>,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckSummary {
    /// Every candidate code plus every candidate name
    pub total_checked: usize,
    pub duplicates: usize,
    pub similar: usize,
    pub available: usize,
    pub unique: usize,
}

impl CheckSummary {
    fn count(&mut self, status: CheckStatus) {
        self.total_checked += 1;
        match status {
            CheckStatus::Duplicate => self.duplicates += 1,
            CheckStatus::Available => self.available += 1,
            CheckStatus::Similar => self.similar += 1,
            CheckStatus::Unique => self.unique += 1,
        }
    }
}

/// Result of a batch check. One entry per candidate, in request order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckReport {
    pub tenant_id: TenantId,
    pub kind: RecordKind,
    pub code_results: Vec<CodeCheckResult>,
    pub name_results: Vec<NameCheckResult>,
    pub summary: CheckSummary,
}

/// Result of the single-code convenience check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleCodeResult {
    pub code: String,
    pub is_duplicate: bool,
    pub existing_record: Option<ExistingRecord>,
}

/// In-memory view of the existing records used for one check
struct ExistingIndex {
    records: Vec<ExistingRecord>,
    codes: HashSet<String>,
    by_code: HashMap<String, usize>,
    normalized_names: Vec<String>,
}

impl ExistingIndex {
    fn build(records: Vec<ExistingRecord>) -> Self {
        let mut codes = HashSet::with_capacity(records.len());
        let mut by_code = HashMap::with_capacity(records.len());
        let mut normalized_names = Vec::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            let code = record.code.trim().to_string();
            codes.insert(code.clone());
            // First record wins when the store already holds a duplicate code
            by_code.entry(code).or_insert(i);
            normalized_names.push(normalize(&record.name));
        }

        Self {
            records,
            codes,
            by_code,
            normalized_names,
        }
    }

    fn find_code(&self, code: &str) -> Option<&ExistingRecord> {
        self.by_code
            .get(code.trim())
            .and_then(|&i| self.records.get(i))
    }

    fn find_name(&self, name: &str) -> Option<&ExistingRecord> {
        let wanted = normalize(name);
        self.normalized_names
            .iter()
            .position(|n| *n == wanted)
            .and_then(|i| self.records.get(i))
    }

    fn similar_to(&self, name: &str) -> Vec<SimilarMatch> {
        let mut matches: Vec<SimilarMatch> = self
            .records
            .iter()
            .filter_map(|record| {
                let score = similarity(name, &record.name);
                (score > SIMILARITY_THRESHOLD).then(|| SimilarMatch {
                    record: record.clone(),
                    similarity: score,
                })
            })
            .collect();
        // Stable: ties keep store order
        matches.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        matches.truncate(MAX_SIMILAR_MATCHES);
        matches
    }
}

/// Runs duplicate checks against a [`RecordStore`]
pub struct DuplicateChecker {
    store: Arc<dyn RecordStore>,
    attribute_field: String,
}

impl DuplicateChecker {
    pub fn new(store: Arc<dyn RecordStore>, attribute_field: impl Into<String>) -> Self {
        Self {
            store,
            attribute_field: attribute_field.into(),
        }
    }

    async fn ensure_tenant(&self, tenant_id: &TenantId) -> Result<(), ServiceError> {
        let exists = self
            .store
            .tenant_exists(tenant_id)
            .await
            .map_err(|e| ServiceError::LoadFailure(e.to_string()))?;
        if !exists {
            return Err(ServiceError::InvalidRequest(format!(
                "Unknown tenant: {}",
                tenant_id
            )));
        }
        Ok(())
    }

    async fn load_index(
        &self,
        tenant_id: &TenantId,
        kind: &RecordKind,
    ) -> Result<ExistingIndex, ServiceError> {
        let records =
            load_existing(self.store.as_ref(), tenant_id, kind, &self.attribute_field).await?;
        Ok(ExistingIndex::build(records))
    }

    /// Check a batch of candidate codes and names
    pub async fn check_duplicates(
        &self,
        request: &DuplicateCheckRequest,
    ) -> Result<DuplicateCheckReport, ServiceError> {
        if request.candidate_codes.is_empty() && request.candidate_names.is_empty() {
            return Err(ServiceError::InvalidRequest(
                "At least one candidate code or name is required".to_string(),
            ));
        }
        self.ensure_tenant(&request.tenant_id).await?;

        let index = self.load_index(&request.tenant_id, &request.kind).await?;
        let mut summary = CheckSummary::default();

        let code_results: Vec<CodeCheckResult> = request
            .candidate_codes
            .iter()
            .map(|code| {
                let result = check_code_against(&index, code, request.options);
                summary.count(result.status);
                result
            })
            .collect();

        let name_results: Vec<NameCheckResult> = request
            .candidate_names
            .iter()
            .map(|name| {
                let result = check_name_against(&index, name, request.options);
                summary.count(result.status);
                result
            })
            .collect();

        info!(
            "Duplicate check for tenant {} kind {}: {} checked, {} duplicate, {} similar, {} available",
            request.tenant_id,
            request.kind,
            summary.total_checked,
            summary.duplicates,
            summary.similar,
            summary.available
        );

        Ok(DuplicateCheckReport {
            tenant_id: request.tenant_id.clone(),
            kind: request.kind.clone(),
            code_results,
            name_results,
            summary,
        })
    }

    /// Check a single code with exact matching only
    pub async fn check_code(
        &self,
        tenant_id: &TenantId,
        kind: &RecordKind,
        code: &str,
    ) -> Result<SingleCodeResult, ServiceError> {
        if code.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Code cannot be empty".to_string(),
            ));
        }
        self.ensure_tenant(tenant_id).await?;

        let index = self.load_index(tenant_id, kind).await?;
        let existing = index.find_code(code).cloned();
        debug!(
            "Single code check {} for tenant {}: duplicate={}",
            code,
            tenant_id,
            existing.is_some()
        );

        Ok(SingleCodeResult {
            code: code.to_string(),
            is_duplicate: existing.is_some(),
            existing_record: existing,
        })
    }
}

fn check_code_against(index: &ExistingIndex, code: &str, options: CheckOptions) -> CodeCheckResult {
    if let Some(existing) = index.find_code(code) {
        return CodeCheckResult {
            code: code.to_string(),
            status: CheckStatus::Duplicate,
            existing_record: Some(existing.clone()),
            alternatives: Vec::new(),
        };
    }

    let alternatives = if options.suggest_alternatives {
        suggest_alternatives(code.trim(), &index.codes, DEFAULT_MAX_SUGGESTIONS)
    } else {
        Vec::new()
    };

    CodeCheckResult {
        code: code.to_string(),
        status: CheckStatus::Available,
        existing_record: None,
        alternatives,
    }
}

fn check_name_against(index: &ExistingIndex, name: &str, options: CheckOptions) -> NameCheckResult {
    if let Some(existing) = index.find_name(name) {
        return NameCheckResult {
            name: name.to_string(),
            status: CheckStatus::Duplicate,
            similarity: Some(1.0),
            existing_record: Some(existing.clone()),
            similar_matches: Vec::new(),
            suggestion: None,
        };
    }

    let similar_matches = if options.check_similar {
        index.similar_to(name)
    } else {
        Vec::new()
    };

    if similar_matches.is_empty() {
        return NameCheckResult {
            name: name.to_string(),
            status: CheckStatus::Unique,
            similarity: None,
            existing_record: None,
            similar_matches,
            suggestion: None,
        };
    }

    // Sorted best first
    let top = &similar_matches[0];
    let top_score = top.similarity;
    let suggestion = format!(
        "Similar to existing record '{}' (code {}, {:.0}% match). Consider using the existing record or choosing a more distinct name.",
        top.record.name,
        top.record.code,
        top_score * 100.0
    );
    NameCheckResult {
        name: name.to_string(),
        status: CheckStatus::Similar,
        similarity: Some(top_score),
        existing_record: None,
        similar_matches,
        suggestion: Some(suggestion),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryStore, NewRecord};

    async fn store_with(records: &[(&str, &str)]) -> (Arc<InMemoryStore>, TenantId, RecordKind) {
        let store = Arc::new(InMemoryStore::new());
        let tenant = TenantId::new("org-1").unwrap();
        let kind = RecordKind::new("ledger-account").unwrap();
        store.add_tenant(&tenant).await;
        for (code, name) in records {
            store
                .insert_record(NewRecord::new(tenant.clone(), kind.clone(), *name, *code))
                .await
                .unwrap();
        }
        (store, tenant, kind)
    }

    fn request(
        tenant: &TenantId,
        kind: &RecordKind,
        codes: &[&str],
        names: &[&str],
        options: CheckOptions,
    ) -> DuplicateCheckRequest {
        DuplicateCheckRequest {
            tenant_id: tenant.clone(),
            kind: kind.clone(),
            candidate_codes: codes.iter().map(|c| c.to_string()).collect(),
            candidate_names: names.iter().map(|n| n.to_string()).collect(),
            options,
        }
    }

    const ALL: CheckOptions = CheckOptions {
        check_similar: true,
        suggest_alternatives: true,
    };

    #[tokio::test]
    async fn test_code_duplicate_and_available() {
        let (store, tenant, kind) = store_with(&[("1000000", "Cash")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(
                &tenant,
                &kind,
                &["1000000", "2000000"],
                &[],
                CheckOptions::default(),
            ))
            .await
            .unwrap();

        assert_eq!(report.code_results[0].status, CheckStatus::Duplicate);
        assert_eq!(
            report.code_results[0].existing_record.as_ref().unwrap().name,
            "Cash"
        );
        assert_eq!(report.code_results[1].status, CheckStatus::Available);
        assert!(report.code_results[1].alternatives.is_empty());
    }

    #[tokio::test]
    async fn test_similar_name_reports_top_match() {
        let (store, tenant, kind) =
            store_with(&[("1000000", "Cash Account"), ("1100000", "Inventory")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(&tenant, &kind, &[], &["Cash Acount"], ALL))
            .await
            .unwrap();

        let result = &report.name_results[0];
        assert_eq!(result.status, CheckStatus::Similar);
        assert!(result.similarity.unwrap() > SIMILARITY_THRESHOLD);
        assert_eq!(result.similar_matches.len(), 1);
        assert_eq!(result.similar_matches[0].record.name, "Cash Account");
        assert!(result.suggestion.as_ref().unwrap().contains("Cash Account"));
    }

    #[tokio::test]
    async fn test_unrelated_name_is_unique() {
        let (store, tenant, kind) = store_with(&[("1000000", "Cash Account")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(&tenant, &kind, &[], &["Inventory"], ALL))
            .await
            .unwrap();
        assert_eq!(report.name_results[0].status, CheckStatus::Unique);
        assert!(report.name_results[0].similar_matches.is_empty());
    }

    #[tokio::test]
    async fn test_similarity_disabled_reports_unique() {
        let (store, tenant, kind) = store_with(&[("1000000", "Cash Account")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(
                &tenant,
                &kind,
                &[],
                &["Cash Acount"],
                CheckOptions::default(),
            ))
            .await
            .unwrap();
        assert_eq!(report.name_results[0].status, CheckStatus::Unique);
    }

    #[tokio::test]
    async fn test_keeps_top_three_similar_sorted_descending() {
        let (store, tenant, kind) = store_with(&[
            ("1000001", "Sales Tax A"),
            ("1000002", "Sales Tax"),
            ("1000003", "Sales Taxes"),
            ("1000004", "Sales Taz"),
            ("1000005", "Payroll"),
        ])
        .await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(&tenant, &kind, &[], &["Sales Tx"], ALL))
            .await
            .unwrap();

        let matches = &report.name_results[0].similar_matches;
        assert_eq!(matches.len(), MAX_SIMILAR_MATCHES);
        assert_eq!(matches[0].record.name, "Sales Tax");
        assert!(matches
            .windows(2)
            .all(|w| w[0].similarity >= w[1].similarity));
    }

    #[tokio::test]
    async fn test_exact_name_match_ignores_case_and_whitespace() {
        let (store, tenant, kind) = store_with(&[("1000000", "Cash")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(&tenant, &kind, &[], &["  CASH "], ALL))
            .await
            .unwrap();
        let result = &report.name_results[0];
        assert_eq!(result.status, CheckStatus::Duplicate);
        assert_eq!(result.similarity, Some(1.0));
        assert_eq!(result.existing_record.as_ref().unwrap().code, "1000000");
    }

    #[tokio::test]
    async fn test_summary_counts_every_candidate() {
        let (store, tenant, kind) = store_with(&[("4000000", "Cash")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let report = checker
            .check_duplicates(&request(
                &tenant,
                &kind,
                &["4000000", "4000001"],
                &["Cash", "Petty Cash"],
                ALL,
            ))
            .await
            .unwrap();

        assert_eq!(
            report.summary,
            CheckSummary {
                total_checked: 4,
                duplicates: 2,
                similar: 0,
                available: 1,
                unique: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_rejects_empty_request_and_unknown_tenant() {
        let (store, tenant, kind) = store_with(&[]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let empty = checker
            .check_duplicates(&request(&tenant, &kind, &[], &[], ALL))
            .await
            .unwrap_err();
        assert!(matches!(empty, ServiceError::InvalidRequest(_)));

        let ghost = TenantId::new("ghost").unwrap();
        let unknown = checker
            .check_duplicates(&request(&ghost, &kind, &["1000000"], &[], ALL))
            .await
            .unwrap_err();
        assert!(matches!(unknown, ServiceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_single_code_check() {
        let (store, tenant, kind) = store_with(&[("1000000", "Cash")]).await;
        let checker = DuplicateChecker::new(store, "account_type");

        let hit = checker.check_code(&tenant, &kind, "1000000").await.unwrap();
        assert!(hit.is_duplicate);
        assert_eq!(hit.existing_record.unwrap().name, "Cash");

        let miss = checker.check_code(&tenant, &kind, "2000000").await.unwrap();
        assert!(!miss.is_duplicate);
        assert!(miss.existing_record.is_none());

        assert!(checker.check_code(&tenant, &kind, " ").await.is_err());
    }

    #[tokio::test]
    async fn test_single_code_check_ignores_inactive_records() {
        let (store, tenant, kind) = store_with(&[]).await;
        store
            .insert_record(NewRecord::new(tenant.clone(), kind.clone(), "Legacy", "1000000").inactive())
            .await
            .unwrap();
        let checker = DuplicateChecker::new(store, "account_type");

        let result = checker.check_code(&tenant, &kind, "1000000").await.unwrap();
        assert!(!result.is_duplicate);
    }
}
