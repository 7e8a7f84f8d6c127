//! Check command implementation

use crate::cli::config::OpenedStore;
use crate::cli::error::{CliError, CliResult};
use clap::Args;
use dupcheck::core::duplicate_check::{CodeCheckResult, NameCheckResult};
use dupcheck::{
    CheckOptions, CheckStatus, DupCheckService, DuplicateCheckReport, DuplicateCheckRequest,
    ServiceConfig, TenantId,
};

/// Check candidate codes and names against a tenant's existing records
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Tenant (organization) identifier
    #[arg(long, help = "Tenant identifier")]
    pub tenant: String,

    /// Record kind; defaults to the configured kind
    #[arg(long, help = "Record kind (default from config)")]
    pub kind: Option<String>,

    /// Candidate code, repeatable
    #[arg(long = "code", help = "Candidate code (repeatable)")]
    pub codes: Vec<String>,

    /// Candidate name, repeatable
    #[arg(long = "name", help = "Candidate name (repeatable)")]
    pub names: Vec<String>,

    /// Only report exact name matches
    #[arg(long, help = "Skip similarity scoring of names")]
    pub no_similar: bool,

    /// Suggest alternative codes for available structured codes
    #[arg(long, help = "Suggest alternative codes")]
    pub alternatives: bool,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,
}

pub async fn execute_check(
    config: ServiceConfig,
    store: OpenedStore,
    args: CheckArgs,
) -> CliResult<()> {
    if args.codes.is_empty() && args.names.is_empty() {
        return Err(CliError::Validation(
            "Provide at least one --code or --name".to_string(),
        ));
    }

    let service = DupCheckService::with_store(config, store.record_store());
    let request = DuplicateCheckRequest {
        tenant_id: TenantId::new(args.tenant)?,
        kind: service.resolve_kind(args.kind.as_deref())?,
        candidate_codes: args.codes,
        candidate_names: args.names,
        options: CheckOptions {
            check_similar: !args.no_similar,
            suggest_alternatives: args.alternatives,
        },
    };

    let report = service.checker().check_duplicates(&request).await?;

    match args.format.as_str() {
        "json" => {
            let json = serde_json::to_string_pretty(&report).map_err(|e| {
                CliError::Validation(format!("Failed to serialize to JSON: {}", e))
            })?;
            println!("{}", json);
        }
        "table" => println!("{}", format_report_as_table(&report)),
        other => {
            return Err(CliError::Validation(format!(
                "Unknown format '{}' (expected 'table' or 'json')",
                other
            )))
        }
    }

    Ok(())
}

fn status_label(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Duplicate => "duplicate",
        CheckStatus::Available => "available",
        CheckStatus::Similar => "similar",
        CheckStatus::Unique => "unique",
    }
}

fn code_detail(result: &CodeCheckResult) -> String {
    match &result.existing_record {
        Some(existing) => format!("existing '{}'", existing.name),
        None if !result.alternatives.is_empty() => {
            format!("alternatives: {}", result.alternatives.join(", "))
        }
        None => String::new(),
    }
}

fn name_detail(result: &NameCheckResult) -> String {
    if let Some(existing) = &result.existing_record {
        return format!("existing code {}", existing.code);
    }
    result
        .similar_matches
        .iter()
        .map(|m| format!("{} ({:.0}%)", m.record.name, m.similarity * 100.0))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a report as an ASCII table followed by the summary line
fn format_report_as_table(report: &DuplicateCheckReport) -> String {
    let mut rows: Vec<(&str, &str, &str, String)> = Vec::new();
    for result in &report.code_results {
        rows.push(("code", result.code.as_str(), status_label(result.status), code_detail(result)));
    }
    for result in &report.name_results {
        rows.push(("name", result.name.as_str(), status_label(result.status), name_detail(result)));
    }

    let width_value = rows
        .iter()
        .map(|r| r.1.chars().count())
        .max()
        .unwrap_or(0)
        .max("Candidate".len());
    let width_detail = rows
        .iter()
        .map(|r| r.3.chars().count())
        .max()
        .unwrap_or(0)
        .max("Detail".len());
    let (width_type, width_status) = (4, 9);

    let separator = format!(
        "+-{}-+-{}-+-{}-+-{}-+",
        "-".repeat(width_type),
        "-".repeat(width_value),
        "-".repeat(width_status),
        "-".repeat(width_detail)
    );

    let mut out = vec![
        separator.clone(),
        format!(
            "| {:<width_type$} | {:<width_value$} | {:<width_status$} | {:<width_detail$} |",
            "Type", "Candidate", "Status", "Detail"
        ),
        separator.clone(),
    ];
    for (kind, value, status, detail) in &rows {
        out.push(format!(
            "| {:<width_type$} | {:<width_value$} | {:<width_status$} | {:<width_detail$} |",
            kind, value, status, detail
        ));
    }
    out.push(separator);

    let s = &report.summary;
    out.push(format!(
        "{} checked: {} duplicate, {} similar, {} available, {} unique",
        s.total_checked, s.duplicates, s.similar, s.available, s.unique
    ));
    out.join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use dupcheck::storage::NewRecord;
    use dupcheck::{InMemoryStore, RecordKind};
    use std::sync::Arc;

    async fn seeded_store() -> OpenedStore {
        let store = Arc::new(InMemoryStore::new());
        let tenant = TenantId::new("org-1").unwrap();
        store.add_tenant(&tenant).await;
        store
            .insert_record(NewRecord::new(
                tenant,
                RecordKind::new("ledger-account").unwrap(),
                "Cash",
                "1000000",
            ))
            .await
            .unwrap();
        OpenedStore::Memory(store)
    }

    fn args(codes: &[&str], names: &[&str]) -> CheckArgs {
        CheckArgs {
            tenant: "org-1".to_string(),
            kind: None,
            codes: codes.iter().map(|c| c.to_string()).collect(),
            names: names.iter().map(|n| n.to_string()).collect(),
            no_similar: false,
            alternatives: true,
            format: "json".to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_check_json() {
        let result = execute_check(
            ServiceConfig::default(),
            seeded_store().await,
            args(&["1000000"], &["cash"]),
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_execute_check_requires_candidates() {
        let err = execute_check(ServiceConfig::default(), seeded_store().await, args(&[], &[]))
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_execute_check_unknown_tenant() {
        let mut a = args(&["1000000"], &[]);
        a.tenant = "ghost".to_string();
        let err = execute_check(ServiceConfig::default(), seeded_store().await, a)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CliError::Service(dupcheck::ServiceError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_table_lists_every_candidate() {
        let OpenedStore::Memory(store) = seeded_store().await else {
            unreachable!()
        };
        let service = DupCheckService::with_store(ServiceConfig::default(), store);
        let request = DuplicateCheckRequest {
            tenant_id: TenantId::new("org-1").unwrap(),
            kind: RecordKind::new("ledger-account").unwrap(),
            candidate_codes: vec!["1000000".to_string(), "1000001".to_string()],
            candidate_names: vec!["Cash".to_string()],
            options: CheckOptions::default(),
        };
        let report = service.checker().check_duplicates(&request).await.unwrap();
        let table = format_report_as_table(&report);

        assert!(table.contains("| code | 1000000"));
        assert!(table.contains("available"));
        assert!(table.contains("existing code 1000000"));
        assert!(table.ends_with("3 checked: 2 duplicate, 0 similar, 1 available, 0 unique"));
    }
}
