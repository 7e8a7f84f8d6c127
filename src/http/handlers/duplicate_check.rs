//! Duplicate check endpoint handlers

use crate::core::duplicate_check::{
    CheckOptions, DuplicateCheckReport, DuplicateCheckRequest, SingleCodeResult,
};
use crate::core::service::TenantId;
use crate::http::errors::HttpResult;
use crate::http::handlers::AppState;
use crate::http::models::*;
use axum::{
    extract::{Query, State},
    Json,
};
use std::time::Instant;
use tracing::debug;
use validator::Validate;

/// POST /api/duplicate-check - Check a batch of candidate codes and names
pub async fn check_duplicates(
    State(state): State<AppState>,
    Json(body): Json<DuplicateCheckBody>,
) -> HttpResult<Json<ApiResponse<DuplicateCheckReport>>> {
    body.validate()?;

    let started = Instant::now();
    let request = DuplicateCheckRequest {
        tenant_id: TenantId::new(body.tenant_id)?,
        kind: state.service.resolve_kind(body.kind.as_deref())?,
        candidate_codes: body.candidate_codes.unwrap_or_default(),
        candidate_names: body.candidate_names.unwrap_or_default(),
        options: CheckOptions {
            check_similar: body.check_similar.unwrap_or(true),
            suggest_alternatives: body.suggest_alternatives.unwrap_or(false),
        },
    };

    let report = state.service.checker().check_duplicates(&request).await?;
    let meta = ResponseMeta {
        duration_ms: started.elapsed().as_millis() as u64,
    };
    debug!("Duplicate check completed in {}ms", meta.duration_ms);

    Ok(Json(ApiResponse::success_with_meta(report, meta)))
}

/// GET /api/duplicate-check?tenantId=&kind=&code= - Check a single code
pub async fn check_single_code(
    State(state): State<AppState>,
    Query(query): Query<DuplicateCheckQuery>,
) -> HttpResult<Json<ApiResponse<SingleCodeResult>>> {
    query.validate()?;

    let tenant_id = TenantId::new(query.tenant_id)?;
    let kind = state.service.resolve_kind(query.kind.as_deref())?;
    let result = state
        .service
        .checker()
        .check_code(&tenant_id, &kind, &query.code)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}
