//! Status endpoint handler

use crate::core::service::DupCheckService;
use crate::http::errors::HttpResult;
use crate::http::models::{ApiResponse, StatusResponse};
use axum::{extract::State, Json};
use std::sync::Arc;
use std::time::SystemTime;

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DupCheckService>,
    pub start_time: SystemTime,
}

impl AppState {
    pub fn new(service: Arc<DupCheckService>) -> Self {
        Self {
            service,
            start_time: SystemTime::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_secs()
    }
}

/// GET /api/status - Service status
pub async fn status(State(state): State<AppState>) -> HttpResult<Json<ApiResponse<StatusResponse>>> {
    let config = state.service.config();
    let response = StatusResponse {
        service: "dupcheck".to_string(),
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        store_backend: config.store.backend_name().to_string(),
        default_kind: config.default_kind.clone(),
        uptime_seconds: state.uptime_seconds(),
    };

    Ok(Json(ApiResponse::success(response)))
}
