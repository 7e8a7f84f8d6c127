//! Request and response models for the HTTP API

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Generic API response wrapper
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
    pub meta: Option<ResponseMeta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: None,
        }
    }

    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            meta: Some(meta),
        }
    }

    pub fn error(error: ErrorResponse) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            meta: None,
        }
    }
}

/// Response metadata
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub duration_ms: u64,
}

/// Error response
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Batch duplicate check request
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckBody {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "tenantId is required"))]
    pub tenant_id: String,

    #[validate(length(max = 100))]
    pub kind: Option<String>,

    #[validate(length(max = 500, message = "at most 500 codes per request"))]
    pub candidate_codes: Option<Vec<String>>,

    #[validate(length(max = 500, message = "at most 500 names per request"))]
    pub candidate_names: Option<Vec<String>>,

    pub check_similar: Option<bool>,

    pub suggest_alternatives: Option<bool>,
}

/// Single-code duplicate check query string
#[derive(Debug, Deserialize, Validate, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheckQuery {
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "tenantId is required"))]
    pub tenant_id: String,

    #[validate(length(max = 100))]
    pub kind: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "code is required"))]
    pub code: String,
}

/// Status response
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub service: String,
    pub status: String,
    pub version: String,
    pub store_backend: String,
    pub default_kind: String,
    pub uptime_seconds: u64,
}
