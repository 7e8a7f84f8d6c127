//! HTTP server implementation for the duplicate check
//!
//! This module provides a REST API server using Axum with the batch and
//! single-code duplicate check endpoints.

pub mod errors;
pub mod handlers;
pub mod models;
pub mod server;

pub use models::{ApiResponse, ErrorResponse};
/// Re-export commonly used types
pub use server::{build_router, DupCheckServer};
