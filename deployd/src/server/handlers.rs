//! Service-level handlers

use axum::{response::IntoResponse, Json};
use openapi_server::models::{HealthResponse, MessageResponse, VersionResponse};

use crate::utils::version_info;

/// Liveness message
pub async fn root_handler() -> impl IntoResponse {
    Json(MessageResponse::new("Working!"))
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "serverctl-deployd".to_string(),
        version: version.version,
    })
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}
