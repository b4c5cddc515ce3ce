//! Deployment routes

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use openapi_server::models::MessageResponse;

use crate::models::deployment::{Deployment, DeploymentPatch};
use crate::server::errors::ApiError;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::state::ServerState;

pub async fn create_deployment(
    State(state): State<Arc<ServerState>>,
    ApiJson(deployment): ApiJson<Deployment>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.deployments.create(deployment).await?;
    Ok(Json(created))
}

pub async fn list_deployments(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.deployments.list().await?))
}

/// Database view of a deployment
pub async fn get_deployment(
    State(state): State<Arc<ServerState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.deployments.get(&name).await?))
}

/// Full stored record of a deployment
pub async fn get_definition(
    State(state): State<Arc<ServerState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.deployments.definition(&name).await?))
}

pub async fn update_deployment(
    State(state): State<Arc<ServerState>>,
    ApiPath(name): ApiPath<String>,
    ApiJson(patch): ApiJson<DeploymentPatch>,
) -> Result<StatusCode, ApiError> {
    state.deployments.update(&name, patch).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_deployment(
    State(state): State<Arc<ServerState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<StatusCode, ApiError> {
    state.deployments.delete(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deployment_up(
    State(state): State<Arc<ServerState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.deployments.up(&name).await?;
    Ok(Json(MessageResponse::new("docker-compose up executed")))
}

pub async fn deployment_down(
    State(state): State<Arc<ServerState>>,
    ApiPath(name): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.deployments.down(&name).await?;
    Ok(Json(MessageResponse::new("docker-compose down executed")))
}
