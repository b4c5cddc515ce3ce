//! Container proxy routes

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use openapi_server::models::{
    DeleteRequest, ImageTagRequest, LogsResponse, MessageResponse, PruneRequest,
};

use crate::server::errors::ApiError;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::state::ServerState;

pub async fn prune(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<PruneRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.containers.prune(&request).await?))
}

pub async fn list_containers(
    State(state): State<Arc<ServerState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.containers.list().await?))
}

pub async fn get_container(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.containers.get(&id).await?))
}

pub async fn start_container(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.containers.start(&id).await?;
    Ok(Json(MessageResponse::new(format!("Container {} started", id))))
}

pub async fn stop_container(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.containers.stop(&id).await?;
    Ok(Json(MessageResponse::new(format!("Container {} stopped", id))))
}

pub async fn restart_container(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.containers.restart(&id).await?;
    Ok(Json(MessageResponse::new(format!("Container {} restarted", id))))
}

pub async fn kill_container(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.containers.kill(&id).await?;
    Ok(Json(MessageResponse::new(format!("Container {} killed", id))))
}

pub async fn delete_container(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<DeleteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .containers
        .remove(&request.container_id, request.force, request.v)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Container {} deleted",
        request.container_id
    ))))
}

pub async fn container_logs(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = state.containers.logs(&id).await?;
    Ok(Json(LogsResponse {
        container_id: id,
        logs,
    }))
}

/// Stream the container output as plain text until it stops or the client
/// goes away
pub async fn container_attach(
    State(state): State<Arc<ServerState>>,
    ApiPath(id): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    let stream = state.containers.attach(&id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    ))
}

pub async fn tag_image(
    State(state): State<Arc<ServerState>>,
    ApiJson(request): ApiJson<ImageTagRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .containers
        .tag_image(&request.image_id, &request.tag)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Image {} tagged",
        request.image_id
    ))))
}
