//! Config bucket routes

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::buckets::scanner::{BucketScanner, ARCHIVE_MEDIA_TYPE};
use crate::errors::DeploydError;
use crate::filesys::file::File;
use crate::models::bucket::{ConfigBucket, DeleteFileRequest, FileQuery};
use crate::server::errors::ApiError;
use crate::server::extract::{ApiJson, ApiQuery};
use crate::server::state::ServerState;

const TEXT_MEDIA_TYPE: &str = "text/plain; charset=utf-8";

/// Check the bucket, run its reload command and return the file hashes
pub async fn validate_bucket(
    State(state): State<Arc<ServerState>>,
    ApiJson(bucket): ApiJson<ConfigBucket>,
) -> Result<impl IntoResponse, ApiError> {
    let scanner = BucketScanner::open(&bucket).await?;
    state
        .reload
        .run_optional(bucket.update_command.as_deref())
        .await?;
    Ok(Json(scanner.hash_files().await?))
}

pub async fn list_filenames(
    ApiJson(bucket): ApiJson<ConfigBucket>,
) -> Result<impl IntoResponse, ApiError> {
    let scanner = BucketScanner::open(&bucket).await?;
    Ok(Json(scanner.file_names().await?))
}

pub async fn get_hashes(
    ApiJson(bucket): ApiJson<ConfigBucket>,
) -> Result<impl IntoResponse, ApiError> {
    let scanner = BucketScanner::open(&bucket).await?;
    Ok(Json(scanner.hash_files().await?))
}

pub async fn get_backup(
    ApiJson(bucket): ApiJson<ConfigBucket>,
) -> Result<impl IntoResponse, ApiError> {
    let scanner = BucketScanner::open(&bucket).await?;
    let archive = scanner.archive().await?;
    Ok(([(header::CONTENT_TYPE, ARCHIVE_MEDIA_TYPE)], archive))
}

async fn existing_file(query: &FileQuery) -> Result<File, DeploydError> {
    let file = File::new(&query.file_path);
    if !file.is_file().await {
        return Err(DeploydError::NotFound("File not found".to_string()));
    }
    Ok(file)
}

pub async fn get_file(
    ApiQuery(query): ApiQuery<FileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let file = existing_file(&query).await?;
    let contents = file.read_bytes().await?;
    Ok(([(header::CONTENT_TYPE, TEXT_MEDIA_TYPE)], contents))
}

/// Replace a file with the uploaded `new_file`, then run `update_command`
pub async fn update_file(
    State(state): State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<FileQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart?;
    let file = existing_file(&query).await?;

    let mut update_command = None;
    let mut new_file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DeploydError::InvalidInput(e.body_text()))?
    {
        match field.name() {
            Some("update_command") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| DeploydError::InvalidInput(e.body_text()))?;
                update_command = Some(text);
            }
            Some("new_file") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| DeploydError::InvalidInput(e.body_text()))?;
                new_file = Some(bytes);
            }
            _ => {}
        }
    }

    let update_command = update_command
        .ok_or_else(|| DeploydError::InvalidInput("Missing field update_command".to_string()))?;
    let new_file =
        new_file.ok_or_else(|| DeploydError::InvalidInput("Missing field new_file".to_string()))?;

    file.write_atomic(&new_file).await?;
    state.reload.run(&update_command).await?;

    Ok(([(header::CONTENT_TYPE, TEXT_MEDIA_TYPE)], new_file))
}

pub async fn delete_file(
    State(state): State<Arc<ServerState>>,
    ApiQuery(query): ApiQuery<FileQuery>,
    ApiJson(request): ApiJson<DeleteFileRequest>,
) -> Result<StatusCode, ApiError> {
    let file = existing_file(&query).await?;
    file.delete().await?;
    state.reload.run(&request.update_command).await?;
    Ok(StatusCode::NO_CONTENT)
}
