//! Error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use openapi_server::models::GenericError;
use tracing::error;

use crate::errors::DeploydError;

/// A [`DeploydError`] on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub DeploydError);

impl From<DeploydError> for ApiError {
    fn from(err: DeploydError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DeploydError::NotFound(_) => StatusCode::NOT_FOUND,
            DeploydError::Conflict(_) => StatusCode::CONFLICT,
            DeploydError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DeploydError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        (status, Json(GenericError { detail })).into_response()
    }
}
