//! Request authentication hook

use axum::{extract::Request, middleware::Next, response::Response};

/// Applied to every route. Requests are not authenticated yet, so every
/// request passes through unchanged.
pub async fn authenticate(request: Request, next: Next) -> Response {
    next.run(request).await
}
